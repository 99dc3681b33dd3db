use crate::common::CommonParams;
use crate::config::{Config, mask_api_key};
use crate::generation::GenerationClient;
use crate::messages::{
    get_fetching_message, get_painting_message, get_purifying_message, get_scanning_message,
};
use crate::redemption::{PurifyOutcome, Redemption};
use crate::render::{
    HttpImageProbe, ImageSlot, RevealFrame, random_seed, render_card, render_purified,
    render_purified_header, resolve_image,
};
use crate::session::{SessionController, SessionStatus, SubmitOutcome, UNKNOWN_FAILURE};
use crate::source::{HttpRawFetcher, InputBuffer, is_file_view_link};
use crate::types::FixResult;
use crate::ui::{self, rgb};
use crate::{log_debug, log_error, log_info};
use anyhow::{Context, Result, anyhow};
use colored::Colorize;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc::UnboundedReceiver;

/// Output switches of the `roast` command
#[derive(Debug, Clone, Default)]
pub struct RoastOptions {
    pub purify: bool,
    pub json: bool,
    pub save_image: Option<PathBuf>,
    pub no_delay: bool,
}

/// Load the user configuration with per-invocation overrides applied
fn load_config(common: &CommonParams) -> Result<Config> {
    let mut config = Config::load()?;
    if common.apply_to_config(&mut config) {
        log_debug!(
            "Using overrides: model {}, temperature {}",
            config.model,
            config.temperature
        );
    }
    Ok(config)
}

fn build_client(config: &Config) -> Result<GenerationClient> {
    if config.effective_api_key().is_none() {
        ui::print_warning(
            "No API key found. Set GEMINI_API_KEY or run 'gitmad config --api-key <KEY>'.",
        );
    }
    GenerationClient::from_config(config).context("Failed to create the generation client")
}

/// Read the raw input text from a file, an inline link, or stdin
async fn read_input(input: Option<&str>) -> Result<String> {
    match input {
        None | Some("-") => {
            if std::io::stdin().is_terminal() {
                ui::print_info("Paste your code, then press Ctrl-D:");
            }
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read code from stdin")?;
            Ok(text)
        }
        Some(value) if is_file_view_link(value) => Ok(value.to_string()),
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {path}")),
    }
}

/// Fill an input buffer, resolving a repository file link if one was given
///
/// Returns `None` when there is nothing to submit.
async fn collect_input(input: Option<&str>, config: &Config) -> Result<Option<InputBuffer>> {
    let text = read_input(input).await?;
    let fetcher = Arc::new(HttpRawFetcher::new(config.request_timeout()));
    let buffer = InputBuffer::new(fetcher, config.services.raw_host.clone());

    if let Some(fetch) = buffer.set_text(text.clone()) {
        let spinner = ui::create_spinner(&get_fetching_message());
        let joined = fetch.await;
        spinner.finish_and_clear();
        joined.context("Source fetch task failed")?;

        if buffer.text() == text {
            ui::print_warning(&format!(
                "Could not fetch the linked file. Nothing was roasted: {}",
                text.trim()
            ));
            return Ok(None);
        }
        log_info!("Fetched linked source ({} bytes)", buffer.text().len());
    }

    if buffer.pending_submission().is_none() {
        ui::print_warning("Nothing to roast: the input is empty.");
        return Ok(None);
    }

    Ok(Some(buffer))
}

/// Handle the 'roast' command
pub async fn handle_roast_command(
    common: &CommonParams,
    input: Option<&str>,
    options: &RoastOptions,
) -> Result<()> {
    // Keep stdout parseable when it carries JSON
    ui::set_machine_output(options.json);
    let config = load_config(common)?;
    let client = build_client(&config)?;

    let Some(buffer) = collect_input(input, &config).await? else {
        return Ok(());
    };

    let min_loading = if options.no_delay {
        Duration::ZERO
    } else {
        config.timing.min_loading()
    };
    let controller = SessionController::new(client, min_loading);

    let spinner = ui::create_spinner(&get_scanning_message());
    let outcome = buffer.submit(&controller).await;
    spinner.finish_and_clear();
    log_debug!("Submission outcome: {:?}", outcome);

    let state = controller.snapshot();
    if outcome == SubmitOutcome::Ignored {
        return Ok(());
    }
    if state.status == SessionStatus::Error {
        let message = state.error_message.as_deref().unwrap_or(UNKNOWN_FAILURE);
        log_error!("Roast failed: {}", message);
        ui::print_error(message);
        return Err(anyhow!("Roast failed: {message}"));
    }
    let card = state
        .data
        .context("Roast finished without a card")?;

    let width = ui::term_width();
    let mut slot = ImageSlot::new(&config.services, &card, random_seed());
    let wants_portrait = !options.json || options.save_image.is_some();
    let image = if wants_portrait {
        let probe = HttpImageProbe::new(config.request_timeout());
        let spinner = ui::create_spinner(&get_painting_message());
        let image = resolve_image(&probe, &mut slot).await;
        spinner.finish_and_clear();
        image
    } else {
        None
    };

    if options.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&card).context("Failed to serialize the card")?
        );
    } else {
        println!("{}", render_card(&card, &slot, width));
    }

    if let Some(path) = &options.save_image {
        save_portrait(path, image.as_deref()).await?;
    }

    if options.purify {
        let Some(redemption) = Redemption::for_session(&controller, config.timing.reveal_interval())
        else {
            return Ok(());
        };
        run_redemption(&redemption, options.json, width).await?;
    }

    Ok(())
}

async fn save_portrait(path: &Path, image: Option<&[u8]>) -> Result<()> {
    let Some(bytes) = image else {
        ui::print_warning("No portrait could be loaded, nothing saved.");
        return Ok(());
    };
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to save portrait to {}", path.display()))?;
    ui::print_success(&format!("Portrait saved to {}", path.display()));
    Ok(())
}

/// Handle the 'purify' command
pub async fn handle_purify_command(
    common: &CommonParams,
    input: Option<&str>,
    json: bool,
) -> Result<()> {
    ui::set_machine_output(json);
    let config = load_config(common)?;
    let client = build_client(&config)?;

    let Some(buffer) = collect_input(input, &config).await? else {
        return Ok(());
    };
    let Some(code) = buffer.pending_submission() else {
        return Ok(());
    };

    let redemption = Redemption::new(client, code, config.timing.reveal_interval());
    run_redemption(&redemption, json, ui::term_width()).await
}

/// Run one purification attempt and show its result
async fn run_redemption(redemption: &Redemption, json: bool, width: usize) -> Result<()> {
    let spinner = ui::create_spinner(&get_purifying_message());
    let outcome = redemption.purify().await;
    spinner.finish_and_clear();

    match outcome {
        PurifyOutcome::Purified { result, frames } => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&result)
                        .context("Failed to serialize the purified code")?
                );
            } else if std::io::stdout().is_terminal() && !ui::is_quiet_mode() {
                stream_reveal(&result, frames, width).await?;
            } else {
                println!("{}", render_purified(&result, &result.fixed_code, true, width));
            }
        }
        PurifyOutcome::Failed { notice } => {
            ui::print_warning(&notice);
            ui::print_info("Run the command again to retry.");
        }
        PurifyOutcome::Busy => log_debug!("Purification already in progress"),
    }
    Ok(())
}

/// Print the fixed code as the reveal frames arrive
async fn stream_reveal(
    result: &FixResult,
    mut frames: UnboundedReceiver<RevealFrame>,
    width: usize,
) -> Result<()> {
    let (r, g, b) = rgb::PURIFY_BLUE;
    let (cr, cg, cb) = rgb::CODE_CYAN;
    let mut stdout = std::io::stdout();

    print!("{}", render_purified_header(result, width));
    println!(" {}", "┌─ fixed_code".truecolor(r, g, b));
    print!(" {} ", "│".truecolor(r, g, b));

    let mut printed = 0;
    while let Some(frame) = frames.recv().await {
        let visible = frame.visible();
        let fresh = visible.get(printed..).unwrap_or_default();
        printed = visible.len();

        for (i, line) in fresh.split('\n').enumerate() {
            if i > 0 {
                print!("\n {} ", "│".truecolor(r, g, b));
            }
            print!("{}", line.truecolor(cr, cg, cb));
        }
        stdout.flush().context("Failed to write to stdout")?;
    }

    println!("\n {}", "└─".truecolor(r, g, b));
    Ok(())
}

/// Handle the 'config' command
pub fn handle_config_command(
    common: &CommonParams,
    api_key: Option<String>,
    min_loading_ms: Option<u64>,
    reveal_interval_ms: Option<u64>,
) -> Result<()> {
    log_debug!(
        "Starting 'config' command with common: {:?}, min_loading_ms: {:?}, reveal_interval_ms: {:?}",
        common,
        min_loading_ms,
        reveal_interval_ms
    );

    let mut config = Config::load()?;

    let mut changes_made = common.apply_to_config(&mut config);
    changes_made |= config.update(api_key, None, None, min_loading_ms, reveal_interval_ms);

    if changes_made {
        config.save()?;
        ui::print_success("Configuration updated successfully.");
        ui::print_newline();
    }

    print_configuration(&config);
    Ok(())
}

fn print_configuration(config: &Config) {
    let green = rgb::HACKER_GREEN;
    let cyan = rgb::CODE_CYAN;
    let amber = rgb::WARNING_AMBER;
    let dim_sep = rgb::DIM_SEPARATOR;

    println!();
    println!(
        "{}  {}  {}",
        "━━━".truecolor(green.0, green.1, green.2),
        ui::create_gradient_text("GITMAD CONFIGURATION").bold(),
        "━━━".truecolor(green.0, green.1, green.2)
    );
    println!();

    print_section_header("GENERATION");
    let key = config.effective_api_key().map_or_else(
        || "(not set)".to_string(),
        |key| mask_api_key(&key),
    );
    print_config_row("API Key", &key, amber, false);
    print_config_row("Model", &config.model, cyan, true);
    print_config_row("Temperature", &config.temperature.to_string(), cyan, false);
    print_config_row("Endpoint", &config.api_base, cyan, false);
    print_config_row(
        "Timeout",
        &format!("{}s", config.request_timeout_secs),
        cyan,
        false,
    );

    println!();
    print_section_header("TIMING");
    print_config_row(
        "Min Loading",
        &format!("{}ms", config.timing.min_loading_ms),
        green,
        false,
    );
    print_config_row(
        "Reveal Tick",
        &format!("{}ms", config.timing.reveal_interval_ms),
        green,
        false,
    );

    println!();
    print_section_header("SERVICES");
    print_config_row("Images", &config.services.image_base, cyan, false);
    print_config_row("Avatars", &config.services.avatar_base, cyan, false);
    print_config_row("Raw Files", &config.services.raw_host, cyan, false);

    if let Ok(path) = Config::get_config_path() {
        println!();
        print_config_row("File", &path.display().to_string(), rgb::DIM_WHITE, false);
    }

    println!();
    println!(
        "{}",
        "─".repeat(40).truecolor(dim_sep.0, dim_sep.1, dim_sep.2)
    );
    println!();
}

fn print_section_header(name: &str) {
    let green = rgb::HACKER_GREEN;
    let dim_sep = rgb::DIM_SEPARATOR;
    println!(
        "{} {} {}",
        "─".truecolor(green.0, green.1, green.2),
        name.truecolor(green.0, green.1, green.2).bold(),
        "─"
            .repeat(30 - name.len().min(28))
            .truecolor(dim_sep.0, dim_sep.1, dim_sep.2)
    );
}

fn print_config_row(label: &str, value: &str, value_color: (u8, u8, u8), highlight: bool) {
    let dim = rgb::DIM_WHITE;
    let label_styled = format!("{label:>12}").truecolor(dim.0, dim.1, dim.2);

    let value_styled = if highlight {
        value
            .truecolor(value_color.0, value_color.1, value_color.2)
            .bold()
    } else {
        value.truecolor(value_color.0, value_color.1, value_color.2)
    };

    println!("{label_styled}  {value_styled}");
}
