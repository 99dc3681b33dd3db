use crate::commands;
use crate::common::CommonParams;
use crate::log_debug;
use crate::ui;
use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand, crate_version};
use std::path::PathBuf;

const LOG_FILE: &str = "gitmad-debug.log";

/// CLI structure defining the available commands and global arguments
#[derive(Parser)]
#[command(
    author,
    version = crate_version!(),
    about = "GitMad: your code, roasted by a cynical 90s hacker",
    long_about = "GitMad reads a snippet (a file, a GitHub file link or stdin), turns it into an RPG-style character card of everything wrong with it, and can purify it into clean code afterwards.",
    disable_version_flag = true,
    styles = get_styles(),
)]
pub struct Cli {
    /// Subcommands available for the CLI
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log debug messages to a file
    #[arg(
        short = 'l',
        long = "log",
        global = true,
        help = "Log debug messages to a file"
    )]
    pub log: bool,

    /// Specify a custom log file path
    #[arg(
        long = "log-file",
        global = true,
        help = "Specify a custom log file path"
    )]
    pub log_file: Option<String>,

    /// Suppress non-essential output (spinners, waiting messages, etc.)
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress non-essential output"
    )]
    pub quiet: bool,

    /// Display the version
    #[arg(
        short = 'v',
        long = "version",
        global = true,
        help = "Display the version"
    )]
    pub version: bool,
}

/// Enumeration of available subcommands
#[derive(Subcommand)]
#[command(subcommand_negates_reqs = true)]
#[command(subcommand_precedence_over_arg = true)]
pub enum Commands {
    /// Roast a snippet and print its character card
    #[command(
        about = "Roast a code snippet",
        long_about = "Roast a code snippet and print its character card. INPUT may be a file path, a GitHub file link (https://github.com/<owner>/<repo>/blob/<ref>/<path>) or '-' for stdin; stdin is read when it is omitted."
    )]
    Roast {
        #[command(flatten)]
        common: CommonParams,

        /// File path, GitHub file link, or '-' for stdin
        #[arg(help = "File path, GitHub file link, or '-' for stdin")]
        input: Option<String>,

        /// Purify the code after the roast
        #[arg(short, long, help = "Purify the code after the roast")]
        purify: bool,

        /// Print the card as JSON instead of rendering it
        #[arg(long, help = "Print the card as JSON instead of rendering it")]
        json: bool,

        /// Download the card portrait to this path
        #[arg(long, value_name = "PATH", help = "Download the card portrait to this path")]
        save_image: Option<PathBuf>,

        /// Skip the minimum loading delay
        #[arg(long, help = "Skip the minimum loading delay")]
        no_delay: bool,
    },

    /// Rewrite a snippet into clean code without roasting it
    #[command(
        about = "Purify a code snippet",
        long_about = "Skip the roast and ask for a clean, production-ready rewrite of the snippet."
    )]
    Purify {
        #[command(flatten)]
        common: CommonParams,

        /// File path, GitHub file link, or '-' for stdin
        #[arg(help = "File path, GitHub file link, or '-' for stdin")]
        input: Option<String>,

        /// Print the result as JSON
        #[arg(long, help = "Print the result as JSON")]
        json: bool,
    },

    /// Show or change settings
    #[command(about = "Configure GitMad settings")]
    Config {
        #[command(flatten)]
        common: CommonParams,

        /// Set the generation API key
        #[arg(long, help = "Set the generation API key")]
        api_key: Option<String>,

        /// Set the minimum loading time in milliseconds
        #[arg(long, help = "Set the minimum loading time in milliseconds")]
        min_loading_ms: Option<u64>,

        /// Set the delay between revealed characters in milliseconds
        #[arg(
            long,
            help = "Set the delay between revealed characters in milliseconds"
        )]
        reveal_interval_ms: Option<u64>,
    },
}

/// Define custom styles for Clap
fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Cyan.on_default().bold())
        .literal(AnsiColor::Green.on_default().bold())
        .placeholder(AnsiColor::Yellow.on_default())
        .valid(AnsiColor::Blue.on_default().bold())
        .invalid(AnsiColor::Red.on_default().bold())
        .error(AnsiColor::Red.on_default().bold())
}

/// Parse the command-line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Main function to parse arguments and handle the command
pub async fn main() -> anyhow::Result<()> {
    let cli = parse_args();

    if cli.version {
        ui::print_version(crate_version!());
        return Ok(());
    }

    if cli.log {
        crate::logger::enable_logging();
        let log_file = cli.log_file.as_deref().unwrap_or(LOG_FILE);
        crate::logger::set_log_file(log_file)?;

        // Load config to check for verbose logging settings
        if let Ok(config) = crate::config::Config::load()
            && crate::logger::enable_verbose_from_config(config.verbose_logging)
        {
            log_debug!("Verbose logging enabled - will show HTTP client logs");
        }
    } else {
        crate::logger::disable_logging();
    }

    if cli.quiet {
        ui::set_quiet_mode(true);
    }

    if let Some(command) = cli.command {
        handle_command(command).await
    } else {
        // If no subcommand is provided, print the help
        let _ = Cli::parse_from(["gitmad", "--help"]);
        Ok(())
    }
}

/// Dispatch a parsed subcommand
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Roast {
            common,
            input,
            purify,
            json,
            save_image,
            no_delay,
        } => {
            log_debug!(
                "Handling 'roast' command with input: {:?}, purify: {}, json: {}, no_delay: {}",
                input,
                purify,
                json,
                no_delay
            );
            commands::handle_roast_command(
                &common,
                input.as_deref(),
                &commands::RoastOptions {
                    purify,
                    json,
                    save_image,
                    no_delay,
                },
            )
            .await
        }
        Commands::Purify {
            common,
            input,
            json,
        } => {
            log_debug!("Handling 'purify' command with input: {:?}", input);
            commands::handle_purify_command(&common, input.as_deref(), json).await
        }
        Commands::Config {
            common,
            api_key,
            min_loading_ms,
            reveal_interval_ms,
        } => commands::handle_config_command(&common, api_key, min_loading_ms, reveal_interval_ms),
    }
}
