use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record};
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::sync::LazyLock;
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// HTTP plumbing that is muted unless verbose logging is on
const NOISY_TARGETS: [&str; 6] = ["reqwest", "hyper", "h2", "rustls", "want", "mio"];

struct GitMadLogger;

static LOGGER: GitMadLogger = GitMadLogger;

/// Runtime switches shared by the `log` bridge and the tracing writer
#[derive(Default)]
struct LogSettings {
    enabled: bool,
    verbose: bool,
    file: Option<std::fs::File>,
}

static SETTINGS: LazyLock<Mutex<LogSettings>> = LazyLock::new(|| Mutex::new(LogSettings::default()));

/// Writer handing tracing output to the log file, if one is set
#[derive(Clone)]
struct FileWriter;

impl Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut settings = SETTINGS.lock();
        if settings.enabled
            && let Some(file) = settings.file.as_mut()
        {
            let _ = file.write_all(buf);
            let _ = file.flush();
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(file) = SETTINGS.lock().file.as_mut() {
            let _ = file.flush();
        }
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for FileWriter {
    type Writer = FileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        FileWriter
    }
}

fn is_noisy(target: &str) -> bool {
    NOISY_TARGETS.iter().any(|noisy| target.starts_with(noisy))
}

impl log::Log for GitMadLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        let settings = SETTINGS.lock();
        if !settings.enabled {
            return false;
        }

        if metadata.target().starts_with("gitmad") {
            return metadata.level() <= Level::Debug;
        }

        if !settings.verbose && is_noisy(metadata.target()) {
            return false;
        }

        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format!(
            "{} {} [{}] - {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        );

        if let Some(file) = SETTINGS.lock().file.as_mut() {
            let _ = file.write_all(line.as_bytes());
            let _ = file.flush();
        }
    }

    fn flush(&self) {}
}

/// Initialize unified logging supporting both `log` and `tracing`
///
/// Logging starts disabled; the CLI turns it on with `--log`.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    use std::sync::{Once, OnceLock};
    static INIT: Once = Once::new();
    static INIT_RESULT: OnceLock<Result<(), String>> = OnceLock::new();

    INIT.call_once(|| {
        let verbose_from_env = std::env::var("GITMAD_VERBOSE").is_ok()
            || std::env::var("RUST_LOG").is_ok_and(|v| v.contains("debug") || v.contains("trace"));
        if verbose_from_env {
            set_verbose_logging(true);
        }

        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "gitmad=debug,warn".into());

        let fmt_layer = fmt::Layer::new()
            .with_target(true)
            .with_level(true)
            .with_ansi(false)
            .with_timer(fmt::time::ChronoUtc::rfc_3339())
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(FileWriter);

        // The `log` bridge goes in first so `log` records keep our target filtering
        let log_result = log::set_logger(&LOGGER).map(|()| log::set_max_level(LevelFilter::Debug));

        let tracing_result = Registry::default()
            .with(env_filter)
            .with(fmt_layer)
            .try_init();

        let result = match (tracing_result, log_result) {
            (Ok(()), _) | (Err(_), Ok(())) => Ok(()),
            (Err(tracing_err), Err(log_err)) => Err(format!(
                "Failed to initialize logging: tracing={tracing_err}, log={log_err}"
            )),
        };

        let _ = INIT_RESULT.set(result);
    });

    match INIT_RESULT.get() {
        Some(Ok(())) => Ok(()),
        Some(Err(e)) => Err(e.clone().into()),
        None => Err("Initialization failed unexpectedly".into()),
    }
}

pub fn enable_logging() {
    SETTINGS.lock().enabled = true;
}

pub fn disable_logging() {
    SETTINGS.lock().enabled = false;
}

pub fn set_verbose_logging(enabled: bool) {
    SETTINGS.lock().verbose = enabled;
}

/// Apply the config file's verbosity flag; it can switch verbose logging on but
/// never off, so `GITMAD_VERBOSE` and `RUST_LOG` keep their effect
pub fn enable_verbose_from_config(enabled: bool) -> bool {
    if enabled {
        set_verbose_logging(true);
    }
    enabled
}

pub fn set_log_file(file_path: &str) -> std::io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(file_path)?;
    SETTINGS.lock().file = Some(file);
    Ok(())
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        log::error!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        log::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        log::warn!($($arg)*)
    };
}
