use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use std::fmt::Write;
use std::sync::LazyLock;
use std::time::Duration;

use crate::messages::ColoredMessage;

// ═══════════════════════════════════════════════════════════════════════════════
// Mainframe palette
// ═══════════════════════════════════════════════════════════════════════════════

// RGB tuple constants for use with the `colored` crate's `.truecolor()` method
pub mod rgb {
    /// Hacker green #00ff41, default card theme
    pub const HACKER_GREEN: (u8, u8, u8) = (0, 255, 65);
    /// Dark green #003b00, muted chrome
    pub const DARK_GREEN: (u8, u8, u8) = (0, 59, 0);
    /// Redemption blue #0080ff
    pub const PURIFY_BLUE: (u8, u8, u8) = (0, 128, 255);
    /// Fixed code cyan
    pub const CODE_CYAN: (u8, u8, u8) = (34, 211, 238);
    pub const ERROR_RED: (u8, u8, u8) = (239, 68, 68);
    pub const WARNING_AMBER: (u8, u8, u8) = (251, 191, 36);
    pub const DIM_WHITE: (u8, u8, u8) = (180, 180, 190);
    pub const DIM_SEPARATOR: (u8, u8, u8) = (60, 60, 70);
}

/// Track quiet mode state
static QUIET_MODE: LazyLock<Mutex<bool>> = LazyLock::new(|| Mutex::new(false));

/// Enable or disable quiet mode
pub fn set_quiet_mode(enabled: bool) {
    *QUIET_MODE.lock() = enabled;
}

/// Check if quiet mode is enabled
pub fn is_quiet_mode() -> bool {
    *QUIET_MODE.lock()
}

/// Set while stdout carries JSON; diagnostics then move to stderr
static MACHINE_OUTPUT: LazyLock<Mutex<bool>> = LazyLock::new(|| Mutex::new(false));

/// Stream a diagnostic line is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticStream {
    Stdout,
    Stderr,
}

pub fn set_machine_output(enabled: bool) {
    *MACHINE_OUTPUT.lock() = enabled;
}

pub fn diagnostic_stream() -> DiagnosticStream {
    if *MACHINE_OUTPUT.lock() {
        DiagnosticStream::Stderr
    } else {
        DiagnosticStream::Stdout
    }
}

fn print_diagnostic(line: &str) {
    match diagnostic_stream() {
        DiagnosticStream::Stdout => println!("{line}"),
        DiagnosticStream::Stderr => eprintln!("{line}"),
    }
}

/// Spinner showing a themed waiting message
pub fn create_spinner(message: &ColoredMessage) -> ProgressBar {
    // Don't create a spinner in quiet mode
    if is_quiet_mode() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⣾⣽⣻⢿⡿⣟⣯⣷ ")
        .template("{spinner:.green.bold} {msg}")
    {
        pb.set_style(style);
    }
    let (r, g, b) = message.color;
    pb.set_message(message.text.truecolor(r, g, b).bold().to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn print_info(message: &str) {
    if !is_quiet_mode() {
        print_diagnostic(&message.cyan().bold().to_string());
    }
}

pub fn print_warning(message: &str) {
    if !is_quiet_mode() {
        print_diagnostic(&message.yellow().bold().to_string());
    }
}

pub fn print_error(message: &str) {
    // Always print errors, even in quiet mode
    let (r, g, b) = rgb::ERROR_RED;
    eprintln!("{}", message.truecolor(r, g, b).bold());
}

pub fn print_success(message: &str) {
    if !is_quiet_mode() {
        print_diagnostic(&message.green().bold().to_string());
    }
}

pub fn print_version(version: &str) {
    if !is_quiet_mode() {
        println!(
            "{} {} {}",
            create_gradient_text("GITMAD//ROASTER").bold(),
            "version".green(),
            version.bright_green()
        );
    }
}

/// Print an empty line (respects quiet mode)
pub fn print_newline() {
    if !is_quiet_mode() {
        print_diagnostic("");
    }
}

const DEFAULT_WIDTH: usize = 80;
const MAX_WIDTH: usize = 100;

/// Width to lay cards out in, from `COLUMNS` when the shell exports it
pub fn term_width() -> usize {
    width_from_columns(std::env::var("COLUMNS").ok().as_deref())
}

fn width_from_columns(columns: Option<&str>) -> usize {
    columns
        .and_then(|c| c.trim().parse::<usize>().ok())
        .filter(|&c| c > 0)
        .map_or(DEFAULT_WIDTH, |c| c.min(MAX_WIDTH))
}

/// Terminal-green gradient for banners
pub fn create_gradient_text(text: &str) -> String {
    let gradient = [
        rgb::DARK_GREEN,
        (0, 140, 40),
        rgb::HACKER_GREEN,
        (120, 255, 150),
        rgb::HACKER_GREEN,
    ];

    apply_gradient(text, &gradient)
}

/// Blue-to-cyan gradient used by the redemption flow
pub fn create_purify_gradient_text(text: &str) -> String {
    apply_gradient(text, &[rgb::PURIFY_BLUE, (17, 170, 246), rgb::CODE_CYAN])
}

fn apply_gradient(text: &str, gradient: &[(u8, u8, u8)]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let chars_len = chars.len();
    let gradient_len = gradient.len();

    let mut result = String::new();

    if chars_len == 0 || gradient_len == 0 {
        return result;
    }

    for (i, c) in chars.iter().enumerate() {
        let index = if chars_len == 1 {
            0
        } else {
            i * (gradient_len - 1) / (chars_len - 1)
        };
        let (r, g, b) = gradient.get(index).copied().unwrap_or(rgb::HACKER_GREEN);
        let _ = write!(result, "{}", c.to_string().truecolor(r, g, b));
    }

    result
}
