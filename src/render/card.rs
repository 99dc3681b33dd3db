//! Terminal layout of the character card and the purified result

use super::color::CardColor;
use super::image::ImageSlot;
use super::markdown::format_markdown;
use crate::types::{FixResult, RoastCard, clamp_percent};
use crate::ui::rgb;
use colored::Colorize;
use rand::Rng;
use rand::distr::Alphanumeric;
use std::fmt::Write;
use unicode_width::UnicodeWidthStr;

const STAT_LABEL_WIDTH: usize = 12;
const MIN_WIDTH: usize = 32;

/// Filled/empty bar for a 0-100 rating; out-of-range values are clamped
pub fn stat_bar(value: i64, width: usize) -> String {
    let filled = filled_cells(value, width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn filled_cells(value: i64, width: usize) -> usize {
    let percent = usize::from(clamp_percent(value));
    (percent * width + 50) / 100
}

/// Number printed beside a stat bar, clamped like the bar itself
fn stat_value(value: i64) -> String {
    format!("{:>4}", clamp_percent(value))
}

/// Short random reference printed in the card footer
pub fn random_ref() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(6)
        .map(|c| char::from(c).to_ascii_uppercase())
        .collect()
}

/// One-line description of the portrait state
pub fn portrait_status(slot: &ImageSlot) -> String {
    if let Some(request) = slot.pending() {
        format!("PAINTING... ({})", request.source)
    } else if let Some(request) = slot.loaded() {
        format!("Portrait: {}", request.url)
    } else {
        "Portrait unavailable".to_string()
    }
}

fn rule(width: usize, color: CardColor) -> String {
    let (r, g, b) = color.to_rgb_tuple();
    "─".repeat(width).truecolor(r, g, b).to_string()
}

fn wrapped(text: &str, width: usize) -> Vec<String> {
    textwrap::wrap(text, width)
        .into_iter()
        .map(std::borrow::Cow::into_owned)
        .collect()
}

/// Render `card` for a terminal `width` columns wide
pub fn render_card(card: &RoastCard, slot: &ImageSlot, width: usize) -> String {
    let width = width.max(MIN_WIDTH);
    let inner = width - 2;
    let accent = CardColor::parse_or_fallback(Some(&card.theme_color));
    let (r, g, b) = accent.to_rgb_tuple();
    let dim = accent.dimmed().to_rgb_tuple();
    let mut out = String::new();

    // Header
    let _ = writeln!(out, "{}", rule(width, accent));
    let title = card.archetype.to_uppercase();
    let gap = inner
        .saturating_sub(title.width() + card.emoji.width())
        .max(1);
    let _ = writeln!(
        out,
        " {}{}{}",
        title.truecolor(r, g, b).bold(),
        " ".repeat(gap),
        card.emoji
    );
    let _ = writeln!(
        out,
        " {}",
        "Class: LEGENDARY TRASH".truecolor(dim.0, dim.1, dim.2)
    );
    let _ = writeln!(out, "{}", rule(width, accent));

    // Portrait
    let _ = writeln!(out, " {}", portrait_status(slot).truecolor(r, g, b).italic());
    out.push('\n');

    // Score and quote
    let _ = writeln!(
        out,
        " {} {}",
        format!("{:>3}", card.display_score()).truecolor(r, g, b).bold(),
        "QUALITY".truecolor(dim.0, dim.1, dim.2)
    );
    for line in wrapped(&format!("\"{}\"", card.quote), inner.saturating_sub(2)) {
        let _ = writeln!(
            out,
            " {} {}",
            "▌".truecolor(r, g, b),
            line.white().italic()
        );
    }
    out.push('\n');

    // Stats
    let bar_width = inner.saturating_sub(STAT_LABEL_WIDTH + 6).clamp(10, 40);
    for (label, value) in card.stats.labelled() {
        let filled = filled_cells(value, bar_width);
        let _ = writeln!(
            out,
            " {}{}{} {}",
            format!("{label:<STAT_LABEL_WIDTH$}").truecolor(r, g, b).bold(),
            "█".repeat(filled).truecolor(r, g, b),
            "░".repeat(bar_width - filled).truecolor(dim.0, dim.1, dim.2),
            stat_value(value),
        );
    }
    out.push('\n');

    // Details
    let _ = writeln!(out, " {}", "VERDICT.LOG".truecolor(r, g, b).bold());
    for line in format_markdown(&card.details, inner, accent) {
        let _ = writeln!(out, " {}", line.render());
    }

    // Footer
    let _ = writeln!(out, "{}", rule(width, accent));
    let version = format!("GitMad v{}", env!("CARGO_PKG_VERSION"));
    let reference = format!("Ref: {}", random_ref());
    let gap = inner
        .saturating_sub(version.width() + reference.width())
        .max(1);
    let _ = writeln!(
        out,
        " {}{}{}",
        version.truecolor(dim.0, dim.1, dim.2),
        " ".repeat(gap),
        reference.truecolor(dim.0, dim.1, dim.2)
    );

    out
}

/// Header, rank and explanation of a purified result
pub fn render_purified_header(result: &FixResult, width: usize) -> String {
    let width = width.max(MIN_WIDTH);
    let inner = width - 2;
    let (r, g, b) = rgb::PURIFY_BLUE;
    let mut out = String::new();

    let _ = writeln!(out, "{}", "═".repeat(width).truecolor(r, g, b));
    let _ = writeln!(
        out,
        " {}   Rank Up: {}",
        "✔ CODE_PURIFIED".truecolor(r, g, b).bold(),
        result.new_rank.truecolor(r, g, b).bold()
    );
    let _ = writeln!(out, "{}", "═".repeat(width).truecolor(r, g, b));

    for line in wrapped(&format!("\"{}\"", result.explanation), inner.saturating_sub(2)) {
        let _ = writeln!(out, " {} {}", "▌".truecolor(r, g, b), line.italic());
    }
    out.push('\n');
    out
}

/// Render the purified result with the currently revealed part of the code
pub fn render_purified(result: &FixResult, visible_code: &str, complete: bool, width: usize) -> String {
    let (r, g, b) = rgb::PURIFY_BLUE;
    let (cr, cg, cb) = rgb::CODE_CYAN;
    let mut out = render_purified_header(result, width);

    let _ = writeln!(out, " {}", "┌─ fixed_code".truecolor(r, g, b));
    let lines: Vec<&str> = visible_code.split('\n').collect();
    let last = lines.len() - 1;
    for (i, line) in lines.iter().enumerate() {
        let cursor = if i == last && !complete { "|" } else { "" };
        let _ = writeln!(
            out,
            " {} {}{}",
            "│".truecolor(r, g, b),
            line.truecolor(cr, cg, cb),
            cursor.truecolor(r, g, b).bold()
        );
    }
    let _ = writeln!(out, " {}", "└─".truecolor(r, g, b));

    out
}
