//! Markdown to terminal lines
//!
//! Walks the `pulldown-cmark` event stream with a style stack and wraps text to
//! a maximum width. Output is a list of styled spans per line so callers and
//! tests can inspect the text without ANSI codes.

use super::color::CardColor;
use crate::ui::rgb;
use colored::Colorize;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpanStyle {
    pub color: Option<(u8, u8, u8)>,
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
}

impl SpanStyle {
    fn fg(color: (u8, u8, u8)) -> Self {
        Self {
            color: Some(color),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub content: String,
    pub style: SpanStyle,
}

impl Span {
    fn styled(content: impl Into<String>, style: SpanStyle) -> Self {
        Self {
            content: content.into(),
            style,
        }
    }

    fn render(&self) -> String {
        let mut out = self.content.normal();
        if let Some((r, g, b)) = self.style.color {
            out = out.truecolor(r, g, b);
        }
        if self.style.bold {
            out = out.bold();
        }
        if self.style.italic {
            out = out.italic();
        }
        if self.style.strikethrough {
            out = out.strikethrough();
        }
        if self.style.underline {
            out = out.underline();
        }
        out.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    fn from_span(span: Span) -> Self {
        Self { spans: vec![span] }
    }

    /// Text without styling
    pub fn plain(&self) -> String {
        self.spans.iter().map(|s| s.content.as_str()).collect()
    }

    /// Display width of the line in terminal columns
    pub fn width(&self) -> usize {
        self.spans.iter().map(|s| s.content.width()).sum()
    }

    /// Text with ANSI styling
    pub fn render(&self) -> String {
        self.spans.iter().map(Span::render).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

struct LineBuilder {
    lines: Vec<Line>,
    spans: Vec<Span>,
    width: usize,
    max_width: usize,
    indent: String,
}

impl LineBuilder {
    fn new(max_width: usize) -> Self {
        Self {
            lines: Vec::new(),
            spans: Vec::new(),
            width: 0,
            max_width,
            indent: String::new(),
        }
    }

    fn flush(&mut self) {
        if !self.spans.is_empty() {
            self.lines.push(Line {
                spans: std::mem::take(&mut self.spans),
            });
        }
        self.width = 0;
    }

    fn blank(&mut self) {
        self.flush();
        if self.lines.last().is_some_and(|l| !l.is_empty()) {
            self.lines.push(Line::default());
        }
    }

    fn push(&mut self, content: impl Into<String>, style: SpanStyle) {
        let content = content.into();
        self.width += content.width();
        self.spans.push(Span::styled(content, style));
    }

    fn last_char(&self) -> Option<char> {
        self.spans.last().and_then(|s| s.content.chars().last())
    }

    /// Add a space unless the line is empty or already ends in whitespace or an opener
    fn space_before(&mut self, style: SpanStyle) {
        if let Some(c) = self.last_char()
            && !c.is_whitespace()
            && !matches!(c, '(' | '[' | '"' | '\'')
        {
            self.push(" ", style);
        }
    }

    /// Append words, wrapping at `max_width`
    fn text(&mut self, text: &str, style: SpanStyle) {
        let leading_space = text.starts_with(char::is_whitespace);
        let trailing_space = text.ends_with(char::is_whitespace);

        for (i, word) in text.split_whitespace().enumerate() {
            let needs_gap = (i > 0 || leading_space)
                && self.last_char().is_some_and(|c| !c.is_whitespace());
            let word_width = word.width();
            let gap = usize::from(needs_gap);

            if self.width > self.indent.width()
                && self.width + gap + word_width > self.max_width
            {
                self.flush();
            }

            if self.spans.is_empty() && !self.indent.is_empty() {
                let indent = self.indent.clone();
                self.push(indent, SpanStyle::fg(rgb::DIM_SEPARATOR));
            } else if needs_gap && self.width > self.indent.width() {
                self.push(" ", style);
            }
            self.push(word, style);
        }

        if trailing_space && self.last_char().is_some_and(|c| !c.is_whitespace()) {
            self.push(" ", style);
        }
    }
}

/// Render markdown `content` into styled lines no wider than `max_width` where words allow
pub fn format_markdown(content: &str, max_width: usize, accent: CardColor) -> Vec<Line> {
    let accent = accent.to_rgb_tuple();
    let base = SpanStyle::fg(rgb::DIM_WHITE);
    let mut out = LineBuilder::new(max_width.max(8));
    let mut style_stack: Vec<SpanStyle> = vec![base];

    let mut in_code_block = false;
    let mut code_lines: Vec<String> = Vec::new();
    let mut code_lang = String::new();
    let mut list_depth: usize = 0;
    let mut ordered: Vec<Option<u64>> = Vec::new();

    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;

    for event in Parser::new_ext(content, options) {
        let current = style_stack.last().copied().unwrap_or(base);
        match event {
            Event::Start(tag) => match tag {
                Tag::Heading { level, .. } => {
                    out.blank();
                    let mut style = SpanStyle::fg(accent);
                    style.bold = true;
                    style.underline = level == HeadingLevel::H1;
                    style_stack.push(style);
                }
                Tag::Paragraph if list_depth == 0 => out.flush(),
                Tag::CodeBlock(kind) => {
                    out.flush();
                    in_code_block = true;
                    code_lang = match kind {
                        CodeBlockKind::Fenced(lang) => lang.to_string(),
                        CodeBlockKind::Indented => String::new(),
                    };
                }
                Tag::List(first) => {
                    out.flush();
                    list_depth += 1;
                    ordered.push(first);
                }
                Tag::Item => {
                    out.flush();
                    let indent = "  ".repeat(list_depth.saturating_sub(1));
                    let marker = match ordered.last_mut() {
                        Some(Some(n)) => {
                            let marker = format!("{indent}{n}. ");
                            *n += 1;
                            marker
                        }
                        _ => format!("{indent}• "),
                    };
                    out.indent = " ".repeat(marker.width());
                    out.push(marker, SpanStyle::fg(accent));
                }
                Tag::Emphasis => {
                    out.space_before(current);
                    style_stack.push(SpanStyle {
                        italic: true,
                        ..current
                    });
                }
                Tag::Strong => {
                    out.space_before(current);
                    style_stack.push(SpanStyle {
                        bold: true,
                        ..current
                    });
                }
                Tag::Strikethrough => {
                    out.space_before(current);
                    style_stack.push(SpanStyle {
                        strikethrough: true,
                        ..current
                    });
                }
                Tag::BlockQuote(_) => {
                    out.flush();
                    out.indent = "│ ".to_string();
                    style_stack.push(SpanStyle {
                        italic: true,
                        ..current
                    });
                }
                Tag::Link { .. } => {
                    out.space_before(current);
                    style_stack.push(SpanStyle {
                        underline: true,
                        ..SpanStyle::fg(accent)
                    });
                }
                _ => {}
            },
            Event::End(tag) => match tag {
                TagEnd::Heading(_) => {
                    style_stack.pop();
                    out.flush();
                }
                TagEnd::Paragraph if list_depth == 0 => out.blank(),
                TagEnd::Paragraph => out.flush(),
                TagEnd::CodeBlock => {
                    render_code_block(&mut out, &code_lines, &code_lang);
                    code_lines.clear();
                    code_lang.clear();
                    in_code_block = false;
                    out.blank();
                }
                TagEnd::List(_) => {
                    list_depth = list_depth.saturating_sub(1);
                    ordered.pop();
                    out.flush();
                    out.indent.clear();
                    if list_depth == 0 {
                        out.blank();
                    }
                }
                TagEnd::Item => {
                    out.flush();
                    out.indent.clear();
                }
                TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                    style_stack.pop();
                }
                TagEnd::BlockQuote(_) => {
                    style_stack.pop();
                    out.flush();
                    out.indent.clear();
                }
                _ => {}
            },
            Event::Text(text) => {
                if in_code_block {
                    code_lines.extend(text.lines().map(String::from));
                } else {
                    out.text(&text, current);
                }
            }
            Event::Code(code) => {
                out.space_before(current);
                out.push(code.to_string(), SpanStyle::fg(rgb::CODE_CYAN));
            }
            Event::SoftBreak => out.text(" ", current),
            Event::HardBreak => out.flush(),
            Event::Rule => {
                out.flush();
                out.push("─".repeat(max_width.min(60)), SpanStyle::fg(rgb::DIM_SEPARATOR));
                out.flush();
            }
            Event::TaskListMarker(checked) => {
                out.push(if checked { "☑ " } else { "☐ " }, SpanStyle::fg(accent));
            }
            _ => {}
        }
    }

    out.flush();
    let mut lines = out.lines;
    while lines.last().is_some_and(Line::is_empty) {
        lines.pop();
    }
    lines
}

fn render_code_block(out: &mut LineBuilder, code_lines: &[String], lang: &str) {
    let chrome = SpanStyle::fg(rgb::DIM_SEPARATOR);
    let label = if lang.is_empty() { "code" } else { lang };
    let limit = out.max_width.saturating_sub(3);

    out.lines
        .push(Line::from_span(Span::styled(format!("┌─ {label} "), chrome)));

    for code_line in code_lines {
        let shown = truncate_to_width(code_line, limit);
        out.lines.push(Line {
            spans: vec![
                Span::styled("│ ", chrome),
                Span::styled(shown, SpanStyle::fg(rgb::CODE_CYAN)),
            ],
        });
    }

    out.lines.push(Line::from_span(Span::styled("└─", chrome)));
}

/// Cut `text` to at most `max_width` columns, marking the cut with an ellipsis
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }

    let mut out = String::new();
    let mut width = 0;
    for c in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(1);
        if width + w + 1 > max_width {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line]) -> Vec<String> {
        lines.iter().map(Line::plain).collect()
    }

    #[test]
    fn test_paragraph_wraps() {
        let text = "This code is so nested it has its own postcode and a local council";
        let lines = format_markdown(text, 20, CardColor::FALLBACK);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.width() <= 20, "too wide: {:?}", line.plain());
        }
        assert_eq!(plain(&lines).join(" "), text);
    }

    #[test]
    fn test_strong_and_code_are_styled() {
        let lines = format_markdown("Uses **eval** on `input`.", 80, CardColor::FALLBACK);
        assert_eq!(lines.len(), 1);
        let spans = &lines[0].spans;
        assert!(spans.iter().any(|s| s.content == "eval" && s.style.bold));
        assert!(
            spans
                .iter()
                .any(|s| s.content == "input" && s.style.color == Some(rgb::CODE_CYAN))
        );
        assert!(lines[0].plain().contains("eval"));
    }

    #[test]
    fn test_lists_get_markers() {
        let lines = format_markdown("- one\n- two\n\n1. first\n2. second", 80, CardColor::FALLBACK);
        let text = plain(&lines);
        assert!(text.contains(&"• one".to_string()));
        assert!(text.contains(&"• two".to_string()));
        assert!(text.contains(&"1. first".to_string()));
        assert!(text.contains(&"2. second".to_string()));
    }

    #[test]
    fn test_code_block_is_boxed() {
        let lines = format_markdown("```js\nvar x = 1;\n```", 80, CardColor::FALLBACK);
        let text = plain(&lines);
        assert_eq!(text[0], "┌─ js ");
        assert_eq!(text[1], "│ var x = 1;");
        assert_eq!(text[2], "└─");
    }

    #[test]
    fn test_heading_uses_accent() {
        let accent = CardColor::new(255, 0, 0);
        let lines = format_markdown("# Verdict", 80, accent);
        assert_eq!(lines[0].spans[0].style.color, Some((255, 0, 0)));
        assert!(lines[0].spans[0].style.bold);
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn test_no_trailing_blank_lines() {
        let lines = format_markdown("one\n\ntwo\n\n", 80, CardColor::FALLBACK);
        assert_eq!(plain(&lines), vec!["one", "", "two"]);
    }
}
