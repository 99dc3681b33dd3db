use crate::ui::rgb::{CODE_CYAN, DIM_WHITE, HACKER_GREEN, PURIFY_BLUE, WARNING_AMBER};
use rand::prelude::*;
use std::sync::LazyLock;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColoredMessage {
    pub text: String,
    pub color: (u8, u8, u8),
}

impl ColoredMessage {
    fn new(text: &str, color: (u8, u8, u8)) -> Self {
        Self {
            text: text.to_string(),
            color,
        }
    }
}

static SCANNING_MESSAGES: LazyLock<Vec<ColoredMessage>> = LazyLock::new(|| {
    vec![
        ColoredMessage::new("SCANNING CODE...", HACKER_GREEN),
        ColoredMessage::new("Counting nested loops with a straight face...", HACKER_GREEN),
        ColoredMessage::new("Dialing into the mainframe at 14.4k baud...", DIM_WHITE),
        ColoredMessage::new("Grepping for crimes against readability...", WARNING_AMBER),
        ColoredMessage::new("Sharpening the red pen...", HACKER_GREEN),
        ColoredMessage::new("Cross-referencing your code with the hall of shame...", DIM_WHITE),
        ColoredMessage::new("Measuring spaghetti density...", WARNING_AMBER),
        ColoredMessage::new("Summoning a cynical senior engineer from 1997...", HACKER_GREEN),
    ]
});

static FETCHING_MESSAGES: LazyLock<Vec<ColoredMessage>> = LazyLock::new(|| {
    vec![
        ColoredMessage::new("EXTRACTING SPAGHETTI...", HACKER_GREEN),
        ColoredMessage::new("FETCHING SOURCE...", HACKER_GREEN),
        ColoredMessage::new("Pulling the evidence from the repository...", DIM_WHITE),
    ]
});

static PURIFYING_MESSAGES: LazyLock<Vec<ColoredMessage>> = LazyLock::new(|| {
    vec![
        ColoredMessage::new("PURIFYING...", PURIFY_BLUE),
        ColoredMessage::new("Performing the purification ritual...", PURIFY_BLUE),
        ColoredMessage::new("Untangling the pasta, one strand at a time...", CODE_CYAN),
        ColoredMessage::new("Consulting the Benevolent Clean Code Architect...", PURIFY_BLUE),
    ]
});

static PAINTING_MESSAGES: LazyLock<Vec<ColoredMessage>> = LazyLock::new(|| {
    vec![
        ColoredMessage::new("PAINTING...", HACKER_GREEN),
        ColoredMessage::new("Rendering your portrait of shame...", DIM_WHITE),
    ]
});

fn pick(messages: &[ColoredMessage], fallback: &str) -> ColoredMessage {
    messages
        .choose(&mut rand::rng())
        .cloned()
        .unwrap_or_else(|| ColoredMessage::new(fallback, HACKER_GREEN))
}

/// Message shown while a roast is loading
pub fn get_scanning_message() -> ColoredMessage {
    pick(&SCANNING_MESSAGES, "SCANNING CODE...")
}

/// Message shown while a repository link is being fetched
pub fn get_fetching_message() -> ColoredMessage {
    pick(&FETCHING_MESSAGES, "EXTRACTING SPAGHETTI...")
}

/// Message shown while a fix is being generated
pub fn get_purifying_message() -> ColoredMessage {
    pick(&PURIFYING_MESSAGES, "PURIFYING...")
}

/// Message shown while the card image is being resolved
pub fn get_painting_message() -> ColoredMessage {
    pick(&PAINTING_MESSAGES, "PAINTING...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_come_from_their_pool() {
        let message = get_purifying_message();
        assert!(PURIFYING_MESSAGES.contains(&message));
        assert!(!get_scanning_message().text.is_empty());
    }
}
