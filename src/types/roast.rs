//! Roast card types

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Archetype name carried by the placeholder card
pub const SYSTEM_FAILURE_ARCHETYPE: &str = "System Failure";

/// Per-axis ratings, nominally 0-100
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoastStats {
    /// Logic sanity
    pub sanity: i64,
    /// Performance
    pub efficiency: i64,
    /// Code style
    pub style: i64,
}

impl RoastStats {
    /// Labelled values in display order
    pub fn labelled(&self) -> [(&'static str, i64); 3] {
        [
            ("SANITY", self.sanity),
            ("EFFICIENCY", self.efficiency),
            ("STYLE", self.style),
        ]
    }
}

/// The RPG-style character card generated for a roast
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq, Eq)]
pub struct RoastCard {
    /// Savage archetype name for the coder
    pub archetype: String,
    /// Code quality from 0 (garbage) to 100 (god-tier)
    pub score: i64,
    /// A single emoji representing the code vibe
    pub emoji: String,
    /// Visual description for the image generator
    pub image_prompt: String,
    /// Hex colour matching the archetype
    pub theme_color: String,
    /// Punchy one-liner
    pub quote: String,
    pub stats: RoastStats,
    /// Markdown paragraph roasting the code in detail
    pub details: String,
}

impl RoastCard {
    /// Placeholder card used whenever a roast could not be generated
    pub fn system_failure() -> Self {
        Self {
            archetype: SYSTEM_FAILURE_ARCHETYPE.to_string(),
            score: 0,
            emoji: "💀".to_string(),
            image_prompt:
                "A glitchy computer skull, cyberpunk style, red and black, error screen background"
                    .to_string(),
            theme_color: "#FF0000".to_string(),
            quote: "The code was so bad it killed the API.".to_string(),
            stats: RoastStats::default(),
            details: "Connection severed. The mainframe rejected your request.".to_string(),
        }
    }

    pub fn is_system_failure(&self) -> bool {
        *self == Self::system_failure()
    }

    /// Score clamped for display
    pub fn display_score(&self) -> u8 {
        clamp_percent(self.score)
    }
}

/// Clamp an unconstrained model rating into 0..=100
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
pub fn clamp_percent(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}
