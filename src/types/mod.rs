//! Structured results produced by the generation service
//!
//! This module consolidates the request and response shapes exchanged with the model:
//! - Roast cards (the critique + persona result)
//! - Fix results (the redemption rewrite)

mod fix;
mod roast;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use fix::{FixMarker, FixResult};
pub use roast::{RoastCard, RoastStats, SYSTEM_FAILURE_ARCHETYPE, clamp_percent};

/// Marker prefixed to the source text of a FIX request
pub const FIX_MARKER: &str = "MODE: FIX";

/// Which prompt and schema a request is generated with
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Mode {
    /// Critique the code and build a character card
    #[default]
    Roast,
    /// Rewrite the code into something clean
    Fix,
}

impl Mode {
    /// Detect the mode from raw request text by looking for the fix marker
    pub fn detect(text: &str) -> Self {
        if text.starts_with(FIX_MARKER) {
            Self::Fix
        } else {
            Self::Roast
        }
    }
}

/// A single generation request. Built per user action and dropped once the call completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoastRequest {
    pub mode: Mode,
    pub source_text: String,
    /// Archetype the model should not hand out again (best-effort prompt hint)
    pub avoid_archetype: Option<String>,
}

impl RoastRequest {
    /// Request a roast of `code`
    pub fn roast(code: impl Into<String>) -> Self {
        Self {
            mode: Mode::Roast,
            source_text: code.into(),
            avoid_archetype: None,
        }
    }

    /// Request a rewrite of `code`, prefixed with the fix marker
    pub fn fix(code: &str) -> Self {
        Self {
            mode: Mode::Fix,
            source_text: format!("{FIX_MARKER} \n\n{code}"),
            avoid_archetype: None,
        }
    }

    /// Build a request from raw text, choosing the mode from its marker
    pub fn from_text(text: impl Into<String>) -> Self {
        let source_text = text.into();
        Self {
            mode: Mode::detect(&source_text),
            source_text,
            avoid_archetype: None,
        }
    }

    pub fn avoiding(mut self, archetype: Option<String>) -> Self {
        self.avoid_archetype = archetype.filter(|a| !a.trim().is_empty());
        self
    }
}

/// Result of a generation call, tagged by kind instead of sniffed by field presence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GenerationOutput {
    Roast(RoastCard),
    Fix(FixResult),
}

impl GenerationOutput {
    pub fn kind(&self) -> Mode {
        match self {
            Self::Roast(_) => Mode::Roast,
            Self::Fix(_) => Mode::Fix,
        }
    }

    pub fn into_roast(self) -> Option<RoastCard> {
        match self {
            Self::Roast(card) => Some(card),
            Self::Fix(_) => None,
        }
    }

    pub fn into_fix(self) -> Option<FixResult> {
        match self {
            Self::Fix(fix) => Some(fix),
            Self::Roast(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_detection() {
        assert_eq!(Mode::detect("MODE: FIX \n\nfn main() {}"), Mode::Fix);
        assert_eq!(Mode::detect("fn main() {}"), Mode::Roast);
        // Marker only counts at the very start
        assert_eq!(Mode::detect("  MODE: FIX"), Mode::Roast);
    }

    #[test]
    fn test_fix_request_is_prefixed() {
        let request = RoastRequest::fix("let x = 1;");
        assert_eq!(request.mode, Mode::Fix);
        assert_eq!(request.source_text, "MODE: FIX \n\nlet x = 1;");
        assert_eq!(RoastRequest::from_text(request.source_text).mode, Mode::Fix);
    }

    #[test]
    fn test_blank_avoid_hint_is_dropped() {
        let request = RoastRequest::roast("x").avoiding(Some("   ".to_string()));
        assert_eq!(request.avoid_archetype, None);
    }

    #[test]
    fn test_output_is_tagged_by_kind() {
        let output = GenerationOutput::Roast(RoastCard::system_failure());
        let value = serde_json::to_value(&output).expect("serialize output");
        assert_eq!(value["kind"], "roast");
        assert_eq!(value["archetype"], "System Failure");
        assert_eq!(output.kind(), Mode::Roast);
        assert!(output.into_fix().is_none());
    }

    #[test]
    fn test_mode_parses_case_insensitively() {
        assert_eq!("FIX".parse::<Mode>().ok(), Some(Mode::Fix));
        assert_eq!(Mode::Roast.to_string(), "roast");
    }
}
