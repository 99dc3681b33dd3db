//! GitMad - code roasting from the terminal
//!
//! This library turns a code snippet into an RPG-style "character card" critique
//! generated by a hosted language model, with an optional redemption pass that
//! rewrites the snippet into clean code and reveals it progressively.

// Allow certain clippy warnings that are stylistic
#![allow(clippy::uninlined_format_args)] // Style preference
#![allow(clippy::format_push_string)] // Performance improvement but stylistic
#![allow(clippy::return_self_not_must_use)] // Builder pattern is clear enough
#![allow(clippy::items_after_statements)] // Locally-scoped use statements are fine

pub mod cli;
pub mod commands;
pub mod common;
pub mod config;
pub mod generation;
pub mod logger;
pub mod messages;
pub mod redemption;
pub mod render;
pub mod session;
pub mod source;
pub mod types;
pub mod ui;

// Re-export important structs and functions for easier testing
pub use config::Config;
pub use generation::{GenerationClient, GenerationError, GenerationPrompt, TextGenerator};
pub use redemption::{PURIFY_FAILED, PurifyOutcome, Redemption, RedemptionStatus};
pub use session::{SessionController, SessionState, SessionStatus, SubmitOutcome};
pub use source::{FetchError, InputBuffer, RawFetcher};

// Re-exports from types module
pub use types::{FixResult, GenerationOutput, Mode, RoastCard, RoastRequest, RoastStats};
