//! Redemption (fix) result types

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The literal `"fix"` discriminator the model must echo back
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixMarker {
    #[default]
    #[serde(rename = "fix")]
    Fix,
}

/// Model for the purified rewrite of a roasted snippet
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq, Eq)]
pub struct FixResult {
    pub mode: FixMarker,
    /// The refactored, production-ready code
    pub fixed_code: String,
    /// Brief explanation of what changed
    pub explanation: String,
    /// A new, complimentary rank title
    pub new_rank: String,
}
