//! Generation client
//!
//! Builds a mode-specific prompt and response schema, sends it to the text
//! generation backend and turns the JSON reply into a typed result. Roasts
//! that fail degrade to a fixed placeholder card; fixes propagate the error.

mod gemini;
mod parser;
mod prompts;
mod schema;

pub use gemini::GeminiBackend;
pub use parser::{clean_json_from_llm, parse_structured};
pub use prompts::{ARCHETYPES, VisualArchetype, fix_instruction, roast_instruction};
pub use schema::{fix_schema, roast_schema, schema_for_mode};

use crate::config::Config;
use crate::types::{FixResult, GenerationOutput, Mode, RoastCard, RoastRequest};
use crate::{log_debug, log_warn};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Failure of a single generation call
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("No API key configured for the generation service")]
    MissingApiKey,
    #[error("Generation request failed: {0}")]
    Request(String),
    #[error("Generation service returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Generation request timed out")]
    Timeout,
    #[error("Empty response from mainframe.")]
    Empty,
    #[error("Response is not valid JSON: {0}")]
    Parse(String),
    #[error("Response does not match the {mode} schema: {reason}")]
    Shape { mode: Mode, reason: String },
}

/// Everything the backend needs for one call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationPrompt {
    pub mode: Mode,
    pub system_instruction: String,
    pub contents: String,
    pub response_schema: Value,
    pub temperature: f32,
}

/// Seam to the hosted text-generation service
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Return the raw text of the model's reply
    async fn generate_text(&self, prompt: &GenerationPrompt) -> Result<String, GenerationError>;
}

/// Client shared by the roast and redemption flows
///
/// Constructed once at start-up and immutable afterwards; clones share the backend.
#[derive(Clone)]
pub struct GenerationClient {
    backend: Arc<dyn TextGenerator>,
    temperature: f32,
}

impl GenerationClient {
    pub fn new(backend: Arc<dyn TextGenerator>, temperature: f32) -> Self {
        Self {
            backend,
            temperature,
        }
    }

    /// Build a client talking to Gemini with the given configuration
    pub fn from_config(config: &Config) -> Result<Self, GenerationError> {
        let backend = GeminiBackend::from_config(config)?;
        Ok(Self::new(Arc::new(backend), config.temperature))
    }

    /// Build the prompt for a request without sending it
    pub fn build_prompt(&self, request: &RoastRequest) -> GenerationPrompt {
        let system_instruction = match request.mode {
            Mode::Roast => roast_instruction(request.avoid_archetype.as_deref()),
            Mode::Fix => fix_instruction(),
        };

        GenerationPrompt {
            mode: request.mode,
            system_instruction,
            contents: request.source_text.clone(),
            response_schema: schema_for_mode(request.mode),
            temperature: self.temperature,
        }
    }

    /// Generate a result for `request`
    ///
    /// Roast failures are absorbed into [`RoastCard::system_failure`]; fix failures are returned.
    pub async fn generate(&self, request: &RoastRequest) -> Result<GenerationOutput, GenerationError> {
        match self.try_generate(request).await {
            Ok(output) => Ok(output),
            Err(e) if request.mode == Mode::Roast => {
                log_warn!("Roast generation failed, using placeholder card: {}", e);
                Ok(GenerationOutput::Roast(RoastCard::system_failure()))
            }
            Err(e) => {
                log_warn!("Fix generation failed: {}", e);
                Err(e)
            }
        }
    }

    /// Generate without the roast fallback policy
    pub async fn try_generate(
        &self,
        request: &RoastRequest,
    ) -> Result<GenerationOutput, GenerationError> {
        let prompt = self.build_prompt(request);
        log_debug!(
            "Generating {} ({} chars of input)",
            prompt.mode,
            prompt.contents.chars().count()
        );

        let text = self.backend.generate_text(&prompt).await?;
        if text.trim().is_empty() {
            return Err(GenerationError::Empty);
        }

        let output = match request.mode {
            Mode::Roast => GenerationOutput::Roast(parse_structured::<RoastCard>(&text, Mode::Roast)?),
            Mode::Fix => GenerationOutput::Fix(parse_structured::<FixResult>(&text, Mode::Fix)?),
        };
        log_debug!("Generated {} result", output.kind());
        Ok(output)
    }

    /// Roast `code`, never failing
    pub async fn roast(&self, code: &str, avoid_archetype: Option<String>) -> RoastCard {
        let request = RoastRequest::roast(code).avoiding(avoid_archetype);
        match self.generate(&request).await {
            Ok(GenerationOutput::Roast(card)) => card,
            _ => RoastCard::system_failure(),
        }
    }

    /// Ask for a cleaned-up rewrite of `code`
    pub async fn fix(&self, code: &str) -> Result<FixResult, GenerationError> {
        let request = RoastRequest::fix(code);
        match self.generate(&request).await? {
            GenerationOutput::Fix(fix) => Ok(fix),
            GenerationOutput::Roast(_) => Err(GenerationError::Shape {
                mode: Mode::Fix,
                reason: "Invalid response format for fix mode".to_string(),
            }),
        }
    }
}

impl std::fmt::Debug for GenerationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationClient")
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}
