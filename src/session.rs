//! Roast session orchestration
//!
//! Holds the displayed state and drives a submission through
//! `Idle -> Loading -> {Success, Error}`. Loading lasts at least the configured
//! minimum delay, and a completion that has been overtaken by a newer
//! submission is dropped.

use crate::generation::{GenerationClient, GenerationError};
use crate::types::{GenerationOutput, RoastCard, RoastRequest};
use crate::{log_debug, log_info};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use strum_macros::Display;

/// Message shown when a failure carries no text of its own
pub const UNKNOWN_FAILURE: &str = "Unknown system failure.";

/// Message shown when the roast path receives a rewrite instead of a card
pub const UNEXPECTED_RESPONSE: &str = "Unexpected response type";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum SessionStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Everything the result view renders from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub status: SessionStatus,
    pub data: Option<RoastCard>,
    pub error_message: Option<String>,
    /// Code of the most recent submission, kept for the redemption flow
    pub current_code: String,
    /// Archetype of the last real card, passed on as an avoid hint
    pub last_archetype: Option<String>,
}

/// What happened to a call to [`SessionController::submit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input, nothing changed
    Ignored,
    /// The completion was applied, leaving the session in this status
    Applied(SessionStatus),
    /// A newer submission started before this one finished
    Superseded,
}

/// Map a generation result onto the card to display or the error to show
pub fn classify(result: Result<GenerationOutput, GenerationError>) -> Result<RoastCard, String> {
    match result {
        Ok(GenerationOutput::Roast(card)) => Ok(card),
        Ok(GenerationOutput::Fix(_)) => Err(UNEXPECTED_RESPONSE.to_string()),
        Err(e) => {
            let message = e.to_string();
            if message.trim().is_empty() {
                Err(UNKNOWN_FAILURE.to_string())
            } else {
                Err(message)
            }
        }
    }
}

/// Drives roast submissions and owns the shared session state
#[derive(Clone)]
pub struct SessionController {
    client: GenerationClient,
    min_loading: Duration,
    state: Arc<Mutex<SessionState>>,
    generation: Arc<AtomicU64>,
}

impl SessionController {
    pub fn new(client: GenerationClient, min_loading: Duration) -> Self {
        Self {
            client,
            min_loading,
            state: Arc::new(Mutex::new(SessionState::default())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn client(&self) -> &GenerationClient {
        &self.client
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> SessionState {
        self.state.lock().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.state.lock().status
    }

    /// Roast `code` and record the outcome
    ///
    /// Whitespace-only input is ignored without touching state or the network.
    #[tracing::instrument(name = "roast_submission", skip_all, fields(chars = code.chars().count()))]
    pub async fn submit(&self, code: &str) -> SubmitOutcome {
        if code.trim().is_empty() {
            return SubmitOutcome::Ignored;
        }

        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let avoid = {
            let mut state = self.state.lock();
            state.status = SessionStatus::Loading;
            state.current_code = code.to_string();
            state.error_message = None;
            state.data = None;
            state.last_archetype.clone()
        };
        log_debug!("Submission {} started", token);

        let request = RoastRequest::roast(code).avoiding(avoid);
        let ((), result) = tokio::join!(
            tokio::time::sleep(self.min_loading),
            self.client.generate(&request)
        );

        if self.generation.load(Ordering::SeqCst) != token {
            log_debug!("Submission {} superseded, discarding result", token);
            return SubmitOutcome::Superseded;
        }

        let mut state = self.state.lock();
        match classify(result) {
            Ok(card) => {
                if !card.is_system_failure() {
                    state.last_archetype = Some(card.archetype.clone());
                }
                log_info!("Roast complete: {} ({})", card.archetype, card.score);
                state.data = Some(card);
                state.status = SessionStatus::Success;
            }
            Err(message) => {
                log_info!("Roast failed: {}", message);
                state.data = None;
                state.error_message = Some(message);
                state.status = SessionStatus::Error;
            }
        }
        SubmitOutcome::Applied(state.status)
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("min_loading", &self.min_loading)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FixMarker, FixResult};

    #[test]
    fn test_classify_card() {
        let card = RoastCard::system_failure();
        assert_eq!(
            classify(Ok(GenerationOutput::Roast(card.clone()))),
            Ok(card)
        );
    }

    #[test]
    fn test_classify_fix_on_roast_path() {
        let fix = FixResult {
            mode: FixMarker::Fix,
            fixed_code: "x".to_string(),
            explanation: "y".to_string(),
            new_rank: "z".to_string(),
        };
        assert_eq!(
            classify(Ok(GenerationOutput::Fix(fix))),
            Err("Unexpected response type".to_string())
        );
    }

    #[test]
    fn test_classify_error_keeps_message() {
        assert_eq!(
            classify(Err(GenerationError::Empty)),
            Err("Empty response from mainframe.".to_string())
        );
    }

    #[test]
    fn test_status_display() {
        assert_eq!(SessionStatus::Loading.to_string(), "LOADING");
    }
}
