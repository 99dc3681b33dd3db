//! Redemption flow
//!
//! After a roast the original code can be "purified" once: a single FIX call
//! whose rewritten code is then revealed character by character. A failed call
//! leaves a notice and returns to idle so the user can try again.

use crate::generation::GenerationClient;
use crate::render::{Reveal, RevealFrame};
use crate::session::{SessionController, SessionStatus};
use crate::types::FixResult;
use crate::{log_info, log_warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use strum_macros::Display;
use tokio::sync::mpsc::UnboundedReceiver;

/// Notice shown when a purification attempt fails
pub const PURIFY_FAILED: &str = "Purification ritual failed. The spaghetti is too strong.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum RedemptionStatus {
    #[default]
    Idle,
    Loading,
    Success,
}

#[derive(Debug, Default)]
struct RedemptionState {
    status: RedemptionStatus,
    result: Option<FixResult>,
    notice: Option<String>,
}

/// Puts an abandoned attempt back to idle when the purify future is dropped mid-call
struct LoadingGuard {
    state: Arc<Mutex<RedemptionState>>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        if state.status == RedemptionStatus::Loading {
            state.status = RedemptionStatus::Idle;
        }
    }
}

#[derive(Debug)]
pub enum PurifyOutcome {
    /// The rewrite arrived; frames of its reveal follow on the receiver
    Purified {
        result: FixResult,
        frames: UnboundedReceiver<RevealFrame>,
    },
    /// The call failed and the flow is idle again
    Failed { notice: String },
    /// A purification is running or already succeeded
    Busy,
}

/// Purification state for one roasted snippet
#[derive(Debug)]
pub struct Redemption {
    client: GenerationClient,
    original_code: String,
    state: Arc<Mutex<RedemptionState>>,
    reveal: Mutex<Reveal>,
}

impl Redemption {
    pub fn new(client: GenerationClient, original_code: impl Into<String>, reveal_interval: Duration) -> Self {
        Self {
            client,
            original_code: original_code.into(),
            state: Arc::new(Mutex::new(RedemptionState::default())),
            reveal: Mutex::new(Reveal::new(reveal_interval)),
        }
    }

    /// Redemption for the session's current roast; `None` unless a roast succeeded
    pub fn for_session(controller: &SessionController, reveal_interval: Duration) -> Option<Self> {
        let snapshot = controller.snapshot();
        (snapshot.status == SessionStatus::Success).then(|| {
            Self::new(
                controller.client().clone(),
                snapshot.current_code,
                reveal_interval,
            )
        })
    }

    pub fn original_code(&self) -> &str {
        &self.original_code
    }

    pub fn status(&self) -> RedemptionStatus {
        self.state.lock().status
    }

    pub fn result(&self) -> Option<FixResult> {
        self.state.lock().result.clone()
    }

    /// Notice left by the last failed attempt
    pub fn notice(&self) -> Option<String> {
        self.state.lock().notice.clone()
    }

    /// Only an idle redemption accepts a purify request
    pub fn can_purify(&self) -> bool {
        self.status() == RedemptionStatus::Idle
    }

    pub fn is_revealing(&self) -> bool {
        self.reveal.lock().is_running()
    }

    /// Ask for the rewrite and start revealing it
    #[tracing::instrument(name = "purification", skip_all)]
    pub async fn purify(&self) -> PurifyOutcome {
        {
            let mut state = self.state.lock();
            if state.status != RedemptionStatus::Idle {
                return PurifyOutcome::Busy;
            }
            state.status = RedemptionStatus::Loading;
            state.notice = None;
        }
        let _guard = LoadingGuard {
            state: Arc::clone(&self.state),
        };

        match self.client.fix(&self.original_code).await {
            Ok(result) => {
                log_info!("Code purified, new rank: {}", result.new_rank);
                {
                    let mut state = self.state.lock();
                    state.status = RedemptionStatus::Success;
                    state.result = Some(result.clone());
                }
                let frames = self.reveal.lock().start(&result.fixed_code);
                PurifyOutcome::Purified { result, frames }
            }
            Err(e) => {
                log_warn!("Purification failed: {}", e);
                let mut state = self.state.lock();
                state.status = RedemptionStatus::Idle;
                state.notice = Some(PURIFY_FAILED.to_string());
                PurifyOutcome::Failed {
                    notice: PURIFY_FAILED.to_string(),
                }
            }
        }
    }
}
