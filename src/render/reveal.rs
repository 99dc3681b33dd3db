//! Progressive reveal of purified code
//!
//! A reveal is a spawned task that emits growing prefixes of the code on a
//! fixed tick. Only one reveal runs per [`Reveal`]; starting another or dropping
//! the owner cancels it.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// One step of a reveal: the first `shown` characters of the code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealFrame {
    /// Characters visible in this frame
    pub shown: usize,
    /// Total characters in the code
    pub total: usize,
    end: usize,
    code: Arc<str>,
}

impl RevealFrame {
    /// The visible prefix
    pub fn visible(&self) -> &str {
        self.code.get(..self.end).unwrap_or_default()
    }

    pub fn is_complete(&self) -> bool {
        self.shown == self.total
    }
}

struct RevealTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Shortest tick a reveal runs at; `tokio::time::interval` rejects a zero period
pub const MIN_TICK: Duration = Duration::from_millis(1);

/// Owner of the running reveal task
pub struct Reveal {
    interval: Duration,
    current: Option<RevealTask>,
}

impl Reveal {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_TICK),
            current: None,
        }
    }

    /// Start revealing `code`, cancelling any reveal already running
    ///
    /// Emits `code[..0]` immediately, then one more character per interval, for
    /// N+1 frames in total. The receiver closes once the last frame is sent or the
    /// reveal is cancelled.
    pub fn start(&mut self, code: &str) -> UnboundedReceiver<RevealFrame> {
        self.cancel();

        let (tx, rx) = unbounded_channel();
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let interval = self.interval;

        let code: Arc<str> = Arc::from(code);
        let ends: Vec<usize> = code
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(code.len()))
            .collect();
        let total = ends.len() - 1;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            for (shown, end) in ends.into_iter().enumerate() {
                tokio::select! {
                    biased;
                    () = token.cancelled() => return,
                    _ = ticker.tick() => {}
                }

                let frame = RevealFrame {
                    shown,
                    total,
                    end,
                    code: Arc::clone(&code),
                };
                if tx.send(frame).is_err() {
                    return;
                }
            }
        });

        self.current = Some(RevealTask { cancel, handle });
        rx
    }

    /// Stop the running reveal, if any
    pub fn cancel(&mut self) {
        if let Some(task) = self.current.take() {
            task.cancel.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished() && !task.cancel.is_cancelled())
    }
}

impl Drop for Reveal {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Reveal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reveal")
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_reveal_emits_every_prefix_on_the_tick() {
        let mut reveal = Reveal::new(Duration::from_millis(10));
        let started = Instant::now();
        let mut frames = reveal.start("añb");

        let mut seen = Vec::new();
        while let Some(frame) = frames.recv().await {
            seen.push((frame.visible().to_string(), started.elapsed()));
        }

        let texts: Vec<&str> = seen.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(texts, vec!["", "a", "añ", "añb"]);

        let times: Vec<Duration> = seen.iter().map(|(_, t)| *t).collect();
        assert_eq!(
            times,
            vec![
                Duration::ZERO,
                Duration::from_millis(10),
                Duration::from_millis(20),
                Duration::from_millis(30),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_still_reveals_everything() {
        let mut reveal = Reveal::new(Duration::ZERO);
        let mut frames = reveal.start("abc");

        let mut seen = Vec::new();
        while let Some(frame) = frames.recv().await {
            seen.push(frame.visible().to_string());
        }
        assert_eq!(seen, ["", "a", "ab", "abc"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_code_yields_one_frame() {
        let mut reveal = Reveal::new(Duration::from_millis(10));
        let mut frames = reveal.start("");
        let first = frames.recv().await.expect("frame");
        assert_eq!(first.visible(), "");
        assert!(first.is_complete());
        assert!(frames.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_reveal_cancels_previous() {
        let mut reveal = Reveal::new(Duration::from_millis(10));
        let mut old = reveal.start("abcdef");
        assert_eq!(old.recv().await.map(|f| f.shown), Some(0));

        let mut new = reveal.start("xy");

        let mut leftover = Vec::new();
        while let Some(frame) = old.recv().await {
            leftover.push(frame);
        }
        assert!(leftover.iter().all(|f| !f.is_complete()));

        let mut count = 0;
        let mut last = String::new();
        while let Some(frame) = new.recv().await {
            count += 1;
            last = frame.visible().to_string();
        }
        assert_eq!(count, 3);
        assert_eq!(last, "xy");
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let mut reveal = Reveal::new(Duration::from_millis(10));
        let mut frames = reveal.start("abcdef");
        assert!(reveal.is_running());
        drop(reveal);

        let mut completed = false;
        while let Some(frame) = frames.recv().await {
            completed |= frame.is_complete();
        }
        assert!(!completed);
    }
}
