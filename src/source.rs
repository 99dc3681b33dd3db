//! Input collection
//!
//! Owns the code buffer. A pasted repository file-view link is swapped for the
//! raw file contents in the background; the link stays put if the fetch fails.

use crate::log_debug;
use crate::log_warn;
use crate::session::{SessionController, SubmitOutcome};
use async_trait::async_trait;
use parking_lot::Mutex;
use regex::Regex;
use reqwest::Client;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

static FILE_VIEW_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(www\.)?github\.com/[\w-]+/[\w-]+/blob/.+")
        .expect("file-view link pattern is valid")
});

/// Failure to retrieve a linked source file
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Not a repository file link: {0}")]
    InvalidLink(String),
    #[error("Fetch failed: {0}")]
    Request(String),
    #[error("Fetch returned status {0}")]
    Status(u16),
}

/// Whether `text` (trimmed) is a single repository file-view link
pub fn is_file_view_link(text: &str) -> bool {
    FILE_VIEW_LINK.is_match(text.trim())
}

/// Rewrite a file-view link to the raw-content URL on `raw_host`
///
/// `https://github.com/acme/widgets/blob/main/src/index.ts` becomes
/// `https://raw.githubusercontent.com/acme/widgets/main/src/index.ts`.
pub fn raw_url(link: &str, raw_host: &str) -> Result<String, FetchError> {
    let link = link.trim();
    if !is_file_view_link(link) {
        return Err(FetchError::InvalidLink(link.to_string()));
    }

    let mut url = Url::parse(link).map_err(|_| FetchError::InvalidLink(link.to_string()))?;
    let segments: Vec<String> = url
        .path_segments()
        .map(|segments| segments.map(str::to_string).collect())
        .unwrap_or_default();

    // owner / repo / blob / ref / path...
    if segments.get(2).map(String::as_str) != Some("blob") {
        return Err(FetchError::InvalidLink(link.to_string()));
    }

    let mut kept = segments;
    kept.remove(2);
    url.set_path(&kept.join("/"));
    url.set_host(Some(raw_host))
        .map_err(|_| FetchError::InvalidLink(link.to_string()))?;

    Ok(url.to_string())
}

/// Seam to whatever serves raw file contents
#[async_trait]
pub trait RawFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}

/// Plain HTTP GET fetcher
pub struct HttpRawFetcher {
    client: Client,
}

impl HttpRawFetcher {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }
}

#[async_trait]
impl RawFetcher for HttpRawFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))
    }
}

#[derive(Debug, Default)]
struct BufferState {
    text: String,
    fetching: bool,
}

/// Clears the fetching flag when dropped, whatever happened to the fetch
struct FetchGuard {
    state: Arc<Mutex<BufferState>>,
}

impl FetchGuard {
    fn acquire(state: &Arc<Mutex<BufferState>>) -> Self {
        state.lock().fetching = true;
        Self {
            state: Arc::clone(state),
        }
    }
}

impl Drop for FetchGuard {
    fn drop(&mut self) {
        self.state.lock().fetching = false;
    }
}

/// The code input buffer
#[derive(Clone)]
pub struct InputBuffer {
    state: Arc<Mutex<BufferState>>,
    fetcher: Arc<dyn RawFetcher>,
    raw_host: String,
}

impl InputBuffer {
    pub fn new(fetcher: Arc<dyn RawFetcher>, raw_host: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(BufferState::default())),
            fetcher,
            raw_host: raw_host.into(),
        }
    }

    pub fn text(&self) -> String {
        self.state.lock().text.clone()
    }

    /// True while a linked file is being fetched
    pub fn is_fetching(&self) -> bool {
        self.state.lock().fetching
    }

    /// Replace the buffer contents
    ///
    /// When `value` is a file-view link a background fetch starts and its handle is
    /// returned. On success the buffer takes the fetched text, unless it was edited
    /// in the meantime.
    pub fn set_text(&self, value: impl Into<String>) -> Option<JoinHandle<()>> {
        let value = value.into();
        self.state.lock().text.clone_from(&value);

        let link = value.trim().to_string();
        if !is_file_view_link(&link) {
            return None;
        }

        let url = match raw_url(&link, &self.raw_host) {
            Ok(url) => url,
            Err(e) => {
                log_warn!("Could not rewrite link {}: {}", link, e);
                return None;
            }
        };

        let guard = FetchGuard::acquire(&self.state);
        let fetcher = Arc::clone(&self.fetcher);
        let state = Arc::clone(&self.state);

        Some(tokio::spawn(async move {
            let _guard = guard;
            log_debug!("Fetching raw source from {}", url);
            match fetcher.fetch_text(&url).await {
                Ok(text) => {
                    let mut buffer = state.lock();
                    if buffer.text == value {
                        buffer.text = text;
                    } else {
                        log_debug!("Buffer edited during fetch, keeping the edit");
                    }
                }
                Err(e) => {
                    log_warn!("Failed to fetch linked source: {}", e);
                }
            }
        }))
    }

    /// Text that would be submitted right now, if any
    pub fn pending_submission(&self) -> Option<String> {
        let state = self.state.lock();
        if state.fetching || state.text.trim().is_empty() {
            None
        } else {
            Some(state.text.clone())
        }
    }

    /// Forward the buffer to the controller; a blank buffer or an in-flight fetch is a no-op
    pub async fn submit(&self, controller: &SessionController) -> SubmitOutcome {
        match self.pending_submission() {
            Some(code) => controller.submit(&code).await,
            None => SubmitOutcome::Ignored,
        }
    }
}

impl std::fmt::Debug for InputBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("InputBuffer")
            .field("len", &state.text.len())
            .field("fetching", &state.fetching)
            .field("raw_host", &self.raw_host)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_detection() {
        assert!(is_file_view_link(
            "https://github.com/acme/widgets/blob/main/src/index.ts"
        ));
        assert!(is_file_view_link(
            "  http://www.github.com/acme/my-repo/blob/dev/a.py\n"
        ));
        assert!(!is_file_view_link("https://github.com/acme/widgets"));
        assert!(!is_file_view_link("https://gitlab.com/acme/widgets/blob/main/a.rs"));
        assert!(!is_file_view_link("fn main() {}"));
    }

    #[test]
    fn test_raw_url_rewrite() {
        assert_eq!(
            raw_url(
                "https://github.com/acme/widgets/blob/main/src/index.ts",
                "raw.githubusercontent.com"
            )
            .expect("rewrite"),
            "https://raw.githubusercontent.com/acme/widgets/main/src/index.ts"
        );
    }

    #[test]
    fn test_raw_url_rewrite_www_host() {
        assert_eq!(
            raw_url(
                "https://www.github.com/acme/widgets/blob/v1/lib/blob/x.rs",
                "raw.githubusercontent.com"
            )
            .expect("rewrite"),
            "https://raw.githubusercontent.com/acme/widgets/v1/lib/blob/x.rs"
        );
    }

    #[test]
    fn test_raw_url_rejects_plain_text() {
        assert!(matches!(
            raw_url("hello", "raw.githubusercontent.com"),
            Err(FetchError::InvalidLink(_))
        ));
    }
}
