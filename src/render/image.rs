//! Card portrait: URL construction, load state and retrieval
//!
//! The primary portrait comes from a text-to-image service seeded fresh on
//! every render. If it fails, one fallback avatar is tried; if that fails too
//! the slot settles as broken and nothing is retried.

use crate::config::ServiceConfig;
use crate::types::RoastCard;
use crate::{log_debug, log_warn};
use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use std::time::Duration;
use url::Url;

const PORTRAIT_SIZE: &str = "400";

/// Failure to build or load a portrait
#[derive(Debug, thiserror::Error)]
pub enum ImageLoadError {
    #[error("Invalid image service URL: {0}")]
    InvalidUrl(String),
    #[error("Image request failed: {0}")]
    Request(String),
    #[error("Image service returned status {0}")]
    Status(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ImageSource {
    Primary,
    Fallback,
}

/// A portrait URL and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub source: ImageSource,
    pub url: String,
}

impl ImageRequest {
    /// `{image_base}/prompt/{image_prompt}?width=400&height=400&nologo=true&seed={seed}`
    pub fn primary(
        services: &ServiceConfig,
        card: &RoastCard,
        seed: u32,
    ) -> Result<Self, ImageLoadError> {
        let mut url = base_url(&services.image_base)?;
        push_segments(&mut url, &["prompt", &card.image_prompt])?;
        url.query_pairs_mut()
            .append_pair("width", PORTRAIT_SIZE)
            .append_pair("height", PORTRAIT_SIZE)
            .append_pair("nologo", "true")
            .append_pair("seed", &seed.to_string());

        Ok(Self {
            source: ImageSource::Primary,
            url: url.into(),
        })
    }

    /// `{avatar_base}/{archetype}?set=set2&size=400x400`
    pub fn fallback(services: &ServiceConfig, card: &RoastCard) -> Result<Self, ImageLoadError> {
        let mut url = base_url(&services.avatar_base)?;
        push_segments(&mut url, &[&card.archetype])?;
        url.query_pairs_mut()
            .append_pair("set", "set2")
            .append_pair("size", &format!("{PORTRAIT_SIZE}x{PORTRAIT_SIZE}"));

        Ok(Self {
            source: ImageSource::Fallback,
            url: url.into(),
        })
    }
}

fn base_url(base: &str) -> Result<Url, ImageLoadError> {
    Url::parse(base).map_err(|e| ImageLoadError::InvalidUrl(format!("{base}: {e}")))
}

fn push_segments(url: &mut Url, segments: &[&str]) -> Result<(), ImageLoadError> {
    let display = url.to_string();
    let mut path = url
        .path_segments_mut()
        .map_err(|()| ImageLoadError::InvalidUrl(display))?;
    path.pop_if_empty();
    for segment in segments {
        path.push(segment);
    }
    Ok(())
}

/// Fresh seed so each render asks for a new portrait
pub fn random_seed() -> u32 {
    rand::rng().random_range(0..1_000_000)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Loading(ImageSource),
    Loaded(ImageSource),
    Broken,
}

/// Load state of the card portrait
///
/// `Loading(primary) -> Loading(fallback) -> Broken` on errors, `Loaded` on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSlot {
    primary: Option<ImageRequest>,
    fallback: Option<ImageRequest>,
    state: SlotState,
}

impl ImageSlot {
    /// Start loading the portrait for `card` with the given seed
    pub fn new(services: &ServiceConfig, card: &RoastCard, seed: u32) -> Self {
        let primary = ImageRequest::primary(services, card, seed)
            .map_err(|e| log_warn!("Primary portrait unavailable: {}", e))
            .ok();
        let fallback = ImageRequest::fallback(services, card)
            .map_err(|e| log_warn!("Fallback portrait unavailable: {}", e))
            .ok();

        let state = if primary.is_some() {
            SlotState::Loading(ImageSource::Primary)
        } else if fallback.is_some() {
            SlotState::Loading(ImageSource::Fallback)
        } else {
            SlotState::Broken
        };

        Self {
            primary,
            fallback,
            state,
        }
    }

    fn request(&self, source: ImageSource) -> Option<&ImageRequest> {
        match source {
            ImageSource::Primary => self.primary.as_ref(),
            ImageSource::Fallback => self.fallback.as_ref(),
        }
    }

    /// The request currently being loaded, if any
    pub fn pending(&self) -> Option<&ImageRequest> {
        match self.state {
            SlotState::Loading(source) => self.request(source),
            _ => None,
        }
    }

    /// The request that loaded successfully, if any
    pub fn loaded(&self) -> Option<&ImageRequest> {
        match self.state {
            SlotState::Loaded(source) => self.request(source),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SlotState::Loading(_))
    }

    pub fn is_broken(&self) -> bool {
        self.state == SlotState::Broken
    }

    /// The pending load failed; move to the fallback once, then give up
    pub fn on_error(&mut self) {
        self.state = match self.state {
            SlotState::Loading(ImageSource::Primary) if self.fallback.is_some() => {
                SlotState::Loading(ImageSource::Fallback)
            }
            SlotState::Loading(_) => SlotState::Broken,
            settled => settled,
        };
    }

    /// The pending load succeeded
    pub fn on_loaded(&mut self) {
        if let SlotState::Loading(source) = self.state {
            self.state = SlotState::Loaded(source);
        }
    }
}

/// Seam to whatever serves portrait images
#[async_trait]
pub trait ImageProbe: Send + Sync {
    /// Fetch the image bytes at `url`
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ImageLoadError>;
}

pub struct HttpImageProbe {
    client: Client,
}

impl HttpImageProbe {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }
}

#[async_trait]
impl ImageProbe for HttpImageProbe {
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ImageLoadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ImageLoadError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ImageLoadError::Status(response.status().as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageLoadError::Request(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Drive `slot` until it settles, returning the loaded image bytes
pub async fn resolve_image(probe: &dyn ImageProbe, slot: &mut ImageSlot) -> Option<Vec<u8>> {
    while let Some(request) = slot.pending().cloned() {
        log_debug!("Loading {} portrait: {}", request.source, request.url);
        match probe.fetch_image(&request.url).await {
            Ok(bytes) => {
                slot.on_loaded();
                return Some(bytes);
            }
            Err(e) => {
                log_warn!("{} portrait failed: {}", request.source, e);
                slot.on_error();
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> RoastCard {
        RoastCard {
            archetype: "The Spaghetti Chef".to_string(),
            image_prompt: "A chaotic chef & neon pasta".to_string(),
            ..RoastCard::system_failure()
        }
    }

    #[test]
    fn test_primary_url() {
        let request =
            ImageRequest::primary(&ServiceConfig::default(), &card(), 4242).expect("primary");
        assert_eq!(request.source, ImageSource::Primary);
        assert!(
            request
                .url
                .starts_with("https://image.pollinations.ai/prompt/A%20chaotic%20chef%20&%20neon%20pasta?"),
            "{}",
            request.url
        );
        assert!(
            request
                .url
                .ends_with("?width=400&height=400&nologo=true&seed=4242")
        );
    }

    #[test]
    fn test_fallback_url() {
        let request = ImageRequest::fallback(&ServiceConfig::default(), &card()).expect("fallback");
        assert_eq!(
            request.url,
            "https://robohash.org/The%20Spaghetti%20Chef?set=set2&size=400x400"
        );
    }

    #[test]
    fn test_slash_in_prompt_stays_in_one_segment() {
        let mut c = card();
        c.image_prompt = "input/output".to_string();
        let request = ImageRequest::primary(&ServiceConfig::default(), &c, 1).expect("primary");
        assert!(request.url.contains("/prompt/input%2Foutput?"));
    }

    #[test]
    fn test_slot_falls_back_once_then_breaks() {
        let mut slot = ImageSlot::new(&ServiceConfig::default(), &card(), 7);
        assert_eq!(
            slot.pending().map(|r| r.source),
            Some(ImageSource::Primary)
        );

        slot.on_error();
        assert_eq!(
            slot.pending().map(|r| r.source),
            Some(ImageSource::Fallback)
        );

        slot.on_error();
        assert!(slot.is_broken());
        assert!(slot.pending().is_none());

        // Settled slots ignore further events
        slot.on_error();
        slot.on_loaded();
        assert!(slot.is_broken());
    }

    #[test]
    fn test_slot_loaded() {
        let mut slot = ImageSlot::new(&ServiceConfig::default(), &card(), 7);
        slot.on_loaded();
        assert!(!slot.is_loading());
        assert_eq!(slot.loaded().map(|r| r.source), Some(ImageSource::Primary));
    }

    #[test]
    fn test_bad_base_url_skips_to_fallback() {
        let services = ServiceConfig {
            image_base: "not a url".to_string(),
            ..ServiceConfig::default()
        };
        let slot = ImageSlot::new(&services, &card(), 7);
        assert_eq!(
            slot.pending().map(|r| r.source),
            Some(ImageSource::Fallback)
        );
    }

    #[test]
    fn test_random_seed_range() {
        for _ in 0..100 {
            assert!(random_seed() < 1_000_000);
        }
    }
}
