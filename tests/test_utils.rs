//! Shared fakes for the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use gitmad::render::{ImageLoadError, ImageProbe};
use gitmad::source::{FetchError, RawFetcher};
use gitmad::{GenerationClient, GenerationError, GenerationPrompt, TextGenerator};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// One scripted backend reply
#[derive(Debug, Clone)]
pub struct Reply {
    pub delay: Duration,
    pub body: Result<String, String>,
}

impl Reply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            delay: Duration::ZERO,
            body: Ok(body.into()),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            delay: Duration::ZERO,
            body: Err(message.into()),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Text generator that plays back a fixed list of replies
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<GenerationPrompt>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<GenerationPrompt> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate_text(&self, prompt: &GenerationPrompt) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.clone());
        let reply = self.replies.lock().pop_front();

        let Some(reply) = reply else {
            return Err(GenerationError::Request("script exhausted".to_string()));
        };
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.body.map_err(GenerationError::Request)
    }
}

/// Client backed by `generator` at the default temperature
pub fn client_for(generator: &Arc<ScriptedGenerator>) -> GenerationClient {
    let backend: Arc<dyn TextGenerator> = generator.clone();
    GenerationClient::new(backend, 0.9)
}

/// Raw-source fetcher returning a fixed result after an optional delay
pub struct FakeFetcher {
    pub delay: Duration,
    pub body: Result<String, u16>,
    pub urls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn serving(body: impl Into<String>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            body: Ok(body.into()),
            urls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(status: u16, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            body: Err(status),
            urls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl RawFetcher for FakeFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.urls.lock().push(url.to_string());
        tokio::time::sleep(self.delay).await;
        self.body.clone().map_err(FetchError::Status)
    }
}

/// Image probe that fails every URL containing one of `broken`
pub struct FakeProbe {
    pub broken: Vec<String>,
    pub requested: Mutex<Vec<String>>,
}

impl FakeProbe {
    pub fn breaking(broken: &[&str]) -> Self {
        Self {
            broken: broken.iter().map(|s| (*s).to_string()).collect(),
            requested: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ImageProbe for FakeProbe {
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ImageLoadError> {
        self.requested.lock().push(url.to_string());
        if self.broken.iter().any(|b| url.contains(b.as_str())) {
            Err(ImageLoadError::Status(500))
        } else {
            Ok(url.as_bytes().to_vec())
        }
    }
}

/// A well-formed roast reply
pub fn roast_json(archetype: &str) -> String {
    serde_json::json!({
        "archetype": archetype,
        "score": 12,
        "emoji": "🍝",
        "image_prompt": "A chef drowning in noodles",
        "theme_color": "#ffaa00",
        "quote": "Your code is a plate of carbs.",
        "stats": { "sanity": 10, "efficiency": 20, "style": 5 },
        "details": "**Nested** callbacks everywhere."
    })
    .to_string()
}

/// A well-formed fix reply
pub fn fix_json(fixed_code: &str) -> String {
    serde_json::json!({
        "mode": "fix",
        "fixed_code": fixed_code,
        "explanation": "Flattened the callbacks.",
        "new_rank": "Async Paladin"
    })
    .to_string()
}
