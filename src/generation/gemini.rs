use super::{GenerationError, GenerationPrompt, TextGenerator};
use crate::config::Config;
use crate::log_debug;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

/// Text generation backed by the Gemini `generateContent` endpoint
pub struct GeminiBackend {
    api_key: Option<String>,
    model: String,
    api_base: String,
    client: Client,
}

impl GeminiBackend {
    pub fn new(api_key: Option<String>, model: String, api_base: String, client: Client) -> Self {
        Self {
            api_key,
            model,
            api_base,
            client,
        }
    }

    /// Create the backend from configuration; the API key is resolved once, here
    pub fn from_config(config: &Config) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        Ok(Self::new(
            config.effective_api_key(),
            config.model.clone(),
            config.api_base.trim_end_matches('/').to_string(),
            client,
        ))
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

/// JSON body for a `generateContent` call
pub(super) fn request_body(prompt: &GenerationPrompt) -> Value {
    json!({
        "systemInstruction": {
            "parts": [{ "text": prompt.system_instruction }]
        },
        "contents": [
            {
                "role": "user",
                "parts": [{ "text": prompt.contents }]
            }
        ],
        "generationConfig": {
            "temperature": prompt.temperature,
            "responseMimeType": "application/json",
            "responseSchema": prompt.response_schema
        }
    })
}

/// Pull the reply text out of a `generateContent` response
///
/// The response format is:
/// `{ "candidates": [ { "content": { "parts": [ { "text": "..." } ] } } ] }`
/// Multiple parts are concatenated.
pub(super) fn extract_text(response_body: &Value) -> Result<String, GenerationError> {
    let parts = response_body["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or(GenerationError::Empty)?;

    let text: String = parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect();

    if text.trim().is_empty() {
        Err(GenerationError::Empty)
    } else {
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for GeminiBackend {
    async fn generate_text(&self, prompt: &GenerationPrompt) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::MissingApiKey)?;

        log_debug!("Calling Gemini model {} in {} mode", self.model, prompt.mode);

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .header("Content-Type", "application/json")
            .json(&request_body(prompt))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout
                } else {
                    GenerationError::Request(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status { status, body });
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| GenerationError::Parse(e.to_string()))?;

        extract_text(&response_body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Mode;

    fn prompt() -> GenerationPrompt {
        GenerationPrompt {
            mode: Mode::Roast,
            system_instruction: "be mean".to_string(),
            contents: "fn main() {}".to_string(),
            response_schema: json!({"type": "OBJECT"}),
            temperature: 0.9,
        }
    }

    #[test]
    fn test_request_body_layout() {
        let body = request_body(&prompt());
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be mean");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "fn main() {}");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"a\":" }, { "text": " 1}" }] } }]
        });
        assert_eq!(extract_text(&body).expect("text"), "{\"a\": 1}");
    }

    #[test]
    fn test_extract_text_empty_is_error() {
        let blocked = json!({ "candidates": [], "promptFeedback": { "blockReason": "SAFETY" } });
        assert!(matches!(extract_text(&blocked), Err(GenerationError::Empty)));

        let blank = json!({ "candidates": [{ "content": { "parts": [{ "text": "  " }] } }] });
        assert!(matches!(extract_text(&blank), Err(GenerationError::Empty)));
    }

    #[test]
    fn test_endpoint_uses_model() {
        let backend = GeminiBackend::new(
            None,
            "gemini-3-pro-preview".to_string(),
            "https://example.test/v1beta".to_string(),
            Client::new(),
        );
        assert_eq!(
            backend.endpoint(),
            "https://example.test/v1beta/models/gemini-3-pro-preview:generateContent"
        );
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_network() {
        let backend = GeminiBackend::new(
            None,
            "m".to_string(),
            "http://127.0.0.1:9".to_string(),
            Client::new(),
        );
        let result = backend.generate_text(&prompt()).await;
        assert!(matches!(result, Err(GenerationError::MissingApiKey)));
    }
}
