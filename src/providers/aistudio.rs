//! Google AI Studio (Gemini API) adapter.
//!
//! AI Studio serves the same Gemini models as Vertex AI but with plain
//! API-key auth and no project/location coordinates, which makes it the
//! low-ceremony way to reach Gemini. The key travels as a query
//! parameter, so outbound URLs for this provider must never be logged
//! or echoed into error messages.
//! See: <https://ai.google.dev/api/rest>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::extract::{self, Strategy};
use super::traits::{AnswerProvider, Transport};
use super::truncate_body;
use crate::{KvasirError, Result};

/// Default Gemini model on AI Studio.
pub const DEFAULT_VARIANT: &str = "gemini-1.5-flash";

/// Provider name used in error messages.
const DISPLAY_NAME: &str = "AI Studio";

/// Base URL for the generative language API.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const STRATEGIES: &[Strategy] = &[extract::gemini_candidates, extract::chat_choice];

/// Client for the AI Studio `generateContent` endpoint.
#[derive(Clone)]
pub struct AiStudio {
    http: Client,
    api_key: String,
    base_url: String,
    default_variant: String,
}

impl AiStudio {
    /// Create a client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into(),
            default_variant: DEFAULT_VARIANT.to_string(),
        }
    }

    /// Override the default model variant.
    pub fn default_variant(mut self, variant: impl Into<String>) -> Self {
        self.default_variant = variant.into();
        self
    }

    /// Endpoint path without the key; the key is attached as a query
    /// pair at send time so it never sits in a loggable string.
    fn generate_url(&self, variant: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, variant
        )
    }
}

#[async_trait]
impl AnswerProvider for AiStudio {
    fn name(&self) -> &'static str {
        "ai-studio"
    }

    fn transport(&self) -> Transport {
        Transport::Direct
    }

    async fn answer(&self, prompt: &str, variant: Option<&str>) -> Result<String> {
        let variant = variant.unwrap_or(&self.default_variant);

        let response = self
            .http
            .post(self.generate_url(variant))
            .query(&[("key", self.api_key.as_str())])
            .json(&GenerateRequest {
                contents: &[Content {
                    role: "user",
                    parts: &[Part { text: prompt }],
                }],
            })
            .send()
            .await
            .map_err(|e| KvasirError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KvasirError::Provider {
                provider: DISPLAY_NAME,
                status: status.as_u16(),
                message: truncate_body(&body),
            });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| KvasirError::Http(e.to_string()))?;

        extract::first_match(&json, STRATEGIES).ok_or(KvasirError::EmptyAnswer(DISPLAY_NAME))
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: &'a [Content<'a>],
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: &'a [Part<'a>],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_omits_the_api_key() {
        let client = AiStudio::new("super-secret");
        let url = client.generate_url("gemini-1.5-flash");
        assert_eq!(
            url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
        assert!(!url.contains("super-secret"));
    }

    #[test]
    fn reports_direct_transport() {
        assert_eq!(AiStudio::new("k").transport(), Transport::Direct);
    }
}
