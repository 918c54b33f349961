//! Google Vertex AI adapter.
//!
//! Vertex AI authenticates with a short-lived OAuth bearer token rather
//! than an API key; the [`TokenManager`] handles the exchange and
//! caching. Calls always go straight to the regional Vertex endpoint,
//! there is no gateway route for this provider.
//! See: <https://cloud.google.com/vertex-ai/docs/reference/rest>

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::extract::{self, Strategy};
use super::traits::{AnswerProvider, Transport};
use super::truncate_body;
use crate::auth::TokenManager;
use crate::{KvasirError, Result};

/// Default Gemini model on Vertex AI.
pub const DEFAULT_VARIANT: &str = "gemini-pro";

/// Provider name used in error messages.
const DISPLAY_NAME: &str = "Vertex AI";

/// Gemini candidate shape first, then the OpenAI-compatible shape some
/// proxy deployments rewrite it into.
const STRATEGIES: &[Strategy] = &[extract::gemini_candidates, extract::chat_choice];

/// Client for Vertex AI `generateContent`.
pub struct VertexAi {
    http: Client,
    tokens: Arc<TokenManager>,
    project_id: String,
    location: String,
    base_url: String,
    default_variant: String,
}

impl VertexAi {
    /// Create a client against the regional production endpoint.
    pub fn new(
        tokens: Arc<TokenManager>,
        project_id: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        let location = location.into();
        let base_url = format!("https://{location}-aiplatform.googleapis.com");
        Self::with_base_url(tokens, project_id, location, base_url)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(
        tokens: Arc<TokenManager>,
        project_id: impl Into<String>,
        location: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            tokens,
            project_id: project_id.into(),
            location: location.into(),
            base_url: base_url.into(),
            default_variant: DEFAULT_VARIANT.to_string(),
        }
    }

    /// Override the default model variant.
    pub fn default_variant(mut self, variant: impl Into<String>) -> Self {
        self.default_variant = variant.into();
        self
    }

    fn generate_url(&self, variant: &str) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
            self.base_url, self.project_id, self.location, variant
        )
    }
}

#[async_trait]
impl AnswerProvider for VertexAi {
    fn name(&self) -> &'static str {
        "vertex-ai"
    }

    fn transport(&self) -> Transport {
        Transport::Direct
    }

    async fn answer(&self, prompt: &str, variant: Option<&str>) -> Result<String> {
        let variant = variant.unwrap_or(&self.default_variant);
        let token = self.tokens.bearer_token().await?;

        let response = self
            .http
            .post(self.generate_url(variant))
            .header("Authorization", format!("Bearer {token}"))
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
