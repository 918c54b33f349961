//! OpenAI chat completions adapter.
//!
//! Like Workers AI, OpenAI is reachable either through an AI gateway
//! (which proxies `/openai` to the chat completions API) or directly.
//! The envelope is the standard chat shape with the variant carried in
//! the body rather than the path.
//! See: <https://platform.openai.com/docs/api-reference/chat>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::extract::{self, Strategy};
use super::traits::{AnswerProvider, Transport};
use super::{SYSTEM_PROMPT, truncate_body};
use crate::{KvasirError, Result};

/// Default chat model.
pub const DEFAULT_VARIANT: &str = "gpt-4o-mini";

/// Provider name used in error messages.
const DISPLAY_NAME: &str = "OpenAI";

/// Base URL for direct API calls.
const DEFAULT_DIRECT_BASE_URL: &str = "https://api.openai.com";

const STRATEGIES: &[Strategy] = &[extract::chat_choice];

/// Client for OpenAI chat completions.
#[derive(Clone)]
pub struct OpenAi {
    http: Client,
    api_key: String,
    route: Route,
    default_variant: String,
}

#[derive(Clone)]
enum Route {
    /// POST `{endpoint_base}/chat/completions` through an AI gateway.
    Gateway { endpoint_base: String },
    /// POST `{base}/v1/chat/completions`.
    Direct { base_url: String },
}

impl OpenAi {
    /// Create a client routed through an AI gateway.
    ///
    /// `endpoint_base` is the gateway's `openai` provider URL.
    pub fn via_gateway(api_key: impl Into<String>, endpoint_base: impl Into<String>) -> Self {
        Self::build(
            api_key,
            Route::Gateway {
                endpoint_base: endpoint_base.into(),
            },
        )
    }

    /// Create a client against the OpenAI API directly.
    pub fn direct(api_key: impl Into<String>) -> Self {
        Self::direct_with_base_url(api_key, DEFAULT_DIRECT_BASE_URL)
    }

    /// Direct client with a custom base URL (for testing with wiremock).
    pub fn direct_with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self::build(
            api_key,
            Route::Direct {
                base_url: base_url.into(),
            },
        )
    }

    /// Override the default model variant.
    pub fn default_variant(mut self, variant: impl Into<String>) -> Self {
        self.default_variant = variant.into();
        self
    }

    fn build(api_key: impl Into<String>, route: Route) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            api_key: api_key.into(),
            route,
            default_variant: DEFAULT_VARIANT.to_string(),
        }
    }

    fn completions_url(&self) -> String {
        match &self.route {
            Route::Gateway { endpoint_base } => format!("{endpoint_base}/chat/completions"),
            Route::Direct { base_url } => format!("{base_url}/v1/chat/completions"),
        }
    }
}

#[async_trait]
impl AnswerProvider for OpenAi {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn transport(&self) -> Transport {
        match self.route {
            Route::Gateway { .. } => Transport::Gateway,
            Route::Direct { .. } => Transport::Direct,
        }
    }

    async fn answer(&self, prompt: &str, variant: Option<&str>) -> Result<String> {
        let variant = variant.unwrap_or(&self.default_variant);
        let messages = [
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT,
            },
            ChatMessage {
                role: "user",
                content: prompt,
            },
        ];

        let response = self
            .http
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&ChatEnvelope {
                model: variant,
                messages: &messages,
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
struct ChatEnvelope<'a> {
    model: &'a str,
    messages: &'a [ChatMessage<'a>],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}
