//! Cloudflare Workers AI adapter.
//!
//! Workers AI is reachable two ways: through an AI gateway (the
//! preferred deployment, one hop of auth and observability) or straight
//! against the platform REST API. Both take the same chat envelope and
//! answer with the same family of response shapes.
//! See: <https://developers.cloudflare.com/workers-ai/>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::extract::{self, Strategy};
use super::traits::{AnswerProvider, Transport};
use super::{SYSTEM_PROMPT, truncate_body};
use crate::{KvasirError, Result};

/// Default text-generation model on Workers AI.
pub const DEFAULT_VARIANT: &str = "@cf/meta/llama-2-7b-chat-fp16";

/// Provider name used in error messages.
const DISPLAY_NAME: &str = "Cloudflare AI";

/// Base URL for direct platform API calls.
const DEFAULT_DIRECT_BASE_URL: &str = "https://api.cloudflare.com";

/// Shapes Workers AI has returned over time, in priority order: the
/// REST envelope, the bare binding shape, then the OpenAI-compatible
/// shape some gateway endpoints emit.
const STRATEGIES: &[Strategy] = &[
    extract::result_response,
    extract::bare_response,
    extract::chat_choice,
];

/// Client for Cloudflare Workers AI.
#[derive(Clone)]
pub struct CloudflareAi {
    http: Client,
    api_token: String,
    route: Route,
    default_variant: String,
}

#[derive(Clone)]
enum Route {
    /// POST `{endpoint_base}/{variant}` through an AI gateway.
    Gateway { endpoint_base: String },
    /// POST `{base}/client/v4/accounts/{account_id}/ai/run/{variant}`.
    Direct {
        base_url: String,
        account_id: String,
    },
}

impl CloudflareAi {
    /// Create a client routed through an AI gateway.
    ///
    /// `endpoint_base` is the gateway's `workers-ai` provider URL, e.g.
    /// from [`AiGateway::provider_url`](super::AiGateway::provider_url).
    pub fn via_gateway(api_token: impl Into<String>, endpoint_base: impl Into<String>) -> Self {
        Self::build(
            api_token,
            Route::Gateway {
                endpoint_base: endpoint_base.into(),
            },
        )
    }

    /// Create a client against the platform API directly.
    pub fn direct(api_token: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self::direct_with_base_url(api_token, account_id, DEFAULT_DIRECT_BASE_URL)
    }

    /// Direct client with a custom base URL (for testing with wiremock).
    pub fn direct_with_base_url(
        api_token: impl Into<String>,
        account_id: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self::build(
            api_token,
            Route::Direct {
                base_url: base_url.into(),
                account_id: account_id.into(),
            },
        )
    }

    /// Override the default model variant.
    pub fn default_variant(mut self, variant: impl Into<String>) -> Self {
        self.default_variant = variant.into();
        self
    }

    fn build(api_token: impl Into<String>, route: Route) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            api_token: api_token.into(),
            route,
            default_variant: DEFAULT_VARIANT.to_string(),
        }
    }

    fn run_url(&self, variant: &str) -> String {
        match &self.route {
            Route::Gateway { endpoint_base } => format!("{endpoint_base}/{variant}"),
            Route::Direct {
                base_url,
                account_id,
            } => format!("{base_url}/client/v4/accounts/{account_id}/ai/run/{variant}"),
        }
    }
}

#[async_trait]
impl AnswerProvider for CloudflareAi {
    fn name(&self) -> &'static str {
        "cloudflare"
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
            .post(self.run_url(variant))
            .header("Authorization", format!("Bearer {}", self.api_token))
            .json(&ChatEnvelope {
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
    messages: &'a [ChatMessage<'a>],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}
