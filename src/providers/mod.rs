//! Provider adapters that turn a prompt into plain answer text.
//!
//! Each adapter owns one upstream API: it builds the provider-specific
//! request envelope, performs exactly one HTTP call, and normalizes the
//! response through the strategies in [`extract`]. Nothing here
//! retries; a failed call surfaces as a tagged error and the caller
//! decides what to tell the client.

pub mod ai_gateway;
pub mod aistudio;
pub mod cloudflare;
pub mod extract;
pub mod openai;
pub mod traits;
pub mod vertex;

pub use ai_gateway::AiGateway;
pub use aistudio::AiStudio;
pub use cloudflare::CloudflareAi;
pub use openai::OpenAi;
pub use traits::{AnswerProvider, Transport};
pub use vertex::VertexAi;

/// System message prepended to chat-style envelopes.
pub(crate) const SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

/// Longest upstream error body carried into an error message.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Truncate an upstream error body for diagnostics.
///
/// Upstream errors sometimes echo the request back; keeping only a
/// prefix bounds both log size and how much prompt text can leak into
/// an error response.
pub(crate) fn truncate_body(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        body.to_string()
    } else {
        let cut: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{cut}…")
    }
}
