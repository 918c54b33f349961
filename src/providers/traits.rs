//! The provider seam.
//!
//! Adapters implement one narrow trait rather than exposing their wire
//! types, so the gateway can route on a logical model name and tests
//! can substitute a stub. Availability is decided at construction time
//! by configuration presence, not self-reported per call: a provider
//! that exists in the set can always be asked for an answer.

use async_trait::async_trait;

use crate::Result;

/// How an adapter reaches its upstream, fixed when it is built.
///
/// The choice is made once from which credentials are configured and is
/// never mixed within a single call. Policy enforcement (gateway-first
/// deployments that forbid direct calls) keys off this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Routed through an AI gateway proxy.
    Gateway,
    /// Straight to the provider's own endpoint.
    Direct,
}

/// An upstream service that answers a prompt with plain text.
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    /// Provider name for logging and metrics.
    fn name(&self) -> &'static str;

    /// The transport this adapter was wired with.
    fn transport(&self) -> Transport;

    /// Produce an answer for `prompt`.
    ///
    /// `variant` overrides the configured model variant for this call.
    /// Implementations perform exactly one upstream HTTP call and do
    /// not retry.
    async fn answer(&self, prompt: &str, variant: Option<&str>) -> Result<String>;
}
