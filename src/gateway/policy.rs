//! Deployment policy for how providers may be reached.

use crate::providers::Transport;
use crate::{KvasirError, Result};

/// Whether the deployment tolerates direct provider calls.
///
/// Gateway-first deployments route all provider traffic through an AI
/// gateway for auth and observability; with `allow_direct_provider`
/// off, an adapter that resolved to a direct transport is refused
/// before any HTTP call is made. The default policy permits
/// everything.
#[derive(Debug, Clone, Copy)]
pub struct GatewayPolicy {
    gateway_first: bool,
    allow_direct_provider: bool,
}

impl Default for GatewayPolicy {
    fn default() -> Self {
        Self {
            gateway_first: false,
            allow_direct_provider: true,
        }
    }
}

impl GatewayPolicy {
    pub fn new(gateway_first: bool, allow_direct_provider: bool) -> Self {
        Self {
            gateway_first,
            allow_direct_provider,
        }
    }

    /// Check a dispatch against the policy.
    ///
    /// Only the combination `gateway_first` and direct calls disallowed
    /// refuses anything; the transport was fixed when the adapter was
    /// built, so this is a pure check.
    pub fn check(&self, provider: &'static str, transport: Transport) -> Result<()> {
        if self.gateway_first && !self.allow_direct_provider && transport == Transport::Direct {
            return Err(KvasirError::PolicyViolation(format!(
                "{provider} is only reachable directly and this deployment requires the AI gateway"
            )));
        }
        Ok(())
    }
}
