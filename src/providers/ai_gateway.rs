//! AI gateway coordinates for gateway-routed adapters.
//!
//! Deployments that proxy provider traffic through an AI gateway give
//! us a base URL plus, usually, an account and gateway id that form the
//! provider path. Custom domains sometimes bake the account and gateway
//! into the hostname, in which case only the provider segment is
//! appended.

/// Location of the AI gateway and how provider paths are formed.
#[derive(Debug, Clone)]
pub struct AiGateway {
    base_url: String,
    path: GatewayPath,
}

#[derive(Debug, Clone)]
enum GatewayPath {
    /// `{base}/{account_id}/{gateway_id}/{provider}`, the platform's
    /// canonical layout.
    Full {
        account_id: String,
        gateway_id: String,
    },
    /// `{base}/{provider}`, for custom domains that already encode the
    /// account and gateway.
    Preconstructed,
}

impl AiGateway {
    /// Gateway reached via the canonical account/gateway path.
    pub fn new(
        base_url: impl Into<String>,
        account_id: impl Into<String>,
        gateway_id: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            path: GatewayPath::Full {
                account_id: account_id.into(),
                gateway_id: gateway_id.into(),
            },
        }
    }

    /// Gateway whose URL already maps to one account and gateway.
    pub fn preconstructed(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            path: GatewayPath::Preconstructed,
        }
    }

    /// Endpoint base for one provider behind this gateway.
    pub fn provider_url(&self, provider: &str) -> String {
        match &self.path {
            GatewayPath::Full {
                account_id,
                gateway_id,
            } => format!(
                "{}/{}/{}/{}",
                self.base_url, account_id, gateway_id, provider
            ),
            GatewayPath::Preconstructed => format!("{}/{}", self.base_url, provider),
        }
    }
}
