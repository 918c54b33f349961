//! Kvasir error types.
//!
//! Every failure maps to a closed set of error kinds and a fixed HTTP
//! status. The request handler is the only place that serializes errors
//! for the wire; everything below it just raises tagged variants.

/// Kvasir error types
#[derive(Debug, thiserror::Error)]
pub enum KvasirError {
    // Request validation errors
    #[error("{0}")]
    InvalidRequest(String),

    // Auth/policy errors
    #[error("{0}")]
    AuthError(String),

    /// Request origin is not in the configured allowlist.
    ///
    /// Classified as `auth_error` but rejected with `403` rather than
    /// `401` since presenting credentials would not help.
    #[error("origin not allowed")]
    OriginDenied,

    /// A request needs configuration this deployment does not have.
    ///
    /// Model gating happens during validation, so nothing raises this
    /// today; the variant stays to keep the wire taxonomy
    /// (`config_missing`) complete for clients that match on codes.
    #[error("{0}")]
    ConfigMissing(String),

    #[error("{0}")]
    PolicyViolation(String),

    // Provider/network errors
    #[error("{provider} error ({status}): {message}")]
    Provider {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// Provider returned a success status but no recognizable answer text.
    #[error("no answer in {0} response")]
    EmptyAnswer(&'static str),

    /// Transport-level failure before any upstream status was received.
    #[error("HTTP error: {0}")]
    Http(String),

    // Cache store errors
    #[error("cache error: {0}")]
    Cache(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Startup configuration errors (config/secrets files)
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl KvasirError {
    /// Error kind for the wire taxonomy (`code` field in error bodies).
    pub fn kind(&self) -> &'static str {
        match self {
            KvasirError::InvalidRequest(_) => "invalid_request",
            KvasirError::AuthError(_) | KvasirError::OriginDenied => "auth_error",
            KvasirError::ConfigMissing(_) => "config_missing",
            KvasirError::PolicyViolation(_) => "policy_violation",
            KvasirError::Provider { .. } | KvasirError::EmptyAnswer(_) => "provider_error",
            KvasirError::Http(_)
            | KvasirError::Cache(_)
            | KvasirError::Json(_)
            | KvasirError::Configuration(_)
            | KvasirError::Internal(_) => "internal_error",
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> u16 {
        match self {
            KvasirError::InvalidRequest(_) => 400,
            KvasirError::AuthError(_) => 401,
            KvasirError::OriginDenied => 403,
            KvasirError::ConfigMissing(_) => 400,
            KvasirError::PolicyViolation(_) => 501,
            KvasirError::Provider { .. } | KvasirError::EmptyAnswer(_) => 502,
            KvasirError::Http(_)
            | KvasirError::Cache(_)
            | KvasirError::Json(_)
            | KvasirError::Configuration(_)
            | KvasirError::Internal(_) => 500,
        }
    }
}

/// Result type alias for Kvasir operations
pub type Result<T> = std::result::Result<T, KvasirError>;
