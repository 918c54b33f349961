//! Wire response shapes.

use serde::Serialize;

/// Successful answer for `POST /query`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub answer: String,
    pub cached: bool,
    pub model: &'static str,
    /// Echoes the caller-supplied variant; omitted when the adapter's
    /// default was used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_variant: Option<String>,
}

/// Error body for every failed request.
///
/// `code` is the taxonomy kind; `model` is present once the request got
/// far enough to resolve one. Never carries secrets or raw upstream
/// bodies (adapters truncate before raising).
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<&'static str>,
}

/// Health/capability payload for `GET /status`.
///
/// Deliberately minimal: no gateway identifiers, URLs, or configuration
/// flags. The model list is the only capability signal exposed.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub ok: bool,
    pub version: &'static str,
    pub timestamp: String,
    pub models: Vec<&'static str>,
}
