//! Origin allowlist and API key checks for the query endpoint.
//!
//! Both checks are config-gated and both run before the body is read,
//! so a rejected caller costs nothing downstream. Browser callers are
//! covered by the origin allowlist; non-browser callers (no `Origin`
//! header) pass it and fall through to the API key check.

use axum::http::HeaderMap;
use axum::http::header::{HOST, ORIGIN, REFERER};

use crate::{KvasirError, Result};

/// Header carrying the caller's API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Pre-body checks applied to `/query` requests.
///
/// With an empty allowlist and no API key configured, every request
/// passes. See [`check`](Self::check) for the exact rules.
pub struct RequestGuard {
    allowed_origins: Vec<String>,
    api_key: Option<String>,
}

impl RequestGuard {
    pub fn new(allowed_origins: Vec<String>, api_key: Option<String>) -> Self {
        Self {
            allowed_origins,
            api_key,
        }
    }

    /// Run both checks: origin allowlist first, then API key.
    ///
    /// Origin allowlist: with a non-empty allowlist configured, a
    /// request carrying an `Origin` header not in the list is denied.
    /// An absent `Origin` header is treated as same-origin and passes.
    ///
    /// API key: with a key configured, the caller must present the
    /// matching value in `x-api-key`, unless the request demonstrably
    /// comes from our own origin (the `Origin` or `Referer` host equals
    /// the request's `Host` header).
    pub fn check(&self, headers: &HeaderMap) -> Result<()> {
        self.check_origin(headers)?;
        self.check_api_key(headers)
    }

    fn check_origin(&self, headers: &HeaderMap) -> Result<()> {
        if self.allowed_origins.is_empty() {
            return Ok(());
        }
        let Some(origin) = header_str(headers, ORIGIN.as_str()) else {
            return Ok(());
        };
        if self.allowed_origins.iter().any(|allowed| allowed == origin) {
            Ok(())
        } else {
            Err(KvasirError::OriginDenied)
        }
    }

    fn check_api_key(&self, headers: &HeaderMap) -> Result<()> {
        let Some(expected) = &self.api_key else {
            return Ok(());
        };
        if let Some(presented) = header_str(headers, API_KEY_HEADER) {
            if presented == expected {
                return Ok(());
            }
        }
        if is_same_origin(headers) {
            return Ok(());
        }
        Err(KvasirError::AuthError(
            "invalid or missing API key".to_string(),
        ))
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Whether the request's `Origin` or `Referer` host matches its `Host`.
///
/// Requires positive evidence: a request with neither header is not
/// same-origin. Hosts are compared verbatim, port included.
fn is_same_origin(headers: &HeaderMap) -> bool {
    let Some(host) = header_str(headers, HOST.as_str()) else {
        return false;
    };
    for name in [ORIGIN.as_str(), REFERER.as_str()] {
        if let Some(value) = header_str(headers, name) {
            if url_host(value) == Some(host) {
                return true;
            }
        }
    }
    false
}

/// Extract the host (with port, if any) from an absolute URL.
fn url_host(url: &str) -> Option<&str> {
    let rest = url.split_once("://")?.1;
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    if end == 0 { None } else { Some(&rest[..end]) }
}

/// Matching policy for the `Access-Control-Allow-Origin` header.
///
/// Without an allowlist every origin is reflected as `*`. With one,
/// allowed origins are echoed back and everything else gets no
/// allow-origin header at all.
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
}

impl CorsPolicy {
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins }
    }

    /// Whether responses should carry `Vary: Origin`.
    ///
    /// True exactly when an allowlist is configured, since only then
    /// does the allow-origin header depend on the request.
    pub fn varies_by_origin(&self) -> bool {
        !self.allowed_origins.is_empty()
    }

    /// Value for `Access-Control-Allow-Origin`, or `None` to omit it.
    pub fn allow_origin(&self, origin: Option<&str>) -> Option<String> {
        if self.allowed_origins.is_empty() {
            return Some("*".to_string());
        }
        let origin = origin?;
        self.allowed_origins
            .iter()
            .find(|allowed| *allowed == origin)
            .cloned()
    }
}
