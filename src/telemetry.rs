//! Telemetry metric name constants.
//!
//! Centralised metric names for kvasir operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `kvasir_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `model` — logical model name (e.g. "cloudflare", "gemini")
//! - `provider` — provider name as reported by the adapter
//! - `status` — outcome: "ok" or "error"

/// Total queries dispatched through the gateway.
///
/// Labels: `model`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "kvasir_requests_total";

/// Query duration in seconds, cache hits included.
///
/// Labels: `model`.
pub const REQUEST_DURATION_SECONDS: &str = "kvasir_request_duration_seconds";

/// Total answer-cache hits.
///
/// Labels: `model`.
pub const CACHE_HITS_TOTAL: &str = "kvasir_cache_hits_total";

/// Total answer-cache misses.
///
/// Labels: `model`.
pub const CACHE_MISSES_TOTAL: &str = "kvasir_cache_misses_total";

/// Total upstream provider calls.
///
/// Labels: `provider`, `status` ("ok" | "error").
pub const PROVIDER_REQUESTS_TOTAL: &str = "kvasir_provider_requests_total";

/// Total OAuth token exchanges (cache misses only; hits don't count).
///
/// Labels: `status` ("ok" | "error").
pub const TOKEN_EXCHANGES_TOTAL: &str = "kvasir_token_exchanges_total";
