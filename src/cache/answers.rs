//! Answer cache shared by all providers.
//!
//! [`AnswerCache`] caches final answer strings keyed by the SHA-256
//! composite from [`key`](crate::cache::key), so identical prompts skip
//! the provider entirely. It sits in
//! [`AnswerGateway`](crate::gateway::AnswerGateway), above provider
//! routing: a hit bypasses policy checks, token exchange, and provider
//! metrics. Hit/miss metrics are emitted here.
//!
//! The backing [`KvStore`] is injected, so a single deployment choice
//! (in-memory vs Workers KV) covers both answers and OAuth tokens.
//! Entries carry a fixed TTL; there is no revalidation and no
//! invalidation beyond expiry, which fits answers that are acceptable
//! to serve stale for days.
//!
//! Blank answers are never recorded. A provider that produced an empty
//! or whitespace-only string should be retried on the next request, not
//! remembered for a week.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::store::KvStore;
use crate::{Result, telemetry};

/// How long a cached answer stays valid: 7 days.
pub const ANSWER_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 7);

/// Cache of final answers, keyed by the composite request hash.
pub struct AnswerCache {
    store: Arc<dyn KvStore>,
    ttl: Duration,
}

impl AnswerCache {
    /// Create a cache over `store` with the standard 7-day TTL.
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self::with_ttl(store, ANSWER_TTL)
    }

    /// Create a cache with a custom TTL (shorter TTLs are used in tests).
    pub fn with_ttl(store: Arc<dyn KvStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Look up a cached answer.
    ///
    /// Returns `None` on cache miss. Emits cache hit/miss metrics
    /// labelled with the model that would otherwise serve the request.
    pub async fn lookup(&self, key: &str, model: &'static str) -> Result<Option<String>> {
        match self.store.get(key).await? {
            Some(answer) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL, "model" => model).increment(1);
                debug!(model, key, "answer cache hit");
                Ok(Some(answer))
            }
            None => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "model" => model).increment(1);
                Ok(None)
            }
        }
    }

    /// Record an answer under `key`.
    ///
    /// Blank answers (empty or whitespace-only) are silently skipped so
    /// a transient empty response never shadows a real one.
    pub async fn record(&self, key: &str, answer: &str) -> Result<()> {
        if answer.trim().is_empty() {
            debug!(key, "skipping cache write for blank answer");
            return Ok(());
        }
        self.store.put(key, answer, self.ttl).await
    }
}
