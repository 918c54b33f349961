//! Key-value store backends.
//!
//! [`KvStore`] is the crate's contract with the external cache: string
//! keys, string values, per-entry TTL, eventual consistency, no
//! transactions. The gateway never sees which backend is wired in.
//!
//! Two implementations:
//! - [`MemoryKvStore`] — moka in-memory cache, the default for
//!   single-node deployments and tests.
//! - [`WorkersKvStore`] — Cloudflare Workers KV over its REST API, for
//!   deployments that share a cache across instances.

use std::time::Duration;

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use reqwest::Client;

use crate::{KvasirError, Result};

/// External key-value store with per-entry TTL.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch a value. `None` means absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value that expires after `ttl`.
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;
}

// ============================================================================
// In-memory backend
// ============================================================================

#[derive(Clone)]
struct TimedValue {
    value: String,
    ttl: Duration,
}

/// Expire each entry after its own TTL rather than a cache-wide one.
struct PerEntryExpiry;

impl Expiry<String, TimedValue> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &TimedValue,
        _created_at: std::time::Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-memory store backed by moka.
pub struct MemoryKvStore {
    cache: Cache<String, TimedValue>,
}

impl MemoryKvStore {
    /// Default capacity when none is configured.
    pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;

    /// Create a store bounded to `max_entries` values.
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryExpiry)
            .build();
        Self { cache }
    }
}

impl Default for MemoryKvStore {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ENTRIES)
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.cache.get(key).await.map(|entry| entry.value))
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.cache
            .insert(
                key.to_string(),
                TimedValue {
                    value: value.to_string(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }
}

// ============================================================================
// Workers KV backend
// ============================================================================

/// Default base URL for the Cloudflare platform API.
const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com";

/// Cloudflare Workers KV over its REST API.
///
/// GET returns the raw value body; a 404 is an ordinary miss. PUT passes
/// the TTL as the `expiration_ttl` query parameter.
pub struct WorkersKvStore {
    http: Client,
    base_url: String,
    account_id: String,
    namespace_id: String,
    api_token: String,
}

impl WorkersKvStore {
    /// Create a client against the production platform API.
    pub fn new(
        account_id: impl Into<String>,
        namespace_id: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self::with_base_url(account_id, namespace_id, api_token, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(
        account_id: impl Into<String>,
        namespace_id: impl Into<String>,
        api_token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            base_url: base_url.into(),
            account_id: account_id.into(),
            namespace_id: namespace_id.into(),
            api_token: api_token.into(),
        }
    }

    fn value_url(&self, key: &str) -> String {
        format!(
            "{}/client/v4/accounts/{}/storage/kv/namespaces/{}/values/{}",
            self.base_url, self.account_id, self.namespace_id, key
        )
    }
}

#[async_trait]
impl KvStore for WorkersKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let response = self
            .http
            .get(self.value_url(key))
            .header("Authorization", format!("Bearer {}", self.api_token))
            .send()
            .await
            .map_err(|e| KvasirError::Cache(format!("KV GET failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            let value = response
                .text()
                .await
                .map_err(|e| KvasirError::Cache(format!("KV GET body read failed: {e}")))?;
            Ok(Some(value))
        } else if status.as_u16() == 404 {
            Ok(None)
        } else {
            Err(KvasirError::Cache(format!(
                "KV GET returned status {status}"
            )))
        }
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let url = format!(
            "{}?expiration_ttl={}",
            self.value_url(key),
            ttl.as_secs()
        );

        let response = self
            .http
            .put(url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .header("Content-Type", "text/plain")
            .body(value.to_string())
            .send()
            .await
            .map_err(|e| KvasirError::Cache(format!("KV PUT failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(KvasirError::Cache(format!(
                "KV PUT returned status {status}"
            )));
        }

        Ok(())
    }
}
