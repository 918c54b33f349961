//! Kvasir — a caching HTTP answer gateway for LLM providers.
//!
//! Kvasir accepts a natural-language prompt over HTTP, routes it to one
//! of several configured providers (Cloudflare Workers AI, Google
//! Vertex AI, Google AI Studio, OpenAI), caches the answer in a
//! key-value store, and returns it as JSON. Identical prompts are
//! served from the cache without touching any provider.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use kvasir::auth::{CorsPolicy, RequestGuard};
//! use kvasir::cache::{AnswerCache, MemoryKvStore};
//! use kvasir::gateway::{AnswerGateway, GatewayPolicy, ProviderSet};
//! use kvasir::providers::CloudflareAi;
//! use kvasir::server::{AppState, router};
//! use kvasir::types::Model;
//!
//! #[tokio::main]
//! async fn main() -> kvasir::Result<()> {
//!     let store = Arc::new(MemoryKvStore::default());
//!     let providers = ProviderSet::new().with(
//!         Model::Cloudflare,
//!         Arc::new(CloudflareAi::direct("cf-token", "account-id")),
//!     );
//!     let gateway = AnswerGateway::new(
//!         providers,
//!         AnswerCache::new(store),
//!         GatewayPolicy::default(),
//!     );
//!     let state = AppState::new(
//!         Arc::new(gateway),
//!         RequestGuard::new(Vec::new(), None),
//!         CorsPolicy::new(Vec::new()),
//!         64 * 1024,
//!     );
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8787")
//!         .await
//!         .map_err(|e| kvasir::KvasirError::Configuration(e.to_string()))?;
//!     axum::serve(listener, router(state, None))
//!         .await
//!         .map_err(|e| kvasir::KvasirError::Internal(e.to_string()))?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cache;
pub mod error;
pub mod gateway;
pub mod providers;
pub mod server;
pub mod telemetry;
pub mod types;
pub mod version;

// Re-export main types at crate root
pub use error::{KvasirError, Result};
pub use gateway::{AnswerGateway, GatewayAnswer, GatewayPolicy, ProviderSet};
pub use types::{Model, QueryRequest, QueryResponse, RawQuery, StatusResponse};
pub use version::PKG_VERSION;
