//! kvasird — Kvasir daemon.
//!
//! Loads configuration and secrets, resolves which providers are
//! available, and serves the answer gateway over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kvasir::auth::{CorsPolicy, RequestGuard, TokenManager};
use kvasir::cache::{AnswerCache, KvStore, MemoryKvStore, WorkersKvStore};
use kvasir::gateway::{AnswerGateway, GatewayPolicy, ProviderSet};
use kvasir::providers::{AiGateway, AiStudio, CloudflareAi, OpenAi, VertexAi};
use kvasir::server::config::{Config, Secrets};
use kvasir::server::{AppState, router};
use kvasir::types::Model;

/// Kvasir daemon — caching answer gateway for LLM providers.
#[derive(Parser)]
#[command(name = "kvasird")]
#[command(version = kvasir::PKG_VERSION)]
#[command(about = "Kvasir answer gateway daemon")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    // Load configuration
    let config = Config::load(args.config.as_deref())?;
    let secrets = Secrets::load()?;

    let store = build_store(&config, &secrets);
    let gateway = build_gateway(&config, &secrets, store)?;

    let models: Vec<&str> = gateway
        .available_models()
        .into_iter()
        .map(Model::name)
        .collect();
    if models.is_empty() {
        warn!("no providers configured; /query will reject every request");
    }

    let addr: SocketAddr = config
        .server
        .address
        .parse()
        .map_err(|e| kvasir::KvasirError::Configuration(format!("Invalid address: {e}")))?;

    info!(
        version = kvasir::version::version_string(),
        %addr,
        models = models.join(", "),
        "kvasird starting"
    );

    let state = AppState::new(
        Arc::new(gateway),
        RequestGuard::new(
            config.http.allowed_origins.clone(),
            secrets.inbound_api_key(),
        ),
        CorsPolicy::new(config.http.allowed_origins.clone()),
        config.server.max_body_bytes,
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        router(state, config.http.static_dir.as_deref()),
    )
    .await?;

    Ok(())
}

/// Pick the cache backend: Workers KV when coordinates and a token are
/// configured, process memory otherwise.
fn build_store(config: &Config, secrets: &Secrets) -> Arc<dyn KvStore> {
    if let Some(ref kv) = config.cache.workers_kv {
        if let Some(token) = secrets.workers_kv_api_token() {
            info!(namespace = kv.namespace_id, "using Workers KV cache backend");
            return Arc::new(WorkersKvStore::new(
                kv.account_id.clone(),
                kv.namespace_id.clone(),
                token,
            ));
        }
        warn!("workers_kv configured without an API token; using in-memory cache");
    }
    Arc::new(MemoryKvStore::new(config.cache.max_entries))
}

/// Build an [`AnswerGateway`] from configuration.
///
/// Providers register only when their section is present AND the
/// matching secret is available; each adapter's transport is fixed
/// here from whether AI gateway coordinates exist.
fn build_gateway(
    config: &Config,
    secrets: &Secrets,
    store: Arc<dyn KvStore>,
) -> Result<AnswerGateway, kvasir::KvasirError> {
    let ai_gateway = config.ai_gateway.as_ref().map(|gw| {
        match (gw.account_id.as_ref(), gw.gateway_id.as_ref()) {
            (Some(account), Some(gateway)) => {
                AiGateway::new(gw.base_url.as_str(), account.as_str(), gateway.as_str())
            }
            _ => AiGateway::preconstructed(gw.base_url.as_str()),
        }
    });

    let mut providers = ProviderSet::new();

    if let Some(ref cf) = config.providers.cloudflare {
        if let Some(token) = secrets.cloudflare_api_token() {
            let adapter = match (&ai_gateway, &cf.account_id) {
                (Some(gateway), _) => {
                    Some(CloudflareAi::via_gateway(token, gateway.provider_url("workers-ai")))
                }
                (None, Some(account)) => Some(CloudflareAi::direct(token, account.as_str())),
                (None, None) => {
                    warn!("cloudflare configured without an AI gateway or account_id; skipping");
                    None
                }
            };
            if let Some(mut adapter) = adapter {
                if let Some(ref variant) = cf.default_variant {
                    adapter = adapter.default_variant(variant.as_str());
                }
                providers = providers.with(Model::Cloudflare, Arc::new(adapter));
            }
        }
    }

    if let Some(ref vertex) = config.providers.vertex {
        if let Some(json) = secrets.vertex_service_account_json() {
            let tokens = Arc::new(TokenManager::from_service_account_json(
                &json,
                store.clone(),
            )?);
            let mut adapter =
                VertexAi::new(tokens, vertex.project_id.as_str(), vertex.location.as_str());
            if let Some(ref variant) = vertex.default_variant {
                adapter = adapter.default_variant(variant.as_str());
            }
            providers = providers.with(Model::Vertex, Arc::new(adapter));
        }
    }

    if let Some(ref aistudio) = config.providers.aistudio {
        if let Some(key) = secrets.aistudio_api_key() {
            let mut adapter = AiStudio::new(key);
            if let Some(ref variant) = aistudio.default_variant {
                adapter = adapter.default_variant(variant.as_str());
            }
            providers = providers.with(Model::AiStudio, Arc::new(adapter));
        }
    }

    if let Some(ref openai) = config.providers.openai {
        if let Some(key) = secrets.openai_api_key() {
            let mut adapter = match &ai_gateway {
                Some(gateway) => OpenAi::via_gateway(key, gateway.provider_url("openai")),
                None => OpenAi::direct(key),
            };
            if let Some(ref variant) = openai.default_variant {
                adapter = adapter.default_variant(variant.as_str());
            }
            providers = providers.with(Model::OpenAi, Arc::new(adapter));
        }
    }

    let policy = GatewayPolicy::new(
        config.policy.gateway_first,
        config.policy.allow_direct_provider,
    );

    Ok(AnswerGateway::new(
        providers,
        AnswerCache::new(store),
        policy,
    ))
}
