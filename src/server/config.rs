//! Configuration loading for kvasird.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.kvasir/config.toml` (user)
//! 3. `/etc/kvasir/config.toml` (system)
//!
//! Secrets are loaded separately with mandatory permission checks:
//! 1. `~/.kvasir/secrets.toml` (user, must be 0600)
//! 2. `/etc/kvasir/secrets.toml` (system, must be 0600)
//!
//! Provider sections gate availability: a provider whose section or
//! secret is absent is simply not offered, it is never a startup error.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{KvasirError, Result};

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub ai_gateway: Option<AiGatewayConfig>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// Server network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:8787).
    #[serde(default = "default_address")]
    pub address: String,
    /// Maximum accepted request body size in bytes (default: 64 KiB).
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1:8787".to_string()
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

/// Inbound HTTP policy: CORS allowlist and static assets.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpConfig {
    /// Origins permitted on `/query`. Empty means every origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// Directory served for paths the API does not claim.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

/// Answer/token cache backend selection.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Capacity of the in-memory backend (default: 10,000 entries).
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
    /// Present: use Cloudflare Workers KV instead of process memory.
    #[serde(default)]
    pub workers_kv: Option<WorkersKvConfig>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            workers_kv: None,
        }
    }
}

fn default_max_entries() -> u64 {
    10_000
}

/// Cloudflare Workers KV coordinates.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkersKvConfig {
    pub account_id: String,
    pub namespace_id: String,
}

/// AI gateway coordinates for gateway-routed providers.
///
/// With `account_id` and `gateway_id` the provider path is built as
/// `{base_url}/{account_id}/{gateway_id}/{provider}`; without them the
/// base URL is assumed to already encode both (custom domains).
#[derive(Debug, Clone, Deserialize)]
pub struct AiGatewayConfig {
    pub base_url: String,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub gateway_id: Option<String>,
}

/// Provider configurations. Each section is optional; absence narrows
/// the advertised model list rather than erroring.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub cloudflare: Option<CloudflareConfig>,
    #[serde(default)]
    pub vertex: Option<VertexConfig>,
    #[serde(default)]
    pub aistudio: Option<ApiProviderConfig>,
    #[serde(default)]
    pub openai: Option<ApiProviderConfig>,
}

/// Cloudflare Workers AI configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudflareConfig {
    /// Account for direct platform calls; unnecessary when an AI
    /// gateway is configured.
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub default_variant: Option<String>,
}

/// Vertex AI configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct VertexConfig {
    pub project_id: String,
    /// Region (default: us-central1).
    #[serde(default = "default_vertex_location")]
    pub location: String,
    #[serde(default)]
    pub default_variant: Option<String>,
}

fn default_vertex_location() -> String {
    "us-central1".to_string()
}

/// Key-only provider configuration (AI Studio, OpenAI).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiProviderConfig {
    #[serde(default)]
    pub default_variant: Option<String>,
}

/// Provider-transport policy flags.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Prefer the AI gateway wherever one is configured.
    #[serde(default)]
    pub gateway_first: bool,
    /// Permit adapters that only have a direct transport (default: true).
    #[serde(default = "default_allow_direct")]
    pub allow_direct_provider: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            gateway_first: false,
            allow_direct_provider: default_allow_direct(),
        }
    }
}

fn default_allow_direct() -> bool {
    true
}

/// Secrets configuration (API keys and tokens).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    cloudflare: Option<ApiTokenSecret>,
    #[serde(default)]
    vertex: Option<ServiceAccountSecret>,
    #[serde(default)]
    aistudio: Option<ApiKeySecret>,
    #[serde(default)]
    openai: Option<ApiKeySecret>,
    #[serde(default)]
    workers_kv: Option<ApiTokenSecret>,
    /// Key inbound callers must present on `/query` (optional).
    #[serde(default)]
    inbound: Option<ApiKeySecret>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiKeySecret {
    api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiTokenSecret {
    api_token: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ServiceAccountSecret {
    service_account_json: String,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided)
    /// 2. `~/.kvasir/config.toml`
    /// 3. `/etc/kvasir/config.toml`
    ///
    /// Returns defaults if no file exists anywhere; an in-memory cache
    /// and zero providers still serve `/status`.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let Some(path) = Self::resolve_config_path(explicit_path)? else {
            return Ok(Config::default());
        };
        let content = fs::read_to_string(&path).map_err(|e| {
            KvasirError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            KvasirError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(KvasirError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".kvasir").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        let system_config = PathBuf::from("/etc/kvasir/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }
}

impl Secrets {
    /// Load secrets from the standard locations with permission checks.
    ///
    /// Resolution order:
    /// 1. `~/.kvasir/secrets.toml` (if exists, must be 0600)
    /// 2. `/etc/kvasir/secrets.toml` (if exists, must be 0600)
    ///
    /// Returns empty secrets if no file exists (every secret has an
    /// environment-variable fallback).
    pub fn load() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(".kvasir").join("secrets.toml");
            if user_secrets.exists() {
                Self::check_permissions(&user_secrets)?;
                return Self::load_from_file(&user_secrets);
            }
        }

        let system_secrets = PathBuf::from("/etc/kvasir/secrets.toml");
        if system_secrets.exists() {
            Self::check_permissions(&system_secrets)?;
            return Self::load_from_file(&system_secrets);
        }

        Ok(Secrets::default())
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            KvasirError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            KvasirError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            KvasirError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        // Reject if group or other bits are set
        if mode & 0o077 != 0 {
            return Err(KvasirError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(_path: &Path) -> Result<()> {
        // Permission check not available on non-Unix platforms
        Ok(())
    }

    /// Cloudflare API token, falling back to `CLOUDFLARE_API_TOKEN`.
    pub fn cloudflare_api_token(&self) -> Option<String> {
        self.cloudflare
            .as_ref()
            .map(|s| s.api_token.clone())
            .or_else(|| std::env::var("CLOUDFLARE_API_TOKEN").ok())
    }

    /// Service account JSON, falling back to `VERTEX_SERVICE_ACCOUNT_JSON`.
    pub fn vertex_service_account_json(&self) -> Option<String> {
        self.vertex
            .as_ref()
            .map(|s| s.service_account_json.clone())
            .or_else(|| std::env::var("VERTEX_SERVICE_ACCOUNT_JSON").ok())
    }

    /// AI Studio API key, falling back to `AISTUDIO_API_KEY`.
    pub fn aistudio_api_key(&self) -> Option<String> {
        self.aistudio
            .as_ref()
            .map(|s| s.api_key.clone())
            .or_else(|| std::env::var("AISTUDIO_API_KEY").ok())
    }

    /// OpenAI API key, falling back to `OPENAI_API_KEY`.
    pub fn openai_api_key(&self) -> Option<String> {
        self.openai
            .as_ref()
            .map(|s| s.api_key.clone())
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
    }

    /// Workers KV API token, falling back to `CLOUDFLARE_KV_API_TOKEN`.
    pub fn workers_kv_api_token(&self) -> Option<String> {
        self.workers_kv
            .as_ref()
            .map(|s| s.api_token.clone())
            .or_else(|| std::env::var("CLOUDFLARE_KV_API_TOKEN").ok())
    }

    /// Inbound API key callers must present, falling back to `KVASIR_API_KEY`.
    pub fn inbound_api_key(&self) -> Option<String> {
        self.inbound
            .as_ref()
            .map(|s| s.api_key.clone())
            .or_else(|| std::env::var("KVASIR_API_KEY").ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.server.address, "127.0.0.1:8787");
        assert_eq!(config.server.max_body_bytes, 64 * 1024);
        assert_eq!(config.cache.max_entries, 10_000);
        assert!(config.cache.workers_kv.is_none());
        assert!(config.ai_gateway.is_none());
        assert!(!config.policy.gateway_first);
        assert!(config.policy.allow_direct_provider);
    }

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
            [server]
            address = "0.0.0.0:8787"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.address, "0.0.0.0:8787");
        // Defaults preserved
        assert_eq!(config.server.max_body_bytes, 64 * 1024);
        assert!(config.http.allowed_origins.is_empty());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [server]
            address = "127.0.0.1:8787"
            max_body_bytes = 32768

            [http]
            allowed_origins = ["https://lornu.ai"]
            static_dir = "/srv/kvasir/public"

            [cache]
            max_entries = 500

            [cache.workers_kv]
            account_id = "acct"
            namespace_id = "ns"

            [ai_gateway]
            base_url = "https://gateway.ai.cloudflare.com/v1"
            account_id = "acct"
            gateway_id = "gw"

            [providers.cloudflare]
            account_id = "acct"
            default_variant = "@cf/meta/llama-2-7b-chat-fp16"

            [providers.vertex]
            project_id = "proj"
            location = "europe-west1"

            [providers.openai]

            [policy]
            gateway_first = true
            allow_direct_provider = false
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.http.allowed_origins, vec!["https://lornu.ai"]);
        assert_eq!(
            config.http.static_dir,
            Some(PathBuf::from("/srv/kvasir/public"))
        );
        assert_eq!(config.cache.max_entries, 500);
        assert_eq!(config.cache.workers_kv.as_ref().unwrap().namespace_id, "ns");
        let gateway = config.ai_gateway.as_ref().unwrap();
        assert_eq!(gateway.gateway_id.as_deref(), Some("gw"));
        let vertex = config.providers.vertex.as_ref().unwrap();
        assert_eq!(vertex.project_id, "proj");
        assert_eq!(vertex.location, "europe-west1");
        assert!(config.providers.openai.is_some());
        assert!(config.providers.aistudio.is_none());
        assert!(config.policy.gateway_first);
        assert!(!config.policy.allow_direct_provider);
    }

    #[test]
    fn vertex_location_defaults() {
        let toml = r#"
            [providers.vertex]
            project_id = "proj"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.providers.vertex.as_ref().unwrap().location,
            "us-central1"
        );
    }

    #[test]
    fn parse_secrets() {
        let toml = r#"
            [cloudflare]
            api_token = "cf-token"

            [vertex]
            service_account_json = "{}"

            [inbound]
            api_key = "inbound-key"
        "#;
        let secrets: Secrets = toml::from_str(toml).unwrap();
        assert_eq!(secrets.cloudflare_api_token(), Some("cf-token".to_string()));
        assert_eq!(
            secrets.vertex_service_account_json(),
            Some("{}".to_string())
        );
        assert_eq!(secrets.inbound_api_key(), Some("inbound-key".to_string()));
    }

    #[test]
    fn absent_secret_without_env_is_none() {
        let secrets = Secrets::default();
        // The workers_kv token has no commonly-set env var in test
        // environments, unlike OPENAI_API_KEY which may leak in.
        assert!(
            secrets.workers_kv.is_none(),
            "file-backed secret should be absent"
        );
    }

    #[test]
    fn config_not_found_returns_error() {
        let result = Config::load(Some(Path::new("/nonexistent/config.toml")));
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Config file not found"));
    }
}
