//! Query request parsing and validation.
//!
//! Deserialization is deliberately loose ([`RawQuery`] keeps every field
//! optional and untyped) so that validation can produce the exact
//! user-facing messages instead of serde's. [`RawQuery::validate`] is the
//! single place request invariants are enforced.

use serde::Deserialize;

use crate::types::Model;
use crate::{KvasirError, Result};

/// Maximum accepted prompt length, in characters.
pub const MAX_PROMPT_CHARS: usize = 10_000;

/// Maximum accepted model-variant length, in characters.
pub const MAX_VARIANT_CHARS: usize = 200;

/// Query body as received on the wire, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuery {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub model_variant: Option<String>,
}

/// A validated query, ready for the gateway.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub prompt: String,
    pub model: Model,
    /// Caller-supplied variant; adapters fill in their default when absent.
    pub variant: Option<String>,
}

impl RawQuery {
    /// Validate against the currently available models.
    ///
    /// Checks, in order: prompt presence and length, model name against
    /// `available`, variant charset and length. The model check treats a
    /// known-but-unconfigured model the same as an unknown one, listing
    /// only the models a caller can actually use; an omitted model is
    /// checked as if the default had been named explicitly.
    pub fn validate(self, available: &[Model]) -> Result<QueryRequest> {
        let prompt = match self.prompt {
            Some(p) if !p.is_empty() => p,
            _ => {
                return Err(KvasirError::InvalidRequest(
                    r#"Missing "prompt" field"#.to_string(),
                ));
            }
        };
        if prompt.chars().count() > MAX_PROMPT_CHARS {
            return Err(KvasirError::InvalidRequest(format!(
                "Prompt exceeds {MAX_PROMPT_CHARS} characters"
            )));
        }

        // An omitted model means the default, which still has to be
        // configured on this deployment to pass.
        let name = self.model.as_deref().unwrap_or(Model::Cloudflare.name());
        let model = match Model::from_name(name) {
            Some(m) if available.contains(&m) => m,
            _ => {
                let names: Vec<&str> = available.iter().map(|m| m.name()).collect();
                return Err(KvasirError::InvalidRequest(format!(
                    "Invalid model. Choose from: {}",
                    names.join(", ")
                )));
            }
        };

        if let Some(ref variant) = self.model_variant {
            if !valid_variant(variant) {
                return Err(KvasirError::InvalidRequest(
                    r#"Invalid "modelVariant" field"#.to_string(),
                ));
            }
        }

        Ok(QueryRequest {
            prompt,
            model,
            variant: self.model_variant,
        })
    }
}

/// Variant strings are provider model IDs: lowercase alphanumerics plus
/// `- / @ _ .`, bounded length.
fn valid_variant(s: &str) -> bool {
    !s.is_empty()
        && s.chars().count() <= MAX_VARIANT_CHARS
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "-/@_.".contains(c))
}
