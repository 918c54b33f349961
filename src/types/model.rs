//! Logical model names accepted on the query endpoint.

use std::fmt;

/// A logical model, each backed by one provider adapter.
///
/// The wire names are fixed: adding a provider is a code change, not a
/// configuration change. Which models are actually accepted at runtime
/// depends on which providers are configured (see
/// [`ProviderSet::available_models`](crate::gateway::ProviderSet::available_models)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Model {
    /// Cloudflare Workers AI (the default).
    Cloudflare,
    /// Google Vertex AI, advertised as `gemini`.
    Vertex,
    /// Google AI Studio, advertised as `ai-studio`.
    AiStudio,
    /// OpenAI chat completions.
    OpenAi,
}

impl Model {
    /// All models in advertised order.
    pub const ALL: [Model; 4] = [
        Model::Cloudflare,
        Model::Vertex,
        Model::AiStudio,
        Model::OpenAi,
    ];

    /// Wire name as it appears in requests, responses, and `/status`.
    pub fn name(self) -> &'static str {
        match self {
            Model::Cloudflare => "cloudflare",
            Model::Vertex => "gemini",
            Model::AiStudio => "ai-studio",
            Model::OpenAi => "openai",
        }
    }

    /// Parse a wire name. Unknown names return `None`; callers turn that
    /// into an `invalid_request` listing the available models.
    pub fn from_name(name: &str) -> Option<Model> {
        match name {
            "cloudflare" => Some(Model::Cloudflare),
            "gemini" => Some(Model::Vertex),
            "ai-studio" => Some(Model::AiStudio),
            "openai" => Some(Model::OpenAi),
            _ => None,
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for model in Model::ALL {
            assert_eq!(Model::from_name(model.name()), Some(model));
        }
    }

    #[test]
    fn unknown_name_is_none() {
        assert_eq!(Model::from_name("invalid"), None);
        assert_eq!(Model::from_name("vertex-ai"), None);
        assert_eq!(Model::from_name(""), None);
    }

    #[test]
    fn cloudflare_is_first_in_advertised_order() {
        assert_eq!(Model::ALL[0], Model::Cloudflare);
    }
}
