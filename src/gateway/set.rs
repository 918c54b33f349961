//! The set of providers a deployment actually configured.

use std::collections::HashMap;
use std::sync::Arc;

use crate::providers::AnswerProvider;
use crate::types::Model;

/// Providers resolved at startup, keyed by logical model.
///
/// Which models are in the set is decided once from configuration
/// presence; the set never changes while the daemon runs. Validation
/// and `/status` both read [`available_models`](Self::available_models),
/// so a model is advertised if and only if a query for it can be
/// dispatched.
#[derive(Default)]
pub struct ProviderSet {
    providers: HashMap<Model, Arc<dyn AnswerProvider>>,
}

impl ProviderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the adapter backing `model`.
    pub fn with(mut self, model: Model, provider: Arc<dyn AnswerProvider>) -> Self {
        self.providers.insert(model, provider);
        self
    }

    /// Look up the adapter for a model, `None` when unconfigured.
    pub fn get(&self, model: Model) -> Option<&Arc<dyn AnswerProvider>> {
        self.providers.get(&model)
    }

    /// Configured models in advertised order, independent of
    /// registration order.
    pub fn available_models(&self) -> Vec<Model> {
        Model::ALL
            .into_iter()
            .filter(|model| self.providers.contains_key(model))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
