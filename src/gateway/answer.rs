//! The query pipeline: cache lookup, policy check, provider dispatch,
//! cache write.

use std::time::Instant;

use tracing::{debug, info};

use super::policy::GatewayPolicy;
use super::set::ProviderSet;
use crate::cache::{AnswerCache, key};
use crate::types::{Model, QueryRequest};
use crate::{KvasirError, Result, telemetry};

/// Outcome of one query: the answer and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayAnswer {
    pub answer: String,
    pub cached: bool,
}

/// Answer cache in front of policy-checked provider routing.
///
/// The pipeline is strictly sequential within one request: cache
/// lookup, then on a miss exactly one provider call, then on success
/// one cache write. There is no single-flight de-duplication;
/// concurrent identical misses may each call the provider and write
/// the same key with the same content, which is accepted as the cost
/// of keeping the store non-transactional.
pub struct AnswerGateway {
    providers: ProviderSet,
    cache: AnswerCache,
    policy: GatewayPolicy,
}

impl AnswerGateway {
    pub fn new(providers: ProviderSet, cache: AnswerCache, policy: GatewayPolicy) -> Self {
        Self {
            providers,
            cache,
            policy,
        }
    }

    /// Models this gateway can currently serve, in advertised order.
    pub fn available_models(&self) -> Vec<Model> {
        self.providers.available_models()
    }

    /// Answer a validated query.
    pub async fn answer(&self, request: &QueryRequest) -> Result<GatewayAnswer> {
        let model = request.model.name();
        let start = Instant::now();
        let result = self.answer_inner(request).await;

        let status = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(telemetry::REQUESTS_TOTAL, "model" => model, "status" => status)
            .increment(1);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS, "model" => model)
            .record(start.elapsed().as_secs_f64());

        result
    }

    async fn answer_inner(&self, request: &QueryRequest) -> Result<GatewayAnswer> {
        let model = request.model;
        let variant = request.variant.as_deref();
        let cache_key = key::answer_key(model.name(), variant, &request.prompt);

        if let Some(answer) = self.cache.lookup(&cache_key, model.name()).await? {
            return Ok(GatewayAnswer {
                answer,
                cached: true,
            });
        }

        // Validation only admits configured models, so a missing
        // adapter here is a bug in the set construction, not bad input.
        let provider = self.providers.get(model).ok_or_else(|| {
            KvasirError::Internal(format!("no adapter registered for model {model}"))
        })?;

        self.policy.check(provider.name(), provider.transport())?;

        debug!(model = %model, provider = provider.name(), "dispatching to provider");
        let outcome = provider.answer(&request.prompt, variant).await;
        let status = if outcome.is_ok() { "ok" } else { "error" };
        metrics::counter!(
            telemetry::PROVIDER_REQUESTS_TOTAL,
            "provider" => provider.name(),
            "status" => status
        )
        .increment(1);

        let answer = outcome?;
        self.cache.record(&cache_key, &answer).await?;
        info!(model = %model, provider = provider.name(), "query answered");

        Ok(GatewayAnswer {
            answer,
            cached: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::cache::MemoryKvStore;
    use crate::providers::{AnswerProvider, Transport};

    struct CountingProvider {
        calls: AtomicUsize,
        reply: &'static str,
        transport: Transport,
    }

    impl CountingProvider {
        fn new(reply: &'static str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                reply,
                transport: Transport::Direct,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AnswerProvider for CountingProvider {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn transport(&self) -> Transport {
            self.transport
        }

        async fn answer(&self, _prompt: &str, _variant: Option<&str>) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.to_string())
        }
    }

    fn gateway_with(provider: Arc<CountingProvider>, policy: GatewayPolicy) -> AnswerGateway {
        AnswerGateway::new(
            ProviderSet::new().with(Model::Cloudflare, provider),
            AnswerCache::new(Arc::new(MemoryKvStore::default())),
            policy,
        )
    }

    fn request(prompt: &str) -> QueryRequest {
        QueryRequest {
            prompt: prompt.to_string(),
            model: Model::Cloudflare,
            variant: None,
        }
    }

    #[tokio::test]
    async fn second_identical_query_is_served_from_cache() {
        let provider = CountingProvider::new("four");
        let gateway = gateway_with(provider.clone(), GatewayPolicy::default());

        let first = gateway.answer(&request("2+2?")).await.unwrap();
        assert_eq!(first.answer, "four");
        assert!(!first.cached);

        let second = gateway.answer(&request("2+2?")).await.unwrap();
        assert_eq!(second.answer, "four");
        assert!(second.cached);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn different_prompts_each_reach_the_provider() {
        let provider = CountingProvider::new("answer");
        let gateway = gateway_with(provider.clone(), GatewayPolicy::default());

        gateway.answer(&request("one")).await.unwrap();
        gateway.answer(&request("two")).await.unwrap();
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn blank_answers_are_retried_on_the_next_query() {
        let provider = CountingProvider::new("   ");
        let gateway = gateway_with(provider.clone(), GatewayPolicy::default());

        let first = gateway.answer(&request("hi")).await.unwrap();
        assert!(!first.cached);

        let second = gateway.answer(&request("hi")).await.unwrap();
        assert!(!second.cached);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn variant_separates_cache_entries() {
        let provider = CountingProvider::new("answer");
        let gateway = gateway_with(provider.clone(), GatewayPolicy::default());

        let mut with_variant = request("hi");
        with_variant.variant = Some("@cf/meta/llama-2-7b-chat-fp16".to_string());

        gateway.answer(&request("hi")).await.unwrap();
        gateway.answer(&with_variant).await.unwrap();
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn restrictive_policy_refuses_direct_provider() {
        let provider = CountingProvider::new("never");
        let gateway = gateway_with(provider.clone(), GatewayPolicy::new(true, false));

        let err = gateway.answer(&request("hi")).await.unwrap_err();
        assert_eq!(err.kind(), "policy_violation");
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn unregistered_model_is_an_internal_error() {
        let gateway = AnswerGateway::new(
            ProviderSet::new(),
            AnswerCache::new(Arc::new(MemoryKvStore::default())),
            GatewayPolicy::default(),
        );

        let err = gateway.answer(&request("hi")).await.unwrap_err();
        assert_eq!(err.kind(), "internal_error");
    }
}
