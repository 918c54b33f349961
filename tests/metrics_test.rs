//! Tests for metrics integration.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter.

use std::sync::Arc;

use async_trait::async_trait;
use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};

use kvasir::cache::{AnswerCache, MemoryKvStore};
use kvasir::gateway::{AnswerGateway, GatewayPolicy, ProviderSet};
use kvasir::providers::{AnswerProvider, Transport};
use kvasir::telemetry;
use kvasir::types::{Model, QueryRequest};
use kvasir::{KvasirError, Result};

// ============================================================================
// Mock providers
// ============================================================================

struct EchoProvider;

#[async_trait]
impl AnswerProvider for EchoProvider {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn transport(&self) -> Transport {
        Transport::Direct
    }

    async fn answer(&self, prompt: &str, _variant: Option<&str>) -> Result<String> {
        Ok(format!("echo: {prompt}"))
    }
}

struct FailingProvider;

#[async_trait]
impl AnswerProvider for FailingProvider {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn transport(&self) -> Transport {
        Transport::Direct
    }

    async fn answer(&self, _prompt: &str, _variant: Option<&str>) -> Result<String> {
        Err(KvasirError::Provider {
            provider: "failing",
            status: 500,
            message: "boom".to_string(),
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

/// Sum all counter values matching a given metric name and label pair.
fn counter_total(snapshot: &SnapshotVec, name: &str, label: (&str, &str)) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| {
            key.kind() == MetricKind::Counter
                && key.key().name() == name
                && key
                    .key()
                    .labels()
                    .any(|l| l.key() == label.0 && l.value() == label.1)
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

fn has_histogram(snapshot: &SnapshotVec, name: &str) -> bool {
    snapshot
        .iter()
        .any(|(key, _, _, _)| key.kind() == MetricKind::Histogram && key.key().name() == name)
}

fn gateway(provider: Arc<dyn AnswerProvider>) -> AnswerGateway {
    AnswerGateway::new(
        ProviderSet::new().with(Model::Cloudflare, provider),
        AnswerCache::new(Arc::new(MemoryKvStore::default())),
        GatewayPolicy::default(),
    )
}

fn request(prompt: &str) -> QueryRequest {
    QueryRequest {
        prompt: prompt.to_string(),
        model: Model::Cloudflare,
        variant: None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn cold_and_warm_queries_record_expected_counters() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let gateway = gateway(Arc::new(EchoProvider));
                gateway.answer(&request("hi")).await.unwrap();
                gateway.answer(&request("hi")).await.unwrap();
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(
        counter_total(&snapshot, telemetry::REQUESTS_TOTAL, ("status", "ok")),
        2
    );
    assert_eq!(
        counter_total(&snapshot, telemetry::CACHE_MISSES_TOTAL, ("model", "cloudflare")),
        1
    );
    assert_eq!(
        counter_total(&snapshot, telemetry::CACHE_HITS_TOTAL, ("model", "cloudflare")),
        1
    );
    // Only the cold query reached the provider.
    assert_eq!(
        counter_total(&snapshot, telemetry::PROVIDER_REQUESTS_TOTAL, ("provider", "echo")),
        1
    );
    assert!(has_histogram(&snapshot, telemetry::REQUEST_DURATION_SECONDS));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn failed_provider_call_records_error_counters() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let gateway = gateway(Arc::new(FailingProvider));
                let _ = gateway.answer(&request("hi")).await;
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(
        counter_total(&snapshot, telemetry::REQUESTS_TOTAL, ("status", "error")),
        1
    );
    assert_eq!(
        counter_total(&snapshot, telemetry::PROVIDER_REQUESTS_TOTAL, ("status", "error")),
        1
    );
}

#[tokio::test]
async fn metrics_are_noop_without_recorder() {
    // Verify no panics when no recorder is installed.
    let gateway = gateway(Arc::new(EchoProvider));
    let answer = gateway.answer(&request("hi")).await.unwrap();
    assert_eq!(answer.answer, "echo: hi");
}
