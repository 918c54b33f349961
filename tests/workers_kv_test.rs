//! Tests for the Cloudflare Workers KV cache backend against wiremock.

use std::time::Duration;

use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kvasir::KvasirError;
use kvasir::cache::{KvStore, WorkersKvStore};

fn store(uri: &str) -> WorkersKvStore {
    WorkersKvStore::with_base_url("acct", "ns", "kv-token", uri)
}

const VALUE_PATH: &str = "/client/v4/accounts/acct/storage/kv/namespaces/ns/values/some-key";

#[tokio::test]
async fn get_returns_the_raw_value_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(VALUE_PATH))
        .and(header("authorization", "Bearer kv-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("the cached answer"))
        .expect(1)
        .mount(&server)
        .await;

    let value = store(&server.uri()).get("some-key").await.unwrap();
    assert_eq!(value.as_deref(), Some("the cached answer"));
}

#[tokio::test]
async fn get_treats_404_as_a_miss() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(VALUE_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let value = store(&server.uri()).get("some-key").await.unwrap();
    assert_eq!(value, None);
}

#[tokio::test]
async fn get_propagates_other_error_statuses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(VALUE_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = store(&server.uri()).get("some-key").await.unwrap_err();
    assert!(matches!(err, KvasirError::Cache(_)));
    assert_eq!(err.kind(), "internal_error");
}

#[tokio::test]
async fn put_sends_value_with_expiration_ttl() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(VALUE_PATH))
        .and(query_param("expiration_ttl", "604800"))
        .and(header("authorization", "Bearer kv-token"))
        .and(body_string("an answer"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    store(&server.uri())
        .put("some-key", "an answer", Duration::from_secs(604_800))
        .await
        .unwrap();
}

#[tokio::test]
async fn put_propagates_error_statuses() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(VALUE_PATH))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = store(&server.uri())
        .put("some-key", "v", Duration::from_secs(60))
        .await
        .unwrap_err();
    assert!(matches!(err, KvasirError::Cache(_)));
}
