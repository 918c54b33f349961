//! The HTTP surface: routing, CORS, and error serialization.
//!
//! This is the only layer that turns [`KvasirError`] into wire bytes;
//! everything below it just raises tagged variants. Dispatch is fixed:
//! `OPTIONS` anywhere is a CORS preflight, `GET /status` is public,
//! `POST /query` runs the guarded pipeline, any other method on
//! `/query` is a plain 404, and unclaimed paths (including non-GET
//! `/status`) fall through to the static-asset directory when one is
//! configured.

use std::path::Path;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Request, State};
use axum::http::header::{ORIGIN, VARY};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use chrono::Utc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::auth::guard::API_KEY_HEADER;
use crate::auth::{CorsPolicy, RequestGuard};
use crate::gateway::AnswerGateway;
use crate::types::{ErrorBody, QueryResponse, RawQuery, StatusResponse};
use crate::{KvasirError, version};

/// How long browsers may cache a preflight result.
const PREFLIGHT_MAX_AGE_SECS: u32 = 86_400;

/// Shared per-request context.
#[derive(Clone)]
pub struct AppState {
    gateway: Arc<AnswerGateway>,
    guard: Arc<RequestGuard>,
    cors: Arc<CorsPolicy>,
    max_body_bytes: usize,
}

impl AppState {
    pub fn new(
        gateway: Arc<AnswerGateway>,
        guard: RequestGuard,
        cors: CorsPolicy,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            gateway,
            guard: Arc::new(guard),
            cors: Arc::new(cors),
            max_body_bytes,
        }
    }
}

/// Build the service router.
///
/// `static_dir` is the passthrough target for paths the API does not
/// claim; without one those paths get a plain 404.
pub fn router(state: AppState, static_dir: Option<&Path>) -> Router {
    let query_route = post(query).fallback(query_wrong_method);

    // Non-GET on `/status` is treated like any unclaimed path: static
    // passthrough when configured, plain 404 otherwise.
    let routed = match static_dir {
        Some(dir) => Router::new()
            .route(
                "/status",
                get(status).fallback_service(ServeDir::new(dir)),
            )
            .route("/query", query_route)
            .fallback_service(ServeDir::new(dir)),
        None => Router::new()
            .route("/status", get(status).fallback(not_found))
            .route("/query", query_route)
            .fallback(not_found),
    };

    // The body limit sits one byte above the configured maximum so the
    // handler's own check produces the JSON error body at the boundary.
    routed
        .layer(DefaultBodyLimit::max(state.max_body_bytes.saturating_add(1)))
        .layer(middleware::from_fn_with_state(state.clone(), cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS middleware: answers preflights and stamps every other response.
async fn cors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let origin = request
        .headers()
        .get(ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    if request.method() == Method::OPTIONS {
        return preflight(&state.cors, origin.as_deref());
    }

    let mut response = next.run(request).await;
    stamp_cors(response.headers_mut(), &state.cors, origin.as_deref());
    response
}

fn preflight(policy: &CorsPolicy, origin: Option<&str>) -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    let headers = response.headers_mut();
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_str(&format!("Content-Type, {API_KEY_HEADER}"))
            .unwrap_or(HeaderValue::from_static("Content-Type")),
    );
    headers.insert(
        "access-control-max-age",
        HeaderValue::from(PREFLIGHT_MAX_AGE_SECS),
    );
    stamp_cors(headers, policy, origin);
    response
}

fn stamp_cors(headers: &mut HeaderMap, policy: &CorsPolicy, origin: Option<&str>) {
    if let Some(allow) = policy.allow_origin(origin) {
        if let Ok(value) = HeaderValue::from_str(&allow) {
            headers.insert("access-control-allow-origin", value);
        }
    }
    if policy.varies_by_origin() {
        headers.insert(VARY, HeaderValue::from_static("Origin"));
    }
}

/// `GET /status` — public health and capability payload.
///
/// The model list is the only capability signal; gateway coordinates
/// and configuration flags stay private.
async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let models = state
        .gateway
        .available_models()
        .into_iter()
        .map(|model| model.name())
        .collect();
    Json(StatusResponse {
        ok: true,
        version: version::PKG_VERSION,
        timestamp: Utc::now().to_rfc3339(),
        models,
    })
}

/// `POST /query` — the guarded query pipeline.
async fn query(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    match run_query(&state, &headers, &body).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err((err, model)) => error_response(&err, model),
    }
}

/// The pipeline proper. Guard checks run before the body is even
/// looked at; JSON parsing happens before any external call.
async fn run_query(
    state: &AppState,
    headers: &HeaderMap,
    body: &Bytes,
) -> std::result::Result<QueryResponse, (KvasirError, Option<&'static str>)> {
    state.guard.check(headers).map_err(|e| (e, None))?;

    if body.len() > state.max_body_bytes {
        return Err((
            KvasirError::InvalidRequest("Request body too large".to_string()),
            None,
        ));
    }
    let raw: RawQuery = serde_json::from_slice(body).map_err(|_| {
        (
            KvasirError::InvalidRequest("Invalid JSON body".to_string()),
            None,
        )
    })?;

    let available = state.gateway.available_models();
    let request = raw.validate(&available).map_err(|e| (e, None))?;
    let model = request.model.name();

    let answer = state
        .gateway
        .answer(&request)
        .await
        .map_err(|e| (e, Some(model)))?;

    Ok(QueryResponse {
        answer: answer.answer,
        cached: answer.cached,
        model,
        model_variant: request.variant,
    })
}

/// Serialize a failure. The one place errors become wire bytes, and
/// the one place they are logged.
fn error_response(err: &KvasirError, model: Option<&'static str>) -> Response {
    let status = err.status();
    warn!(code = err.kind(), status, model, error = %err, "query failed");

    let body = ErrorBody {
        error: err.to_string(),
        code: err.kind(),
        model,
    };
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(body),
    )
        .into_response()
}

async fn query_wrong_method() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Only POST /query is supported")
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}
