//! Router, shared state, and error mapping.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::info;
use verity_registry::{Registry, RegistryError, SequencedEvent};

use crate::content::{handle_get_content, handle_submit_deepfake, handle_submit_genuine};
use crate::identity::{
    handle_get_identity, handle_get_profile, handle_get_reputation, handle_register,
    handle_update_profile,
};
use crate::reuse::{handle_grant_reuse, handle_reject_reuse, handle_request_reuse};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub start_time: Instant,
    pub node_id: String,
    pub req_count: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(registry: Arc<Registry>, node_id: impl Into<String>) -> Self {
        Self {
            registry,
            start_time: Instant::now(),
            node_id: node_id.into(),
            req_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn record_request(&self) -> u64 {
        self.req_count.fetch_add(1, Ordering::Relaxed) as u64 + 1
    }

    fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

pub(crate) type SharedState = Arc<AppState>;

/// Uniform error body: `{"error": {"code", "message"}}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

/// Registry failures mapped onto HTTP statuses: validation 400,
/// authorization 403, missing references 404, uniqueness and
/// state-machine conflicts 409.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        use RegistryError::*;
        let (status, code) = match &err {
            EmptyHandle => (StatusCode::BAD_REQUEST, "empty_handle"),
            InvalidFingerprints { .. } => (StatusCode::BAD_REQUEST, "invalid_fingerprints"),
            NotAuthorized { .. } => (StatusCode::FORBIDDEN, "not_authorized"),
            IdentityNotFound { .. } => (StatusCode::NOT_FOUND, "identity_not_found"),
            ContentNotFound { .. } => (StatusCode::NOT_FOUND, "content_not_found"),
            UnknownUploader { .. } => (StatusCode::NOT_FOUND, "unknown_uploader"),
            UnknownRequester { .. } => (StatusCode::NOT_FOUND, "unknown_requester"),
            AlreadyRegistered { .. } => (StatusCode::CONFLICT, "already_registered"),
            HandleTaken { .. } => (StatusCode::CONFLICT, "handle_taken"),
            DuplicateContentId { .. } => (StatusCode::CONFLICT, "duplicate_content_id"),
            AlreadyRequested { .. } => (StatusCode::CONFLICT, "already_requested"),
            RequestNotPending { .. } => (StatusCode::CONFLICT, "request_not_pending"),
            CannotRequestOwnContent { .. } => (StatusCode::CONFLICT, "cannot_request_own_content"),
            CannotReuseDeepfake { .. } => (StatusCode::CONFLICT, "cannot_reuse_deepfake"),
        };
        Self {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let payload = Json(ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        });
        (self.status, payload).into_response()
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    node_id: String,
    uptime_secs: u64,
    identities: u64,
    contents: u64,
    pending_requests: u64,
    req_total: u64,
}

#[derive(Debug, Serialize)]
struct VersionResponse {
    node_id: String,
    version: &'static str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EventsQuery {
    #[serde(default)]
    since: u64,
}

#[derive(Debug, Serialize)]
struct EventsResponse {
    events: Vec<SequencedEvent>,
}

/// Serve the API on `addr` until the task is aborted.
pub async fn start_server(state: AppState, addr: &str) -> Result<()> {
    let shared = Arc::new(state);
    let app = build_router(shared);
    let listener = bind_listener(addr).await?;
    info!(%addr, "registry RPC listening");
    axum::serve(listener, app)
        .await
        .context("RPC server terminated unexpectedly")
}

async fn bind_listener(addr: &str) -> Result<tokio::net::TcpListener> {
    let socket_addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("invalid listen address {addr}"))?;
    tokio::net::TcpListener::bind(socket_addr)
        .await
        .with_context(|| format!("failed to bind RPC listener on {socket_addr}"))
}

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/version", get(handle_version))
        .route("/events", get(handle_events))
        .route("/identity/register", post(handle_register))
        .route("/identity/:principal", get(handle_get_identity))
        .route("/identity/:principal/reputation", get(handle_get_reputation))
        .route(
            "/identity/:principal/profile",
            get(handle_get_profile).post(handle_update_profile),
        )
        .route("/content/genuine", post(handle_submit_genuine))
        .route("/content/deepfake", post(handle_submit_deepfake))
        .route("/content/:content_id", get(handle_get_content))
        .route("/content/:content_id/reuse/request", post(handle_request_reuse))
        .route("/content/:content_id/reuse/grant", post(handle_grant_reuse))
        .route("/content/:content_id/reuse/reject", post(handle_reject_reuse))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let req_total = state.record_request();
    let stats = state.registry.stats();
    Json(HealthResponse {
        status: "ok",
        node_id: state.node_id.clone(),
        uptime_secs: state.uptime_seconds(),
        identities: stats.identities,
        contents: stats.contents,
        pending_requests: stats.pending_requests,
        req_total,
    })
}

async fn handle_version(State(state): State<SharedState>) -> Json<VersionResponse> {
    state.record_request();
    Json(VersionResponse {
        node_id: state.node_id.clone(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn handle_events(
    State(state): State<SharedState>,
    Query(query): Query<EventsQuery>,
) -> Json<EventsResponse> {
    state.record_request();
    Json(EventsResponse {
        events: state.registry.events_since(query.since),
    })
}
