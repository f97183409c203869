//! Axum server and routes.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use menu_prefetch::{PrefetchCoordinator, PrefetchEntry, PrefetchStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub struct AppState {
    pub coordinator: Arc<PrefetchCoordinator>,
}

/// Response envelope shared by every route: `code` mirrors an HTTP status.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            code: 200,
            message: "Success".to_string(),
            data: Some(data),
        })
    }

    fn error(code: i32, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            code,
            message: message.into(),
            data: None,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefetchRequest {
    pub key: String,
    pub restaurant_name: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadyData {
    pub key: String,
    pub ready: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusData {
    pub key: String,
    pub status: PrefetchStatus,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/prefetch", post(handle_prefetch).get(handle_snapshot))
        .route(
            "/prefetch/:key",
            get(handle_get_prefetched).delete(handle_clear_cache),
        )
        .route("/prefetch/:key/ready", get(handle_is_ready))
        .route("/prefetch/:key/status", get(handle_status))
        .route("/health", get(handle_health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn handle_prefetch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PrefetchRequest>,
) -> Json<ApiResponse<PrefetchEntry>> {
    if req.key.trim().is_empty() || req.restaurant_name.trim().is_empty() {
        return ApiResponse::error(400, "key and restaurantName are required");
    }
    let entry = state
        .coordinator
        .prefetch(&req.key, &req.restaurant_name, &req.address)
        .await;
    tracing::debug!(key = %req.key, status = %entry.status, "prefetch requested");
    ApiResponse::ok(entry)
}

async fn handle_get_prefetched(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Json<ApiResponse<PrefetchEntry>> {
    match state.coordinator.get_prefetched(&key) {
        Some(entry) => ApiResponse::ok(entry),
        None => ApiResponse::error(404, format!("no prefetch for {}", key)),
    }
}

async fn handle_is_ready(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Json<ApiResponse<ReadyData>> {
    let ready = state.coordinator.is_ready(&key);
    ApiResponse::ok(ReadyData { key, ready })
}

async fn handle_status(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Json<ApiResponse<StatusData>> {
    let status = state.coordinator.status(&key);
    ApiResponse::ok(StatusData { key, status })
}

async fn handle_clear_cache(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Json<ApiResponse<()>> {
    if state.coordinator.clear_cache(&key) {
        tracing::info!(key = %key, "prefetch cache cleared");
        Json(ApiResponse {
            code: 200,
            message: "Cleared".to_string(),
            data: None,
        })
    } else {
        ApiResponse::error(404, format!("no prefetch for {}", key))
    }
}

async fn handle_snapshot(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Vec<PrefetchEntry>>> {
    ApiResponse::ok(state.coordinator.snapshot())
}

async fn handle_health() -> &'static str {
    "ok"
}
