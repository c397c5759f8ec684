//! HTTP router for local invocations

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use tenantq_core::{ErrorResponse, RequestId};

use crate::config::Backend;
use crate::handler::{ProvisionError, ProvisioningHandler};

/// Header carrying a caller-chosen request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shared state for the router
pub struct AppState {
    handler: ProvisioningHandler,
    backend: Backend,
}

impl AppState {
    pub fn new(handler: ProvisioningHandler, backend: Backend) -> Self {
        Self { handler, backend }
    }
}

/// Create the invocation router
pub fn create_router(state: AppState) -> Router {
    let shared_state = Arc::new(state);

    Router::new()
        .route("/health", get(health_check))
        .route("/invoke", post(invoke))
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state)
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "running",
        "backend": state.backend.as_str(),
        "notifications": state.handler.topic_arn().is_some(),
    }))
}

/// POST /invoke
///
/// Takes an invocation envelope and returns the handler's response as a JSON
/// string.
async fn invoke(State(state): State<Arc<AppState>>, headers: HeaderMap, body: Bytes) -> Response {
    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(RequestId::with_id)
        .unwrap_or_default();

    info!(request_id = %request_id, bytes = body.len(), "Invocation request");

    let event = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => return error_response(&ProvisionError::from(e).to_response(&request_id)),
    };

    match state.handler.handle_event(event, &request_id).await {
        Ok(summary) => (
            StatusCode::OK,
            [(header::HeaderName::from_static(REQUEST_ID_HEADER), request_id.to_string())],
            Json(summary),
        )
            .into_response(),
        Err(e) => error_response(&e.to_response(&request_id)),
    }
}

fn error_response(error: &ErrorResponse) -> Response {
    let status = StatusCode::from_u16(error.code.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        error.to_json(),
    )
        .into_response()
}
