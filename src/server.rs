// server.rs
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::HeaderMap,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use std::{any::Any, sync::Arc};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::error;

use crate::error::WebhookError;
use crate::webhook::{WebhookHandler, WebhookRequest, WebhookResponse};

/// GitHub caps webhook payloads at 25 MB.
pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppState {
    pub webhook_handler: WebhookHandler,
}

/// Routes:
/// - `POST /webhook`: a GitHub delivery as sent by GitHub
/// - `POST /lambda`: an API Gateway proxy event, answered with the `{statusCode, body}` envelope
/// - `GET /health`
pub fn router(webhook_handler: WebhookHandler) -> Router {
    with_layers(routes(webhook_handler))
}

fn routes(webhook_handler: WebhookHandler) -> Router {
    let state = AppState { webhook_handler };

    Router::new()
        .route("/webhook", post(handle_webhook))
        .route("/lambda", post(handle_lambda_event))
        .route("/health", get(health_check))
        .with_state(Arc::new(state))
}

fn with_layers(router: Router) -> Router {
    router.layer(DefaultBodyLimit::max(MAX_BODY_BYTES)).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CatchPanicLayer::custom(handle_panic)),
    )
}

async fn handle_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> WebhookResponse {
    state
        .webhook_handler
        .handle(&WebhookRequest::new(headers, body))
}

// Always answers 200 with the envelope, whatever the event document holds.
async fn handle_lambda_event(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Json<WebhookResponse> {
    Json(state.webhook_handler.handle_lambda_bytes(&body))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now()
    }))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    error!("Webhook handler panicked: {}", detail);
    WebhookResponse::from_error(&WebhookError::Internal(detail)).into_response()
}
