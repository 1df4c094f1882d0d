// error.rs
use axum::http::StatusCode;
use thiserror::Error;

/// Terminal failures of a webhook delivery. Each maps to exactly one
/// status code and a fixed JSON string body.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("missing or invalid webhook signature")]
    InvalidSignature,

    #[error("malformed webhook payload: {0}")]
    MalformedPayload(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl WebhookError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::InvalidSignature => StatusCode::UNAUTHORIZED,
            WebhookError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            WebhookError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Never includes the underlying cause.
    pub fn public_message(&self) -> &'static str {
        match self {
            WebhookError::InvalidSignature => "Invalid signature",
            WebhookError::MalformedPayload(_) => "Invalid JSON payload",
            WebhookError::Internal(_) => "Internal server error",
        }
    }
}
