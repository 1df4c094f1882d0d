// webhook.rs
use axum::{
    body::Bytes,
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::BTreeMap, fmt};
use tracing::{debug, error, info, warn};

use crate::error::WebhookError;
use crate::events;
use crate::signature;

pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";
pub const EVENT_HEADER: &str = "X-GitHub-Event";

/// An inbound delivery: raw body bytes plus headers. Header lookup is
/// case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct WebhookRequest {
    headers: HeaderMap,
    body: Bytes,
}

impl WebhookRequest {
    pub fn new(headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            headers,
            body: body.into(),
        }
    }

    /// Header value as text. Values that are not visible ASCII read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// Status code plus a body that is already JSON text.
///
/// Serializes as the Lambda proxy envelope, so the body ends up encoded
/// twice: `{"statusCode":401,"body":"\"Invalid signature\""}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl WebhookResponse {
    pub fn json<T: Serialize + ?Sized>(
        status: StatusCode,
        body: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            status_code: status.as_u16(),
            body: serde_json::to_string(body)?,
        })
    }

    pub fn from_error(err: &WebhookError) -> Self {
        Self {
            status_code: err.status_code().as_u16(),
            body: Value::from(err.public_message()).to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for WebhookResponse {
    fn into_response(self) -> Response {
        (
            self.status(),
            [(header::CONTENT_TYPE, "application/json")],
            self.body,
        )
            .into_response()
    }
}

/// API Gateway proxy event, as handed to a Lambda function.
#[derive(Debug, Default, Deserialize)]
pub struct LambdaEvent {
    /// Kept sorted so that duplicate names differing only in case resolve
    /// the same way every time: the first name in byte order wins.
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, rename = "isBase64Encoded")]
    pub is_base64_encoded: bool,
}

impl LambdaEvent {
    pub fn from_slice(raw: &[u8]) -> Result<Self, WebhookError> {
        serde_json::from_slice(raw)
            .map_err(|e| WebhookError::MalformedPayload(format!("invalid lambda event: {}", e)))
    }

    pub fn into_request(self) -> Result<WebhookRequest, WebhookError> {
        let mut headers = HeaderMap::new();
        for (name, value) in self.headers.unwrap_or_default() {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.entry(name).or_insert(value);
                }
                _ => debug!("Skipping unrepresentable header {:?}", name),
            }
        }

        let body = self.body.unwrap_or_default();
        let body = if self.is_base64_encoded {
            STANDARD.decode(body.as_bytes()).map_err(|e| {
                WebhookError::MalformedPayload(format!("body is not valid base64: {}", e))
            })?
        } else {
            body.into_bytes()
        };

        Ok(WebhookRequest::new(headers, body))
    }
}

/// Verifies and dispatches GitHub deliveries with an injected secret.
#[derive(Clone)]
pub struct WebhookHandler {
    secret: String,
}

impl fmt::Debug for WebhookHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookHandler")
            .field("secret", &"[redacted]")
            .finish()
    }
}

impl WebhookHandler {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.to_string(),
        }
    }

    pub fn verify_signature(&self, request: &WebhookRequest) -> bool {
        signature::verify(
            request.body(),
            request.header(SIGNATURE_HEADER),
            &self.secret,
        )
    }

    /// Produce the response for one delivery. Never fails; every failure
    /// becomes a 401, 400 or 500 response.
    pub fn handle(&self, request: &WebhookRequest) -> WebhookResponse {
        match self.process(request) {
            Ok(response) => response,
            Err(err) => reject(err),
        }
    }

    /// Same as [`handle`](Self::handle), starting from a Lambda proxy event.
    pub fn handle_lambda(&self, event: LambdaEvent) -> WebhookResponse {
        match event.into_request() {
            Ok(request) => self.handle(&request),
            Err(err) => reject(err),
        }
    }

    /// Same as [`handle_lambda`](Self::handle_lambda), starting from the raw
    /// event document. An unreadable event is a malformed payload.
    pub fn handle_lambda_bytes(&self, raw: &[u8]) -> WebhookResponse {
        match LambdaEvent::from_slice(raw) {
            Ok(event) => self.handle_lambda(event),
            Err(err) => reject(err),
        }
    }

    fn process(&self, request: &WebhookRequest) -> Result<WebhookResponse, WebhookError> {
        if !self.verify_signature(request) {
            return Err(WebhookError::InvalidSignature);
        }

        let payload: Value = serde_json::from_slice(request.body())
            .map_err(|e| WebhookError::MalformedPayload(e.to_string()))?;
        let event_type = request.header(EVENT_HEADER);

        info!(
            event_type = event_type.unwrap_or("none"),
            "Received GitHub event"
        );
        debug!(%payload, "Event payload");

        let (status, body) = events::dispatch(event_type, &payload);

        WebhookResponse::json(status, &body).map_err(|e| WebhookError::Internal(e.to_string()))
    }
}

fn reject(err: WebhookError) -> WebhookResponse {
    match &err {
        WebhookError::InvalidSignature => warn!("Invalid webhook signature"),
        WebhookError::MalformedPayload(cause) => warn!("Invalid webhook payload: {}", cause),
        WebhookError::Internal(cause) => error!("Error processing webhook: {}", cause),
    }
    WebhookResponse::from_error(&err)
}
