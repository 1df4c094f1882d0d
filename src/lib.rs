//! GitHub webhook receiver.
//!
//! Authenticates deliveries with the `X-Hub-Signature-256` HMAC, parses the
//! JSON payload and answers with a small summary per `X-GitHub-Event` type.

pub mod config;
pub mod error;
pub mod events;
pub mod server;
pub mod signature;
pub mod webhook;

pub use crate::config::Config;
pub use crate::error::WebhookError;
pub use crate::events::dispatch;
pub use crate::signature::verify;
pub use crate::webhook::{LambdaEvent, WebhookHandler, WebhookRequest, WebhookResponse};
