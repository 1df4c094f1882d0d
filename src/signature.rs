// signature.rs
//! `X-Hub-Signature-256` verification.
//!
//! GitHub signs each delivery with HMAC-SHA256 over the raw request body,
//! keyed by the webhook secret, and sends `sha256=<lowercase hex>`.
//! See <https://docs.github.com/en/webhooks/using-webhooks/validating-webhook-deliveries>

use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// The only algorithm tag accepted in the signature header.
pub const SIGNATURE_ALGORITHM: &str = "sha256";

/// Lowercase hex HMAC-SHA256 of `body` keyed by `secret`.
pub fn compute_digest(body: &[u8], secret: &str) -> Result<String, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Full header value (`sha256=<hex>`) GitHub would send for `body`.
pub fn sign(body: &[u8], secret: &str) -> Result<String, InvalidLength> {
    Ok(format!(
        "{}={}",
        SIGNATURE_ALGORITHM,
        compute_digest(body, secret)?
    ))
}

/// Verify a signature header against the raw body.
///
/// Returns `false` when the header is absent or empty, has no `=`, names an
/// algorithm other than `sha256`, or carries the wrong digest.
pub fn verify(body: &[u8], signature_header: Option<&str>, secret: &str) -> bool {
    let signature = match signature_header {
        Some(s) if !s.is_empty() => s,
        _ => {
            debug!("signature header missing");
            return false;
        }
    };

    let Some((algorithm, provided)) = signature.split_once('=') else {
        debug!("signature header has no algorithm separator");
        return false;
    };

    if algorithm != SIGNATURE_ALGORITHM {
        debug!(algorithm, "unsupported signature algorithm");
        return false;
    }

    let computed = match compute_digest(body, secret) {
        Ok(digest) => digest,
        Err(_) => return false,
    };

    // Constant-time comparison
    computed.as_bytes().ct_eq(provided.as_bytes()).into()
}
