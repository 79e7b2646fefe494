//! Private request signing.
//!
//! Kraken signs private calls with HMAC-SHA512 of
//! `URI path + SHA256(nonce + POST data)`, keyed with the base64-decoded
//! API secret, sent base64-encoded in the `API-Sign` header.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};

use super::types::KrakenError;

/// Strictly increasing nonce source.
///
/// Nonces start from the wall clock in microseconds; an atomic floor
/// guarantees that consecutive calls never repeat or go backwards even if
/// the clock does.
#[derive(Debug, Default)]
pub struct NonceSource {
    floor: AtomicU64,
}

impl NonceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next nonce, always greater than every previously returned value.
    pub fn next(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0);

        let mut prev = self.floor.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match self.floor.compare_exchange_weak(
                prev,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }
}

/// URL-encode POST fields into `application/x-www-form-urlencoded` form.
pub fn encode_form(fields: &[(&str, String)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Compute the `API-Sign` header value for a private request.
///
/// `body` must already contain the `nonce` field and be the exact bytes
/// that will be sent as the POST body.
pub fn sign_request(
    secret_b64: &str,
    path: &str,
    nonce: u64,
    body: &str,
) -> Result<String, KrakenError> {
    // SHA256(nonce + POST data)
    let mut sha256 = Sha256::new();
    sha256.update(format!("{nonce}{body}"));
    let digest = sha256.finalize();

    // URI path + digest
    let mut message = path.as_bytes().to_vec();
    message.extend_from_slice(&digest);

    let secret = BASE64
        .decode(secret_b64)
        .map_err(|e| KrakenError::InvalidSecret(format!("not valid base64: {e}")))?;

    let mut mac = Hmac::<Sha512>::new_from_slice(&secret)
        .map_err(|e| KrakenError::InvalidSecret(e.to_string()))?;
    mac.update(&message);

    Ok(BASE64.encode(mac.finalize().into_bytes()))
}
