//! Session token signing and verification.
//!
//! A token is `{session_id}.{signature}` where the signature is the
//! HMAC-SHA256 of the session id under the shared password, encoded as
//! unpadded URL-safe base64. The signature must validate before the session id
//! is ever used for a store lookup, so a forged token never touches Redis.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::compare::constant_time_eq;

type HmacSha256 = Hmac<Sha256>;

/// Sign a message with HMAC-SHA256, returning the URL-safe base64 signature.
#[must_use]
pub fn sign(message: &str, secret: &str) -> String {
    // HMAC-SHA256 accepts keys of any length, so construction cannot fail.
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any size");
    mac.update(message.as_bytes());
    URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
}

/// Verify a signature produced by [`sign`].
///
/// A pure predicate: malformed signatures verify to `false`, never error.
/// Comparison runs in constant time.
#[must_use]
pub fn verify(message: &str, signature: &str, secret: &str) -> bool {
    constant_time_eq(sign(message, secret).as_bytes(), signature.as_bytes())
}

/// Combine a session id and its signature into the cookie value.
#[must_use]
pub fn compose(session_id: &str, signature: &str) -> String {
    format!("{session_id}.{signature}")
}

/// Split a cookie value back into `(session_id, signature)`.
///
/// Returns `None` when the separator is missing or either part is empty.
#[must_use]
pub fn split(token: &str) -> Option<(&str, &str)> {
    let (session_id, signature) = token.split_once('.')?;
    if session_id.is_empty() || signature.is_empty() {
        return None;
    }
    Some((session_id, signature))
}
