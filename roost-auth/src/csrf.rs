//! Double-submit CSRF tokens for the sign-in forms
//!
//! The cookie holds `token|hash` where `hash = base64url(sha256(token + secret))`;
//! the form posts `token`. A request is accepted when the cookie's hash matches
//! the secret and the posted token matches the cookie.

use crate::error::{AuthError, AuthResult};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// A freshly issued CSRF token and its cookie value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfPair {
    /// Value the form must echo back
    pub token: String,
    /// Value stored in the cookie
    pub cookie: String,
}

/// Issue a new token.
pub fn issue(secret: &str) -> CsrfPair {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    let token = URL_SAFE_NO_PAD.encode(bytes);
    let cookie = format!("{}|{}", token, digest(&token, secret));

    CsrfPair { token, cookie }
}

/// Recover the token from a cookie value, if the cookie is authentic.
pub fn token_from_cookie(cookie: &str, secret: &str) -> Option<String> {
    let (token, hash) = cookie.split_once('|')?;
    constant_time_eq(&digest(token, secret), hash).then(|| token.to_string())
}

/// Check a posted token against the cookie.
pub fn verify(cookie: Option<&str>, posted: Option<&str>, secret: &str) -> AuthResult<()> {
    let expected = cookie
        .and_then(|c| token_from_cookie(c, secret))
        .ok_or(AuthError::CsrfMismatch)?;

    match posted {
        Some(posted) if constant_time_eq(posted, &expected) => Ok(()),
        _ => Err(AuthError::CsrfMismatch),
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn digest(token: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.update(secret.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}
