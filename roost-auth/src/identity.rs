//! Client-side identity extraction
//!
//! Recovers a user ID from a stored backend token by decoding the token's
//! payload segment. No signature is checked.
//!
//! # Warning
//!
//! The result is whatever the holder of the token chose to put there. Use it
//! for optimistic personalisation only (greeting, "your reviews" highlighting,
//! log context). Never use it to decide whether a request is allowed; the
//! backend verifies the bearer token on every authenticated call.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Key under which the backend token is stored on the client.
pub const AUTH_TOKEN_KEY: &str = "auth_Token";

/// Read access to wherever the client keeps its token.
pub trait TokenStore {
    /// Look up a stored value.
    fn get(&self, key: &str) -> Option<String>;
}

/// In-memory token store.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    entries: HashMap<String, String>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Remove a value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}

/// Identity decoded from a stored token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    /// User ID claimed by the token payload
    pub user_id: String,
}

impl ClientIdentity {
    /// Decode the identity from the token stored under [`AUTH_TOKEN_KEY`].
    ///
    /// Returns `None` when no token is stored or it cannot be decoded.
    pub fn current(store: &impl TokenStore) -> Option<Self> {
        let token = match store.get(AUTH_TOKEN_KEY) {
            Some(token) => token,
            None => {
                debug!("No stored token under {}", AUTH_TOKEN_KEY);
                return None;
            }
        };

        extract_user_id_from_token(&token).map(|user_id| Self { user_id })
    }
}

/// Extract the user ID from a token's payload segment.
///
/// Splits on `.`, base64-decodes the middle segment (URL-safe or standard
/// alphabet, padding optional), parses it as a JSON object and returns `_id`,
/// falling back to `id`. Any failure is logged and yields `None`.
pub fn extract_user_id_from_token(token: &str) -> Option<String> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next()) {
        (Some(_), Some(payload)) if !payload.is_empty() => payload,
        _ => {
            warn!("Token has no payload segment");
            return None;
        }
    };

    let bytes = match decode_segment(payload) {
        Some(bytes) => bytes,
        None => {
            warn!("Token payload is not valid base64");
            return None;
        }
    };

    let claims: Value = match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(e) => {
            warn!("Token payload is not valid JSON: {}", e);
            return None;
        }
    };

    let id = ["_id", "id"]
        .iter()
        .filter_map(|key| claims.get(*key))
        .find_map(id_as_string);

    if id.is_none() {
        debug!("Token payload carries neither _id nor id");
    }
    id
}

// Browsers' atob() ignores non-zero trailing bits and missing padding.
const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_allow_trailing_bits(true)
    .with_decode_padding_mode(DecodePaddingMode::Indifferent);

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

fn decode_segment(segment: &str) -> Option<Vec<u8>> {
    let trimmed = segment.trim_end_matches('=');
    URL_SAFE_LENIENT
        .decode(trimmed)
        .or_else(|_| STANDARD_LENIENT.decode(trimmed))
        .ok()
}

fn id_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
