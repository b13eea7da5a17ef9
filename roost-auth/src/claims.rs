//! Session token record and session cookie claims
//!
//! This module defines the session token produced by the sign-in callbacks,
//! the JWT claims it is wrapped in when stored in the session cookie, and
//! the public session payload served to the browser.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session token record.
///
/// Written once per sign-in event by [`crate::callbacks::SessionCallbacks::jwt`]
/// and passed through unchanged on every later request. `jwt` is the
/// backend-issued signed token; it is never verified, refreshed or revoked
/// by this crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionToken {
    /// Backend-issued signed token, used as a bearer credential
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt: Option<String>,

    /// Backend user ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Avatar URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

impl SessionToken {
    /// Whether a backend token is attached.
    ///
    /// A federated sign-in whose backend exchange failed still yields a
    /// session, but one that downstream calls must treat as unauthenticated.
    pub fn is_authenticated(&self) -> bool {
        self.bearer().is_some()
    }

    /// The bearer credential, if any.
    pub fn bearer(&self) -> Option<&str> {
        self.jwt.as_deref().filter(|t| !t.is_empty())
    }
}

/// JWT claims of the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// JWT ID
    pub jti: String,

    /// The session token itself
    #[serde(flatten)]
    pub token: SessionToken,
}

impl SessionClaims {
    /// Wrap a session token for the given lifetime.
    pub fn new(token: SessionToken, duration: chrono::Duration) -> Self {
        let now = Utc::now();

        Self {
            iat: now.timestamp(),
            exp: (now + duration).timestamp(),
            jti: Uuid::now_v7().to_string(),
            token,
        }
    }

    /// Check if the cookie is expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Get expiration as DateTime.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }
}

/// Public session payload (`GET /api/auth/session`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Profile of the signed-in user
    pub user: SessionUser,

    /// Session expiry, RFC 3339
    pub expires: String,

    /// Backend-issued signed token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt: Option<String>,

    /// Backend user ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// User profile exposed on the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}

/// Format a session expiry the way the browser client expects it.
pub fn format_expiry(expires: DateTime<Utc>) -> String {
    expires.to_rfc3339_opts(SecondsFormat::Millis, true)
}
