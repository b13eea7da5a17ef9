//! Error types for sign-in and session operations
//!
//! This module defines the errors that can occur while verifying credentials,
//! talking to the booking backend or the identity provider, and encoding or
//! decoding session cookies.

use thiserror::Error;

/// Authentication error types.
///
/// The sign-in surface collapses most of these into "sign-in denied" before
/// anything reaches the browser; the variants exist so the cause can be
/// logged and asserted on in tests.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Session token has expired
    #[error("Token has expired")]
    TokenExpired,

    /// Session token is invalid (malformed, bad signature, etc.)
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Backend response is missing a required field
    #[error("Missing required claim: {0}")]
    MissingClaim(String),

    /// Caller is not signed in
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Email or password missing, or rejected by the backend
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// CSRF token in the request does not match the cookie
    #[error("CSRF token mismatch")]
    CsrfMismatch,

    /// OAuth provider error (state mismatch, code exchange, user info)
    #[error("OAuth error: {0}")]
    OAuthError(String),

    /// Backend answered with a non-success status
    #[error("Upstream error ({status}): {message}")]
    Upstream {
        /// HTTP status code returned by the backend.
        status: u16,
        /// Response body, or a placeholder when it could not be read.
        message: String,
    },

    /// Backend could not be reached
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend answered with a body we could not parse
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Check if this error should be logged at error level.
    ///
    /// Rejected credentials and expired cookies are expected and
    /// should not be logged as errors.
    pub fn is_server_error(&self) -> bool {
        matches!(self, AuthError::Internal(_) | AuthError::ConfigError(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::TokenExpired
            | AuthError::InvalidToken(_)
            | AuthError::MissingClaim(_)
            | AuthError::InvalidCredentials
            | AuthError::Unauthorized(_) => 401,

            AuthError::CsrfMismatch => 403,

            AuthError::Upstream { .. }
            | AuthError::Network(_)
            | AuthError::InvalidResponse(_) => 502,

            AuthError::OAuthError(_) | AuthError::ConfigError(_) | AuthError::Internal(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::InvalidToken(_) => "INVALID_TOKEN",
            AuthError::MissingClaim(_) => "MISSING_CLAIM",
            AuthError::Unauthorized(_) => "UNAUTHORIZED",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::CsrfMismatch => "CSRF_MISMATCH",
            AuthError::OAuthError(_) => "OAUTH_ERROR",
            AuthError::Upstream { .. } => "UPSTREAM_ERROR",
            AuthError::Network(_) => "NETWORK_ERROR",
            AuthError::InvalidResponse(_) => "INVALID_RESPONSE",
            AuthError::ConfigError(_) => "CONFIG_ERROR",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
