//! Signed cookie encoding
//!
//! This module signs and verifies the cookies the sign-in surface hands to
//! the browser: the session cookie carrying the [`SessionToken`] and the
//! short-lived OAuth state cookie. Both are HMAC-signed JWTs keyed by the
//! site secret, using the jsonwebtoken crate.
//!
//! This is the only place where signatures are checked. The backend-issued
//! token stored inside the session is opaque to this crate.

use crate::claims::{SessionClaims, SessionToken};
use crate::error::{AuthError, AuthResult};
use chrono::Duration;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

#[cfg(feature = "jwt")]
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

/// Configuration for cookie signing.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for the HMAC algorithms
    pub secret: String,

    /// Algorithm to use
    pub algorithm: JwtAlgorithm,

    /// Session cookie lifetime
    pub session_duration: Duration,

    /// OAuth state cookie lifetime
    pub state_duration: Duration,
}

impl JwtConfig {
    /// Configuration with default lifetimes for the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            algorithm: JwtAlgorithm::HS256,
            session_duration: Duration::days(30),
            state_duration: Duration::minutes(15),
        }
    }
}

/// Supported signing algorithms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum JwtAlgorithm {
    /// HMAC using SHA-256
    HS256,
    /// HMAC using SHA-384
    HS384,
    /// HMAC using SHA-512
    HS512,
}

#[cfg(feature = "jwt")]
impl From<JwtAlgorithm> for Algorithm {
    fn from(alg: JwtAlgorithm) -> Self {
        match alg {
            JwtAlgorithm::HS256 => Algorithm::HS256,
            JwtAlgorithm::HS384 => Algorithm::HS384,
            JwtAlgorithm::HS512 => Algorithm::HS512,
        }
    }
}

/// Signs and verifies session and state cookies.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    #[cfg(feature = "jwt")]
    encoding_key: EncodingKey,
    #[cfg(feature = "jwt")]
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("algorithm", &self.config.algorithm)
            .field("session_duration", &self.config.session_duration)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl JwtService {
    /// Create a new service with the given configuration.
    ///
    /// # Returns
    ///
    /// The service, or a configuration error when the secret is empty
    #[cfg(feature = "jwt")]
    pub fn new(config: JwtConfig) -> AuthResult<Self> {
        if config.secret.is_empty() {
            return Err(AuthError::ConfigError("Secret required for HMAC".to_string()));
        }

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Ok(Self {
            config,
            encoding_key,
            decoding_key,
        })
    }

    /// Create with a secret and default lifetimes (HS256).
    #[cfg(feature = "jwt")]
    pub fn with_secret(secret: impl Into<String>) -> AuthResult<Self> {
        Self::new(JwtConfig::new(secret))
    }

    /// Wrap a session token in claims and sign it.
    ///
    /// # Returns
    ///
    /// The encoded cookie value together with the claims that were signed
    #[cfg(feature = "jwt")]
    pub fn issue_session(&self, token: SessionToken) -> AuthResult<(String, SessionClaims)> {
        let claims = SessionClaims::new(token, self.config.session_duration);
        let encoded = self.encode_signed(&claims)?;
        Ok((encoded, claims))
    }

    /// Verify a session cookie and return its claims.
    #[cfg(feature = "jwt")]
    pub fn decode_session(&self, cookie: &str) -> AuthResult<SessionClaims> {
        self.decode_signed(cookie)
    }

    /// Sign arbitrary claims. The claims must carry an `exp` field.
    #[cfg(feature = "jwt")]
    pub fn encode_signed<T: Serialize>(&self, claims: &T) -> AuthResult<String> {
        let header = Header::new(self.config.algorithm.into());
        encode(&header, claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Token encoding failed: {}", e)))
    }

    /// Verify signature and expiry, then decode the claims.
    #[cfg(feature = "jwt")]
    pub fn decode_signed<T: DeserializeOwned>(&self, token: &str) -> AuthResult<T> {
        let validation = Validation::new(self.config.algorithm.into());

        decode::<T>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    AuthError::InvalidToken("Malformed token".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AuthError::InvalidToken("Invalid signature".to_string())
                }
                _ => AuthError::InvalidToken(e.to_string()),
            })
    }

    /// Get the configuration.
    pub fn config(&self) -> &JwtConfig {
        &self.config
    }
}
