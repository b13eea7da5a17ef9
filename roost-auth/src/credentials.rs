//! Email/password verification against the booking backend

use crate::backend::{endpoint_url, post_json, LOGIN_PATH};
use crate::error::{AuthError, AuthResult};
use crate::identity::extract_user_id_from_token;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Email/password pair submitted on the sign-in form.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Identity record returned for accepted credentials.
///
/// Doubles as the sign-in user handed to the session callbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedUser {
    /// Backend user ID
    pub id: String,

    /// Email address
    pub email: String,

    /// Display name
    pub name: String,

    /// Backend-issued signed token
    pub token: String,
}

/// Verifies credentials against the backend login endpoint.
#[derive(Debug, Clone)]
pub struct CredentialVerifier {
    client: Client,
    login_url: String,
}

impl CredentialVerifier {
    /// Create a verifier for the backend at `api_base_url`.
    pub fn new(api_base_url: &str, client: Client) -> Self {
        Self {
            client,
            login_url: endpoint_url(api_base_url, LOGIN_PATH),
        }
    }

    /// Verify credentials, reporting why a sign-in was refused.
    ///
    /// Incomplete credentials are rejected without contacting the backend.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn verify(&self, credentials: &Credentials) -> AuthResult<VerifiedUser> {
        if !credentials.is_complete() {
            return Err(AuthError::InvalidCredentials);
        }

        let response = post_json(&self.client, &self.login_url, credentials).await?;

        let token = response
            .signed_token()
            .ok_or_else(|| AuthError::MissingClaim("token".to_string()))?
            .to_string();

        let id = response
            .user_id()
            .map(str::to_string)
            .or_else(|| extract_user_id_from_token(&token))
            .unwrap_or_else(|| credentials.email.clone());

        let name = response
            .display_name()
            .map(str::to_string)
            .unwrap_or_else(|| credentials.email.clone());

        debug!("Credentials accepted for user {}", id);

        Ok(VerifiedUser {
            id,
            email: credentials.email.clone(),
            name,
            token,
        })
    }

    /// Verify credentials, collapsing every failure to "no identity".
    ///
    /// This is what the sign-in surface uses: the cause is logged here and
    /// never reaches the browser.
    pub async fn authorize(&self, credentials: &Credentials) -> Option<VerifiedUser> {
        match self.verify(credentials).await {
            Ok(user) => Some(user),
            Err(AuthError::InvalidCredentials) => {
                debug!("Sign-in refused: email or password missing");
                None
            }
            Err(e) => {
                warn!("Sign-in refused: {}", e);
                None
            }
        }
    }
}
