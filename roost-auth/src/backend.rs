//! Booking backend auth endpoints
//!
//! Shared request/response handling for the two backend calls the sign-in
//! flow makes: password login and the federated token exchange.

use crate::error::{AuthError, AuthResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Path of the password login endpoint.
pub const LOGIN_PATH: &str = "/api/auth/login";

/// Path of the federated token exchange endpoint.
pub const FEDERATED_AUTH_PATH: &str = "/api/auth/google";

/// Build a full URL by appending a path to a base URL.
pub fn endpoint_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{}/{}", base, path)
}

/// Body returned by the backend auth endpoints.
///
/// The backend is not consistent about where it puts the user ID, so every
/// known location is accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendAuthResponse {
    /// Signed token
    #[serde(default)]
    pub token: Option<String>,

    /// Mongo-style user ID
    #[serde(default, rename = "_id")]
    pub object_id: Option<String>,

    /// Plain user ID
    #[serde(default)]
    pub id: Option<String>,

    /// Nested user record
    #[serde(default)]
    pub user: Option<BackendUser>,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Email address
    #[serde(default)]
    pub email: Option<String>,
}

/// User record nested in a backend auth response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendUser {
    #[serde(default, rename = "_id")]
    pub object_id: Option<String>,

    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,
}

impl BackendAuthResponse {
    /// The signed token, if present and non-empty.
    pub fn signed_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    /// The user ID from the nested user record or the top level.
    pub fn user_id(&self) -> Option<&str> {
        let nested = self
            .user
            .as_ref()
            .and_then(|u| u.object_id.as_deref().or(u.id.as_deref()));

        nested
            .or(self.object_id.as_deref())
            .or(self.id.as_deref())
            .filter(|id| !id.is_empty())
    }

    /// The display name from the nested user record or the top level.
    pub fn display_name(&self) -> Option<&str> {
        self.user
            .as_ref()
            .and_then(|u| u.name.as_deref())
            .or(self.name.as_deref())
    }
}

/// POST a JSON body to a backend auth endpoint and parse the reply.
pub(crate) async fn post_json<B: Serialize + ?Sized>(
    client: &Client,
    url: &str,
    body: &B,
) -> AuthResult<BackendAuthResponse> {
    debug!("POST {}", url);

    let response = client.post(url).json(body).send().await?;
    let status = response.status();

    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        warn!("Backend auth error ({}) from {}", status.as_u16(), url);
        return Err(AuthError::Upstream {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|e| AuthError::InvalidResponse(e.to_string()))
}
