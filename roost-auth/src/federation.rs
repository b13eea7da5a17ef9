//! Federated identity exchange
//!
//! After a Google sign-in, the provider-asserted identity is forwarded to the
//! booking backend, which answers with its own signed token for that user.

use crate::backend::{endpoint_url, post_json, FEDERATED_AUTH_PATH};
use crate::error::{AuthError, AuthResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Identity asserted by the federation provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalIdentityAssertion {
    /// Email address
    pub email: String,

    /// Display name
    pub name: String,

    /// Provider-side account ID
    pub google_id: String,

    /// Avatar URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Backend answer to a successful exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedGrant {
    /// Backend-issued signed token
    pub token: String,

    /// Backend user ID, when the backend returned one
    pub id: Option<String>,
}

/// Exchanges provider assertions for backend tokens.
#[derive(Debug, Clone)]
pub struct FederationBridge {
    client: Client,
    exchange_url: String,
}

impl FederationBridge {
    /// Create a bridge to the backend at `api_base_url`.
    pub fn new(api_base_url: &str, client: Client) -> Self {
        Self {
            client,
            exchange_url: endpoint_url(api_base_url, FEDERATED_AUTH_PATH),
        }
    }

    /// Forward the assertion and return the backend's grant.
    ///
    /// Succeeds only on an ok status with a non-empty token.
    #[instrument(skip(self, assertion), fields(google_id = %assertion.google_id))]
    pub async fn exchange(
        &self,
        assertion: &ExternalIdentityAssertion,
    ) -> AuthResult<FederatedGrant> {
        let response = post_json(&self.client, &self.exchange_url, assertion).await?;

        let token = response
            .signed_token()
            .ok_or_else(|| AuthError::MissingClaim("token".to_string()))?
            .to_string();

        debug!("Federated exchange succeeded");

        Ok(FederatedGrant {
            token,
            id: response.user_id().map(str::to_string),
        })
    }
}
