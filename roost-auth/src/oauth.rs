//! OAuth 2.0 sign-in with Google
//!
//! This module drives the authorization code flow (with PKCE) against Google
//! using the oauth2 crate, and fetches the signed-in user's profile from the
//! userinfo endpoint.

use crate::error::{AuthError, AuthResult};
use async_trait::async_trait;
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Google authorization endpoint.
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Google token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Google userinfo endpoint.
pub const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Lifetime of a pending sign-in, in seconds.
const STATE_MAX_AGE_SECS: i64 = 900;

/// OAuth provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Client ID
    pub client_id: String,

    /// Client secret
    #[serde(skip_serializing)]
    pub client_secret: String,

    /// Authorization URL
    pub auth_url: String,

    /// Token URL
    pub token_url: String,

    /// Userinfo URL
    pub userinfo_url: String,

    /// Redirect URL registered with the provider
    pub redirect_url: String,

    /// Scopes to request
    pub scopes: Vec<String>,
}

impl OAuthConfig {
    /// Google configuration with the standard endpoints and scopes.
    pub fn google(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
            redirect_url: redirect_url.into(),
            scopes: vec![
                "openid".to_string(),
                "email".to_string(),
                "profile".to_string(),
            ],
        }
    }
}

/// OAuth user information retrieved from the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthUserInfo {
    /// Provider-specific user ID
    pub provider_id: String,

    /// Email address
    pub email: Option<String>,

    /// Whether email is verified
    pub email_verified: bool,

    /// Display name
    pub name: Option<String>,

    /// First name
    pub given_name: Option<String>,

    /// Last name
    pub family_name: Option<String>,

    /// Profile picture URL
    pub picture: Option<String>,

    /// Locale
    pub locale: Option<String>,

    /// Raw provider response
    #[serde(default)]
    pub raw: HashMap<String, Value>,
}

impl OAuthUserInfo {
    /// Parse a userinfo response.
    ///
    /// Accepts both the OIDC shape (`sub`, `email_verified`) and the legacy
    /// v2 shape (`id`, `verified_email`).
    pub fn from_json(json: Value) -> AuthResult<Self> {
        let text = |key: &str| json.get(key).and_then(Value::as_str).map(str::to_string);

        let provider_id = text("sub")
            .or_else(|| text("id"))
            .ok_or_else(|| AuthError::OAuthError("Missing user ID".to_string()))?;

        let email_verified = json
            .get("email_verified")
            .or_else(|| json.get("verified_email"))
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let info = Self {
            provider_id,
            email: text("email"),
            email_verified,
            name: text("name"),
            given_name: text("given_name"),
            family_name: text("family_name"),
            picture: text("picture"),
            locale: text("locale"),
            raw: HashMap::new(),
        };

        let raw = match json {
            Value::Object(map) => map.into_iter().collect(),
            _ => HashMap::new(),
        };

        Ok(Self { raw, ..info })
    }
}

/// OAuth token response from provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthTokens {
    /// Access token
    pub access_token: String,

    /// Token type (usually "Bearer")
    pub token_type: String,

    /// Expires in seconds
    pub expires_in: Option<i64>,

    /// Refresh token (if provided)
    pub refresh_token: Option<String>,
}

/// Pending sign-in, kept in a signed cookie between the redirect to the
/// provider and the callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthState {
    /// Random state value
    pub state: String,

    /// PKCE code verifier
    pub code_verifier: Option<String>,

    /// Where to send the browser after the sign-in
    pub redirect_after: Option<String>,

    /// Created timestamp
    pub created_at: i64,
}

impl OAuthState {
    /// Create a new OAuth state.
    pub fn new() -> Self {
        Self {
            state: random_alphanumeric(32),
            code_verifier: None,
            redirect_after: None,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Create with PKCE support.
    pub fn with_pkce() -> Self {
        let mut state = Self::new();
        state.code_verifier = Some(random_alphanumeric(64));
        state
    }

    /// Set the post-sign-in target.
    pub fn with_redirect(mut self, url: impl Into<String>) -> Self {
        self.redirect_after = Some(url.into());
        self
    }

    /// Get the PKCE code challenge (S256).
    pub fn code_challenge(&self) -> Option<String> {
        use sha2::{Digest, Sha256};

        self.code_verifier.as_ref().map(|verifier| {
            let mut hasher = Sha256::new();
            hasher.update(verifier.as_bytes());
            let hash = hasher.finalize();
            base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, hash)
        })
    }

    /// Check if the pending sign-in has expired (15 minutes).
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        now - self.created_at > STATE_MAX_AGE_SECS
    }

    /// Check the state echoed back by the provider.
    pub fn verify(&self, returned_state: &str) -> AuthResult<()> {
        if self.is_expired() {
            return Err(AuthError::OAuthError("Sign-in state expired".to_string()));
        }
        if self.state != returned_state {
            return Err(AuthError::OAuthError("State mismatch".to_string()));
        }
        Ok(())
    }

    /// Wrap in claims suitable for a signed cookie.
    pub fn into_claims(self) -> StateClaims {
        StateClaims {
            exp: self.created_at + STATE_MAX_AGE_SECS,
            state: self,
        }
    }
}

impl Default for OAuthState {
    fn default() -> Self {
        Self::new()
    }
}

/// Signed-cookie claims for a pending sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateClaims {
    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// The pending sign-in
    #[serde(flatten)]
    pub state: OAuthState,
}

fn random_alphanumeric(len: usize) -> String {
    use rand::Rng;

    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Trait for OAuth provider implementations.
#[async_trait]
pub trait OAuthProviderClient: Send + Sync {
    /// Get the authorization URL.
    async fn authorization_url(&self, state: &OAuthState) -> AuthResult<String>;

    /// Exchange authorization code for tokens.
    async fn exchange_code(&self, code: &str, state: &OAuthState) -> AuthResult<OAuthTokens>;

    /// Get user info from access token.
    async fn get_user_info(&self, access_token: &str) -> AuthResult<OAuthUserInfo>;
}

/// Google OAuth client.
#[derive(Clone)]
pub struct GoogleOAuthClient {
    oauth: BasicClient,
    http: Client,
    config: OAuthConfig,
}

impl std::fmt::Debug for GoogleOAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleOAuthClient")
            .field("client_id", &self.config.client_id)
            .field("redirect_url", &self.config.redirect_url)
            .finish_non_exhaustive()
    }
}

impl GoogleOAuthClient {
    /// Create a client from configuration.
    ///
    /// # Returns
    ///
    /// The client, or a configuration error if any URL is invalid
    pub fn new(config: OAuthConfig, http: Client) -> AuthResult<Self> {
        let auth_url = AuthUrl::new(config.auth_url.clone())
            .map_err(|e| AuthError::ConfigError(format!("Invalid authorization URL: {}", e)))?;
        let token_url = TokenUrl::new(config.token_url.clone())
            .map_err(|e| AuthError::ConfigError(format!("Invalid token URL: {}", e)))?;
        let redirect_url = RedirectUrl::new(config.redirect_url.clone())
            .map_err(|e| AuthError::ConfigError(format!("Invalid redirect URL: {}", e)))?;

        let oauth = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            auth_url,
            Some(token_url),
        )
        .set_redirect_uri(redirect_url);

        Ok(Self {
            oauth,
            http,
            config,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }
}

#[async_trait]
impl OAuthProviderClient for GoogleOAuthClient {
    async fn authorization_url(&self, state: &OAuthState) -> AuthResult<String> {
        let csrf = state.state.clone();
        let mut request = self.oauth.authorize_url(move || CsrfToken::new(csrf));

        for scope in &self.config.scopes {
            request = request.add_scope(Scope::new(scope.clone()));
        }

        if let Some(verifier) = &state.code_verifier {
            let verifier = PkceCodeVerifier::new(verifier.clone());
            request = request.set_pkce_challenge(PkceCodeChallenge::from_code_verifier_sha256(
                &verifier,
            ));
        }

        let (url, _) = request.url();
        Ok(url.to_string())
    }

    #[instrument(skip(self, code, state))]
    async fn exchange_code(&self, code: &str, state: &OAuthState) -> AuthResult<OAuthTokens> {
        debug!("Exchanging authorization code");

        let mut request = self
            .oauth
            .exchange_code(AuthorizationCode::new(code.to_string()));

        if let Some(verifier) = &state.code_verifier {
            request = request.set_pkce_verifier(PkceCodeVerifier::new(verifier.clone()));
        }

        let response = request
            .request_async(async_http_client)
            .await
            .map_err(|e| AuthError::OAuthError(format!("Code exchange failed: {}", e)))?;

        Ok(OAuthTokens {
            access_token: response.access_token().secret().clone(),
            token_type: "Bearer".to_string(),
            expires_in: response.expires_in().map(|d| d.as_secs() as i64),
            refresh_token: response.refresh_token().map(|t| t.secret().clone()),
        })
    }

    #[instrument(skip(self, access_token))]
    async fn get_user_info(&self, access_token: &str) -> AuthResult<OAuthUserInfo> {
        let response = self
            .http
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::OAuthError(format!("User info request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Userinfo request failed with status {}", status.as_u16());
            return Err(AuthError::OAuthError(format!(
                "User info request failed with status {}",
                status.as_u16()
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| AuthError::OAuthError(format!("Failed to parse user info: {}", e)))?;

        OAuthUserInfo::from_json(json)
    }
}
