//! # Roost Authentication
//!
//! Sign-in protocol and session tokens for the Roost booking site.
//!
//! ## Overview
//!
//! The roost-auth crate handles:
//! - **Credentials**: email/password checked against the booking backend
//! - **Federation**: Google sign-in exchanged for a backend-issued token
//! - **Callbacks**: folding either sign-in into a session token `{jwt, userId}`
//! - **Redirects**: where the browser lands after a sign-in attempt
//! - **Client identity**: unverified decode of a stored token's user ID
//! - **Cookies**: signed session and OAuth state cookies, CSRF tokens
//!
//! ## Features
//!
//! - `jwt` (default): signed cookies using jsonwebtoken
//! - `oauth` (default): Google OAuth 2.0 using the oauth2 crate
//!
//! ## Usage
//!
//! ### Credentials sign-in
//!
//! ```rust,no_run
//! use roost_auth::{CredentialVerifier, Credentials, FederationBridge, SessionCallbacks, SessionToken, SignIn};
//!
//! async fn sign_in(api_base: &str) {
//!     let http = reqwest::Client::new();
//!     let verifier = CredentialVerifier::new(api_base, http.clone());
//!     let callbacks = SessionCallbacks::new(FederationBridge::new(api_base, http));
//!
//!     let credentials = Credentials::new("guest@example.com", "secret");
//!     if let Some(user) = verifier.authorize(&credentials).await {
//!         let token = callbacks
//!             .jwt(SessionToken::default(), Some(SignIn::credentials(user)))
//!             .await;
//!         assert!(token.is_authenticated());
//!     }
//! }
//! ```
//!
//! ### Client identity
//!
//! ```rust
//! use roost_auth::extract_user_id_from_token;
//!
//! // payload segment is base64url of {"_id":"abc123"}
//! let token = "eyJhbGciOiJIUzI1NiJ9.eyJfaWQiOiJhYmMxMjMifQ.sig";
//! assert_eq!(extract_user_id_from_token(token), Some("abc123".to_string()));
//! assert_eq!(extract_user_id_from_token("garbage"), None);
//! ```
//!
//! The decoded ID is never proof of identity. It is for personalisation only.

pub mod backend;
pub mod callbacks;
pub mod claims;
pub mod credentials;
pub mod csrf;
pub mod error;
pub mod federation;
pub mod identity;
#[cfg(feature = "jwt")]
pub mod jwt;
#[cfg(feature = "oauth")]
pub mod oauth;
pub mod redirect;

// Re-export main types
pub use callbacks::{Account, Provider, SessionCallbacks, SignIn, SignInUser};
pub use claims::{Session, SessionClaims, SessionToken, SessionUser};
pub use credentials::{CredentialVerifier, Credentials, VerifiedUser};
pub use error::{AuthError, AuthResult};
pub use federation::{ExternalIdentityAssertion, FederatedGrant, FederationBridge};
pub use identity::{
    extract_user_id_from_token, ClientIdentity, MemoryTokenStore, TokenStore, AUTH_TOKEN_KEY,
};
pub use redirect::{RedirectDecision, RedirectPolicy};

#[cfg(feature = "jwt")]
pub use jwt::{JwtAlgorithm, JwtConfig, JwtService};

#[cfg(feature = "oauth")]
pub use oauth::{
    GoogleOAuthClient, OAuthConfig, OAuthProviderClient, OAuthState, OAuthTokens, OAuthUserInfo,
    StateClaims,
};
