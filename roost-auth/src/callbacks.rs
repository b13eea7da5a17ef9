//! Session callbacks
//!
//! The callback chain run on every sign-in event and session read. It turns a
//! sign-in (credentials or Google) into a [`SessionToken`] carrying the
//! backend's signed token and user ID, and projects that token into the
//! public [`Session`] payload.
//!
//! [`SessionCallbacks::jwt`] is a function of its arguments: the previous
//! token and the sign-in event, if any. Nothing is kept between calls.

use crate::claims::{format_expiry, Session, SessionToken, SessionUser};
use crate::credentials::VerifiedUser;
use crate::federation::{ExternalIdentityAssertion, FederationBridge};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[cfg(feature = "oauth")]
use crate::oauth::OAuthUserInfo;

/// Sign-in provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// Email/password checked by the backend
    Credentials,
    /// Google OAuth, exchanged for a backend token
    Google,
}

impl Provider {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Credentials => "credentials",
            Provider::Google => "google",
        }
    }

    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "credentials" => Some(Provider::Credentials),
            "google" => Some(Provider::Google),
            _ => None,
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Credentials => "Credentials",
            Provider::Google => "Google",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Account the user signed in with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Provider
    pub provider: Provider,

    /// Account ID at the provider
    pub provider_account_id: String,
}

/// User presented by a sign-in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignInUser {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,

    /// Backend token, already present for credentials sign-ins
    pub token: Option<String>,
}

impl From<VerifiedUser> for SignInUser {
    fn from(user: VerifiedUser) -> Self {
        Self {
            id: user.id,
            email: Some(user.email),
            name: Some(user.name),
            image: None,
            token: Some(user.token),
        }
    }
}

/// A sign-in event: account plus user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignIn {
    pub account: Account,
    pub user: SignInUser,
}

impl SignIn {
    /// Sign-in with credentials the backend accepted.
    pub fn credentials(user: VerifiedUser) -> Self {
        Self {
            account: Account {
                provider: Provider::Credentials,
                provider_account_id: user.id.clone(),
            },
            user: user.into(),
        }
    }

    /// Sign-in through Google.
    #[cfg(feature = "oauth")]
    pub fn google(info: &OAuthUserInfo) -> Self {
        Self {
            account: Account {
                provider: Provider::Google,
                provider_account_id: info.provider_id.clone(),
            },
            user: SignInUser {
                id: info.provider_id.clone(),
                email: info.email.clone(),
                name: info.name.clone(),
                image: info.picture.clone(),
                token: None,
            },
        }
    }

    fn assertion(&self) -> ExternalIdentityAssertion {
        let email = self.user.email.clone().unwrap_or_default();
        ExternalIdentityAssertion {
            name: self.user.name.clone().unwrap_or_else(|| email.clone()),
            email,
            google_id: self.account.provider_account_id.clone(),
            image: self.user.image.clone(),
        }
    }
}

/// Sign-in callback chain.
#[derive(Debug, Clone)]
pub struct SessionCallbacks {
    bridge: FederationBridge,
}

impl SessionCallbacks {
    /// Create the callbacks around a federation bridge.
    pub fn new(bridge: FederationBridge) -> Self {
        Self { bridge }
    }

    /// Decide whether a sign-in may proceed.
    ///
    /// Credentials sign-ins need a backend token. Google sign-ins always
    /// proceed; a failed backend exchange only leaves the token empty.
    pub fn sign_in(&self, event: &SignIn) -> bool {
        match event.account.provider {
            Provider::Credentials => event
                .user
                .token
                .as_deref()
                .is_some_and(|t| !t.is_empty()),
            Provider::Google => true,
        }
    }

    /// Fold a sign-in event into the session token.
    ///
    /// Without an event (a later request on an existing session) the previous
    /// token is returned unchanged.
    pub async fn jwt(&self, prior: SessionToken, event: Option<SignIn>) -> SessionToken {
        let event = match event {
            Some(event) => event,
            None => return prior,
        };

        let mut token = SessionToken {
            jwt: None,
            user_id: None,
            name: event.user.name.clone(),
            email: event.user.email.clone(),
            picture: event.user.image.clone(),
        };

        match event.account.provider {
            Provider::Google => {
                match self.bridge.exchange(&event.assertion()).await {
                    Ok(grant) => {
                        token.user_id = Some(
                            grant
                                .id
                                .unwrap_or_else(|| event.account.provider_account_id.clone()),
                        );
                        token.jwt = Some(grant.token);
                        info!("Google sign-in linked to backend user");
                    }
                    Err(e) => {
                        warn!("Google sign-in without backend token: {}", e);
                    }
                }
            }
            Provider::Credentials => {
                token.jwt = event.user.token.filter(|t| !t.is_empty());
                token.user_id = Some(event.user.id);
                debug!("Credentials sign-in folded into session");
            }
        }

        token
    }

    /// Project a session token onto the public session payload.
    pub fn session(&self, token: &SessionToken, expires: DateTime<Utc>) -> Session {
        Session {
            user: SessionUser {
                name: token.name.clone(),
                email: token.email.clone(),
                image: token.picture.clone(),
            },
            expires: format_expiry(expires),
            jwt: token.jwt.clone(),
            user_id: token.user_id.clone(),
        }
    }
}
