use anyhow::{Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use roost_auth::{OAuthConfig, RedirectPolicy};
use roost_upstream::ServiceConfig;
use std::net::SocketAddr;

/// Server configuration
#[derive(Clone)]
pub struct Config {
    /// Address to bind the server to
    pub bind_address: SocketAddr,

    /// Public base URL of the site, without a trailing slash
    pub base_url: String,

    /// Secret signing the session, state and CSRF cookies
    pub secret: String,

    /// Google OAuth client settings
    pub oauth: OAuthConfig,

    /// Where sign-in redirects may go
    pub redirects: RedirectPolicy,

    /// Booking backend and Google Maps endpoints
    pub services: ServiceConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let bind_address = std::env::var("BIND_ADDRESS")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .context("BIND_ADDRESS must be a socket address")?;

        let base_url = std::env::var("NEXTAUTH_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        url::Url::parse(&base_url).context("NEXTAUTH_URL must be an absolute URL")?;
        let base_url = base_url.trim_end_matches('/').to_string();

        let secret = match std::env::var("NEXTAUTH_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!(
                    "NEXTAUTH_SECRET is not set; sessions will not survive a restart"
                );
                ephemeral_secret()
            }
        };

        let client_id = required_env("GOOGLE_CLIENT_ID")?;
        let client_secret = required_env("GOOGLE_CLIENT_SECRET")?;
        let oauth = OAuthConfig::google(
            client_id,
            client_secret,
            format!("{}/api/auth/callback/google", base_url),
        );

        let redirects = match std::env::var("ROOST_ALLOW_EXTERNAL_REDIRECTS") {
            Ok(v) if matches!(v.to_ascii_lowercase().as_str(), "false" | "0" | "no") => {
                RedirectPolicy::same_origin_only()
            }
            _ => RedirectPolicy::default(),
        };

        let services = ServiceConfig::from_env()?;
        if let Err(e) = services.validate_for_production() {
            tracing::warn!("Map endpoints will fail: {}", e);
        }

        Ok(Config {
            bind_address,
            base_url,
            secret,
            oauth,
            redirects,
            services,
        })
    }

    /// Cookies carry `Secure` when the site is served over TLS
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("base_url", &self.base_url)
            .field("google_client_id", &self.oauth.client_id)
            .field("redirects", &self.redirects)
            .field("services", &self.services)
            .finish_non_exhaustive()
    }
}

/// A variable that must be set to a non-empty value.
fn required_env(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("{} environment variable required", name))
}

fn ephemeral_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
