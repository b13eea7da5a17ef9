use anyhow::Result;
use roost_auth::{
    CredentialVerifier, FederationBridge, GoogleOAuthClient, JwtService, SessionCallbacks,
};
use roost_upstream::{AnalyticsClient, MapsClient};

use crate::config::Config;

/// Application state shared across all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Config,
    /// Signs and checks the session and OAuth state cookies
    pub jwt: JwtService,
    pub verifier: CredentialVerifier,
    pub callbacks: SessionCallbacks,
    pub google: GoogleOAuthClient,
    pub analytics: AnalyticsClient,
    pub maps: MapsClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let http = config.services.http_client()?;
        let api_base_url = config.services.backend.base_url.clone();

        let jwt = JwtService::with_secret(config.secret.clone())?;
        let verifier = CredentialVerifier::new(&api_base_url, http.clone());
        let callbacks = SessionCallbacks::new(FederationBridge::new(&api_base_url, http.clone()));
        let google = GoogleOAuthClient::new(config.oauth.clone(), http.clone())?;

        let analytics = AnalyticsClient::new(config.services.backend.clone(), http.clone());
        let maps = MapsClient::new(config.services.maps.clone(), http);

        Ok(Self {
            config,
            jwt,
            verifier,
            callbacks,
            google,
            analytics,
            maps,
        })
    }

    /// Public base URL of the site
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }
}
