//! Service configuration for the upstream clients.
//!
//! Provides centralized configuration for the booking backend and the Google
//! Maps web services. Configuration is loaded from environment variables with
//! defaults suitable for local development.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default booking backend URL.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

/// Default Google Maps web services URL.
pub const DEFAULT_MAPS_BASE_URL: &str = "https://maps.googleapis.com";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required environment variable.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Service configuration for all upstream services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Booking backend configuration.
    pub backend: ServiceEndpoint,

    /// Google Maps web services configuration.
    pub maps: ServiceEndpoint,

    /// Request timeout in seconds. `None` waits for as long as the upstream takes.
    pub timeout_secs: Option<u64>,
}

impl Default for ServiceConfig {
    /// Returns default configuration suitable for local development.
    fn default() -> Self {
        Self {
            backend: ServiceEndpoint {
                base_url: DEFAULT_API_BASE_URL.to_string(),
                api_key: None,
            },
            maps: ServiceEndpoint {
                base_url: DEFAULT_MAPS_BASE_URL.to_string(),
                api_key: None,
            },
            timeout_secs: None,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `NEXT_PUBLIC_API_BASE_URL`: booking backend URL (default: http://localhost:5000)
    /// - `NEXT_PUBLIC_GOOGLE_PLACES_API_KEY`: Google Maps web services key
    /// - `GOOGLE_MAPS_API_URL`: Google Maps base URL (default: https://maps.googleapis.com)
    /// - `UPSTREAM_TIMEOUT_SECS`: request timeout in seconds (default: none)
    pub fn from_env() -> Result<Self, ConfigError> {
        let default = Self::default();

        let timeout_secs = match std::env::var("UPSTREAM_TIMEOUT_SECS") {
            Ok(raw) => Some(raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "UPSTREAM_TIMEOUT_SECS".to_string(),
                message: format!("expected a number of seconds, got {:?}", raw),
            })?),
            Err(_) => default.timeout_secs,
        };

        Ok(Self {
            backend: ServiceEndpoint {
                base_url: std::env::var("NEXT_PUBLIC_API_BASE_URL")
                    .unwrap_or(default.backend.base_url),
                api_key: None,
            },
            maps: ServiceEndpoint {
                base_url: std::env::var("GOOGLE_MAPS_API_URL").unwrap_or(default.maps.base_url),
                api_key: std::env::var("NEXT_PUBLIC_GOOGLE_PLACES_API_KEY")
                    .ok()
                    .filter(|k| !k.is_empty()),
            },
            timeout_secs,
        })
    }

    /// Get the request timeout as a Duration, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Build the shared HTTP client.
    pub fn http_client(&self) -> Result<Client, ConfigError> {
        let mut builder = Client::builder();
        if let Some(timeout) = self.timeout() {
            builder = builder.timeout(timeout);
        }

        builder.build().map_err(|e| ConfigError::InvalidValue {
            key: "http_client".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate that all required configuration is present for production.
    ///
    /// The map endpoints cannot work without an API key.
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        if self.maps.api_key.is_none() {
            return Err(ConfigError::MissingEnvVar(
                "NEXT_PUBLIC_GOOGLE_PLACES_API_KEY".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for a single service endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    /// Base URL for the service (e.g., "https://api.roost.example").
    pub base_url: String,

    /// API key passed as a query parameter (Google) where the service needs one.
    pub api_key: Option<String>,
}

impl ServiceEndpoint {
    /// Build a full URL by appending a path to the base URL.
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Check if API key authentication is available.
    pub fn has_auth(&self) -> bool {
        self.api_key.is_some()
    }
}
