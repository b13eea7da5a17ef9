//! # Roost Upstream
//!
//! Typed HTTP clients for the services the Roost web tier relays to:
//!
//! - [`AnalyticsClient`]: property reviews on the booking backend
//! - [`MapsClient`]: Google geocoding, places text search, distance matrix
//!
//! Both relay JSON unchanged. Failures come back as [`UpstreamError`] so the
//! caller can tell a non-success status from a network failure before
//! deciding what to show the browser.
//!
//! ```rust,no_run
//! use roost_upstream::{MapsClient, ServiceConfig};
//!
//! async fn lookup() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServiceConfig::from_env()?;
//!     let maps = MapsClient::new(config.maps.clone(), config.http_client()?);
//!     let body = maps.geocode("1600 Amphitheatre Parkway").await?;
//!     println!("{}", body["status"]);
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod config;
pub mod error;
pub mod maps;

pub use analytics::AnalyticsClient;
pub use config::{ConfigError, ServiceConfig, ServiceEndpoint};
pub use error::UpstreamError;
pub use maps::MapsClient;
