//! Google Maps web services client.
//!
//! Geocoding, Places text search and Distance Matrix. The server-side key is
//! appended to every request; responses are relayed as opaque JSON. Without a
//! key no request is sent.

use crate::config::ServiceEndpoint;
use crate::error::{handle_response, UpstreamError};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument, warn};

const GEOCODE_PATH: &str = "/maps/api/geocode/json";
const PLACES_TEXT_SEARCH_PATH: &str = "/maps/api/place/textsearch/json";
const DISTANCE_MATRIX_PATH: &str = "/maps/api/distancematrix/json";

/// Maps service client.
#[derive(Clone)]
pub struct MapsClient {
    /// HTTP client instance.
    client: Client,

    /// Maps endpoint; `api_key` is the server-side key.
    endpoint: ServiceEndpoint,
}

impl MapsClient {
    /// Create a new maps client.
    pub fn new(endpoint: ServiceEndpoint, client: Client) -> Self {
        if !endpoint.has_auth() {
            warn!("Maps client created without an API key");
        }
        Self { client, endpoint }
    }

    /// Geocode a free-form address.
    #[instrument(skip(self))]
    pub async fn geocode(&self, address: &str) -> Result<Value, UpstreamError> {
        debug!("Geocoding address");
        self.get(GEOCODE_PATH, &[("address", address)]).await
    }

    /// Search places by text query.
    #[instrument(skip(self))]
    pub async fn places_search(&self, query: &str) -> Result<Value, UpstreamError> {
        debug!("Searching places");
        self.get(PLACES_TEXT_SEARCH_PATH, &[("query", query)]).await
    }

    /// Travel distance and time between sets of origins and destinations.
    #[instrument(skip(self))]
    pub async fn distance_matrix(
        &self,
        origins: &str,
        destinations: &str,
        mode: &str,
    ) -> Result<Value, UpstreamError> {
        debug!("Fetching distance matrix");
        self.get(
            DISTANCE_MATRIX_PATH,
            &[
                ("origins", origins),
                ("destinations", destinations),
                ("mode", mode),
            ],
        )
        .await
    }

    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, UpstreamError> {
        let url = self.endpoint.url(path);
        let key = self
            .endpoint
            .api_key
            .as_deref()
            .ok_or(UpstreamError::MissingApiKey("Maps"))?;

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", key)])
            .send()
            .await?;

        handle_response("Maps", response).await
    }
}

impl std::fmt::Debug for MapsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapsClient")
            .field("base_url", &self.endpoint.base_url)
            .field("has_key", &self.endpoint.has_auth())
            .finish()
    }
}
