//! Booking backend analytics client.
//!
//! Review submission and listing for a property. Bodies are relayed as
//! opaque JSON in both directions.

use crate::config::ServiceEndpoint;
use crate::error::{handle_response, UpstreamError};
use reqwest::header::CACHE_CONTROL;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};

/// Reviews service client.
#[derive(Clone)]
pub struct AnalyticsClient {
    /// HTTP client instance.
    client: Client,

    /// Booking backend endpoint.
    endpoint: ServiceEndpoint,
}

impl AnalyticsClient {
    /// Create a new analytics client.
    pub fn new(endpoint: ServiceEndpoint, client: Client) -> Self {
        Self { client, endpoint }
    }

    /// Submit a review on behalf of the bearer.
    ///
    /// The body is forwarded unchanged.
    #[instrument(skip(self, bearer, review), fields(property_id = %property_id))]
    pub async fn add_review(
        &self,
        property_id: &str,
        bearer: &str,
        review: &Value,
    ) -> Result<Value, UpstreamError> {
        debug!("Submitting review for property {}", property_id);

        let url = self
            .endpoint
            .url(&format!("/api/analytics/review/{}", property_id));
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", bearer))
            .json(review)
            .send()
            .await?;

        handle_response("Analytics", response).await
    }

    /// List the reviews of a property, bypassing any cache.
    #[instrument(skip(self), fields(property_id = %property_id))]
    pub async fn property_reviews(&self, property_id: &str) -> Result<Value, UpstreamError> {
        debug!("Fetching reviews for property {}", property_id);

        let url = self
            .endpoint
            .url(&format!("/api/analytics/reviews/property/{}", property_id));
        let response = self
            .client
            .get(&url)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await?;

        handle_response("Analytics", response).await
    }
}

impl std::fmt::Debug for AnalyticsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsClient")
            .field("base_url", &self.endpoint.base_url)
            .finish()
    }
}
