//! Upstream call outcomes.
//!
//! Every failure keeps its cause. The web layer logs it and only then
//! collapses it to a public message.

use thiserror::Error;

/// Upstream client errors.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The upstream answered with a non-success status.
    #[error("Upstream error ({status}): {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, or a placeholder when it could not be read.
        message: String,
    },

    /// The request never produced a response.
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The upstream answered with a body that is not JSON.
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    /// The endpoint needs a key that is not configured.
    #[error("{0} API key is not configured")]
    MissingApiKey(&'static str),
}

impl UpstreamError {
    /// Upstream status code, if the upstream answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Status { .. } => "status",
            UpstreamError::Network(e) if e.is_timeout() => "timeout",
            UpstreamError::Network(_) => "network",
            UpstreamError::InvalidResponse(_) => "invalid_response",
            UpstreamError::MissingApiKey(_) => "missing_api_key",
        }
    }
}

/// Convert an upstream response into parsed JSON, or a typed error.
pub(crate) async fn handle_response<T>(
    service: &str,
    response: reqwest::Response,
) -> Result<T, UpstreamError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let status = response.status();

    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::warn!("{} API error ({}): {}", service, status.as_u16(), message);
        return Err(UpstreamError::Status {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|e| UpstreamError::InvalidResponse(e.to_string()))
}
