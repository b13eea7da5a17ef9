use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use roost_auth::AuthError;
use roost_upstream::UpstreamError;
use serde::Serialize;

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    /// A required parameter is missing; the message is shown as is
    #[error("{0}")]
    MissingParameters(&'static str),

    /// An upstream call failed; only `message` reaches the browser
    #[error("{message}: {source}")]
    Upstream {
        message: &'static str,
        #[source]
        source: UpstreamError,
    },

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Wrap an upstream failure behind a public message
    pub fn upstream(message: &'static str) -> impl FnOnce(UpstreamError) -> Self {
        move |source| ApiError::Upstream { message, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::MissingParameters(msg) => (StatusCode::BAD_REQUEST, msg.to_string()),
            ApiError::Upstream { message, source } => {
                tracing::error!(
                    kind = source.kind(),
                    upstream_status = ?source.status(),
                    "{}: {}",
                    message,
                    source
                );
                (StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
            }
            ApiError::Auth(err) => {
                if err.is_server_error() {
                    tracing::error!("Auth error: {}", err);
                } else {
                    tracing::warn!("Auth error: {}", err);
                }
                let status = StatusCode::from_u16(err.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, err.error_code().to_string())
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
