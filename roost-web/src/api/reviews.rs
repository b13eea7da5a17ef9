//! Review endpoints relayed to the booking backend.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::header::CACHE_CONTROL,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use roost_auth::{ClientIdentity, TokenStore};
use serde_json::Value;
use std::sync::Arc;

use crate::cookies::{RequestCookies, AUTH_TOKEN_COOKIE};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Submit a review. Needs the `auth_Token` cookie and a body with `rating`
/// and `comment`; the body is forwarded unchanged.
pub async fn add_review(
    State(state): State<Arc<AppState>>,
    Path(property_id): Path<String>,
    jar: CookieJar,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let cookies = RequestCookies(&jar);
    let token = cookies.get(AUTH_TOKEN_COOKIE).ok_or(ApiError::Unauthorized)?;

    let review: Value = serde_json::from_slice(&body)
        .map_err(|_| ApiError::MissingParameters("Rating and comment are required"))?;
    if !is_truthy(&review["rating"]) || !is_truthy(&review["comment"]) {
        return Err(ApiError::MissingParameters("Rating and comment are required"));
    }

    // unverified, log context only
    let user_id = ClientIdentity::current(&cookies).map(|identity| identity.user_id);
    tracing::debug!(property_id = %property_id, user_id = ?user_id, "Forwarding review");

    let created = state
        .analytics
        .add_review(&property_id, &token, &review)
        .await
        .map_err(ApiError::upstream("Failed to add review"))?;

    Ok(Json(created))
}

/// List the reviews of a property. Never cached.
pub async fn property_reviews(
    State(state): State<Arc<AppState>>,
    Path(property_id): Path<String>,
) -> impl IntoResponse {
    let result = state
        .analytics
        .property_reviews(&property_id)
        .await
        .map(Json)
        .map_err(ApiError::upstream("Failed to fetch reviews"));

    ([(CACHE_CONTROL, "no-store")], result)
}

/// Missing, null, false, zero and empty strings all count as absent.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
