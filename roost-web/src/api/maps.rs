//! Google Maps endpoints. The API key stays on the server.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GeocodeParams {
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlacesParams {
    pub query: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DistanceMatrixParams {
    pub origins: Option<String>,
    pub destinations: Option<String>,
    pub mode: Option<String>,
}

pub async fn geocode(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GeocodeParams>,
) -> ApiResult<Json<Value>> {
    let address = required(params.address)
        .ok_or(ApiError::MissingParameters("Address parameter is required"))?;

    let body = state
        .maps
        .geocode(&address)
        .await
        .map_err(ApiError::upstream("Failed to fetch geocode data"))?;
    Ok(Json(body))
}

pub async fn places_search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PlacesParams>,
) -> ApiResult<Json<Value>> {
    let query = required(params.query)
        .ok_or(ApiError::MissingParameters("Query parameter is required"))?;

    let body = state
        .maps
        .places_search(&query)
        .await
        .map_err(ApiError::upstream("Failed to fetch places"))?;
    Ok(Json(body))
}

pub async fn distance_matrix(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DistanceMatrixParams>,
) -> ApiResult<Json<Value>> {
    let (Some(origins), Some(destinations), Some(mode)) = (
        required(params.origins),
        required(params.destinations),
        required(params.mode),
    ) else {
        return Err(ApiError::MissingParameters(
            "origins, destinations, and mode parameters are required",
        ));
    };

    let body = state
        .maps
        .distance_matrix(&origins, &destinations, &mode)
        .await
        .map_err(ApiError::upstream("Failed to fetch distance matrix"))?;
    Ok(Json(body))
}

fn required(param: Option<String>) -> Option<String> {
    param.filter(|p| !p.is_empty())
}
