//! # Roost Web
//!
//! HTTP server for the Roost booking site. Serves the sign-in surface under
//! `/api/auth` and relays review and map requests to their upstream services.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

pub mod api;
pub mod config;
pub mod cookies;
pub mod error;
pub mod state;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Sign-in surface
        .route("/api/auth/providers", get(api::auth::providers))
        .route("/api/auth/csrf", get(api::auth::csrf_token))
        .route(
            "/api/auth/callback/credentials",
            post(api::auth::credentials_callback),
        )
        .route("/api/auth/signin/google", get(api::auth::google_sign_in))
        .route("/api/auth/callback/google", get(api::auth::google_callback))
        .route("/api/auth/session", get(api::auth::session))
        .route("/api/auth/signout", post(api::auth::sign_out))

        // Reviews
        .route(
            "/api/analytics/review/{property_id}",
            post(api::reviews::add_review),
        )
        .route(
            "/api/analytics/reviews/property/{property_id}",
            get(api::reviews::property_reviews),
        )

        // Maps
        .route("/api/geocode", get(api::maps::geocode))
        .route("/api/places/search", get(api::maps::places_search))
        .route("/api/distance-matrix", get(api::maps::distance_matrix))

        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .with_state(state)
}
