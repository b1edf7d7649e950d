//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /`                  - Liveness text
//! - `GET  /health`            - Record store connectivity
//! - `POST /api/app/register`  - App registration (public)
//! - `/urls/*`                 - Short URL API
//! - `/api/shorten/*`          - Same short URL API under its legacy prefix
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Authentication** - App token on short URL mutations
//! - **Error details** - Diagnostics on failure envelopes outside production
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, liveness_handler};
use crate::api::middleware::{error_details, tracing};
use crate::state::AppState;
use axum::{Router, middleware};
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Builds the router with all routes and middleware, without path normalization.
pub fn router(state: AppState) -> Router {
    let url_routes = api::routes::url_routes(state.clone());

    Router::new()
        .route("/", get(liveness_handler))
        .route("/health", get(health_handler))
        .nest("/api/app", api::routes::app_routes())
        .nest("/urls", url_routes.clone())
        .nest("/api/shorten", url_routes)
        .layer(middleware::from_fn_with_state(state.clone(), error_details::layer))
        .with_state(state)
        .layer(tracing::layer())
}

/// Constructs the application router with trailing slashes trimmed.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}
