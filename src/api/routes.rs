//! API route configuration.
//!
//! Short URL reads and redirects are public. Mutations require an app token
//! via [`crate::api::middleware::auth`].

use crate::api::handlers::{
    create_url_handler, delete_url_by_code_handler, delete_url_by_id_handler,
    get_url_by_code_handler, get_url_by_id_handler, list_urls_handler, redirect_handler,
    register_app_handler, update_url_by_code_handler, update_url_by_id_handler,
    url_stats_handler,
};
use crate::api::middleware::auth;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post, put},
};

/// Public short URL routes.
///
/// # Endpoints
///
/// - `GET /`                         - List all short URLs (newest first)
/// - `GET /stats`                    - Total / active / expired counts
/// - `GET /{id}`                     - Fetch by id
/// - `GET /code/{short_code}`        - Fetch by short code, with owning app
/// - `GET /redirect/{short_code}`    - 307 to the resolved target
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_urls_handler))
        .route("/stats", get(url_stats_handler))
        .route("/{id}", get(get_url_by_id_handler))
        .route("/code/{short_code}", get(get_url_by_code_handler))
        .route("/redirect/{short_code}", get(redirect_handler))
}

/// Short URL mutations, scoped to the authenticated app.
///
/// # Endpoints
///
/// - `POST   /`                      - Create a short URL
/// - `PUT    /{id}`                  - Update by id
/// - `DELETE /{id}`                  - Delete by id
/// - `PUT    /short/{short_code}`    - Update by short code
/// - `DELETE /short/{short_code}`    - Delete by short code
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_url_handler))
        .route(
            "/{id}",
            put(update_url_by_id_handler).delete(delete_url_by_id_handler),
        )
        .route(
            "/short/{short_code}",
            put(update_url_by_code_handler).delete(delete_url_by_code_handler),
        )
}

/// Public and protected short URL routes combined.
pub fn url_routes(state: AppState) -> Router<AppState> {
    protected_routes()
        .route_layer(middleware::from_fn_with_state(state, auth::layer))
        .merge(public_routes())
}

/// `POST /register` - register an app and receive its token.
pub fn app_routes() -> Router<AppState> {
    Router::new().route("/register", post(register_app_handler))
}
