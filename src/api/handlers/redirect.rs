//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::Redirect,
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its resolved target.
///
/// # Endpoint
///
/// `GET /urls/redirect/{short_code}`
///
/// # Target
///
/// Entity-based records redirect into the owning app's `base_url`; otherwise
/// the stored `original_url` is used. `extra_params` are appended as query
/// parameters. See [`crate::domain::entities::ShortUrl::redirect_target`].
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
/// Returns 410 Gone if the record is past its expiration date.
pub async fn redirect_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    let target = state.url_service.redirect(&short_code).await?;

    Ok(Redirect::temporary(&target.url))
}
