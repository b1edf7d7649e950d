//! Handler for app registration.

use axum::{Json, extract::State};
use validator::Validate;

use crate::api::dto::ApiResponse;
use crate::api::dto::app::{AppResponse, RegisterAppRequest};
use crate::error::AppError;
use crate::state::AppState;

/// Registers a client app and returns its bearer token.
///
/// # Endpoint
///
/// `POST /api/app/register`
///
/// # Request Body
///
/// ```json
/// { "name": "music", "base_url": "https://music.example.com" }
/// ```
///
/// Registering the same (name, base_url) pair again returns the existing app
/// and token.
///
/// # Errors
///
/// Returns 400 Bad Request if validation fails.
pub async fn register_app_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterAppRequest>,
) -> Result<ApiResponse<AppResponse>, AppError> {
    payload.validate()?;

    let app = state
        .app_service
        .register(payload.name.trim(), &payload.base_url)
        .await?;

    Ok(ApiResponse::created(AppResponse::from(app)).message("App registered successfully"))
}
