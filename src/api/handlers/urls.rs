//! Handlers for short URL management endpoints.
//!
//! Reads are public. Create, update and delete run behind
//! [`crate::api::middleware::auth`], which supplies the calling [`App`].

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::ApiResponse;
use crate::api::dto::url::{
    CreateShortUrlRequest, CreatedShortUrlResponse, ShortUrlResponse, StatsResponse,
    UpdateShortUrlRequest,
};
use crate::domain::entities::App;
use crate::error::AppError;
use crate::state::AppState;

fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>().map_err(|_| {
        AppError::bad_request("Invalid id", json!({ "id": raw, "reason": "Expected an integer" }))
    })
}

/// Lists all short URLs, newest first.
///
/// `GET /urls`
pub async fn list_urls_handler(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<ShortUrlResponse>>, AppError> {
    let urls: Vec<ShortUrlResponse> = state
        .url_service
        .get_all()
        .await?
        .into_iter()
        .map(ShortUrlResponse::from)
        .collect();

    let count = urls.len();
    Ok(ApiResponse::ok(urls).count(count))
}

/// Total, active and expired record counts.
///
/// `GET /urls/stats`
pub async fn url_stats_handler(
    State(state): State<AppState>,
) -> Result<ApiResponse<StatsResponse>, AppError> {
    let stats = state.url_service.stats().await?;
    Ok(ApiResponse::ok(stats.into()))
}

/// `GET /urls/{id}`
pub async fn get_url_by_id_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<ApiResponse<ShortUrlResponse>, AppError> {
    let url = state.url_service.get_by_id(parse_id(&id)?).await?;
    Ok(ApiResponse::ok(url.into()))
}

/// Returns a record with its owning app's `app_name` and `base_url`.
///
/// `GET /urls/code/{short_code}`
pub async fn get_url_by_code_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<ApiResponse<ShortUrlResponse>, AppError> {
    let url = state.url_service.get_by_short_code(&short_code).await?;
    Ok(ApiResponse::ok(url.into()))
}

/// Creates a short URL owned by the authenticated app.
///
/// # Endpoint
///
/// `POST /urls`
///
/// # Request Body
///
/// ```json
/// {
///   "entity_type": "artist",
///   "entity_id": "abc123",
///   "short_code": "promo1",                        // optional
///   "user_code": "campaign-42",                    // optional
///   "extra_params": { "utm_source": "share" },     // optional
///   "expiration_date": "2030-01-01T00:00:00Z"      // optional
/// }
/// ```
///
/// # Response
///
/// `201 Created` with the new record's `short_code` and composed `short_url`.
///
/// # Errors
///
/// Returns 400 Bad Request if validation fails.
/// Returns 409 Conflict if the short code or user code is taken.
pub async fn create_url_handler(
    State(state): State<AppState>,
    Extension(app): Extension<App>,
    Json(payload): Json<CreateShortUrlRequest>,
) -> Result<ApiResponse<CreatedShortUrlResponse>, AppError> {
    payload.validate()?;

    let created = state.url_service.create(payload.into(), &app).await?;

    Ok(ApiResponse::created(created.into()).message("Short URL created successfully"))
}

/// `PUT /urls/{id}`
///
/// # Errors
///
/// 404 if absent, 403 if owned by another app, 409 if the new short code is taken.
pub async fn update_url_by_id_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Extension(app): Extension<App>,
    Json(payload): Json<UpdateShortUrlRequest>,
) -> Result<ApiResponse<ShortUrlResponse>, AppError> {
    let id = parse_id(&id)?;
    payload.validate()?;

    let updated = state
        .url_service
        .update_by_id(id, payload.into(), &app)
        .await?;

    Ok(ApiResponse::ok(updated.into()).message("Short URL updated successfully"))
}

/// `PUT /urls/short/{short_code}`
pub async fn update_url_by_code_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
    Extension(app): Extension<App>,
    Json(payload): Json<UpdateShortUrlRequest>,
) -> Result<ApiResponse<ShortUrlResponse>, AppError> {
    payload.validate()?;

    let updated = state
        .url_service
        .update_by_short_code(&short_code, payload.into(), &app)
        .await?;

    Ok(ApiResponse::ok(updated.into()).message("Short URL updated successfully"))
}

/// `DELETE /urls/{id}`
pub async fn delete_url_by_id_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Extension(app): Extension<App>,
) -> Result<ApiResponse<()>, AppError> {
    state.url_service.delete_by_id(parse_id(&id)?, &app).await?;
    Ok(ApiResponse::message_only("Short URL deleted successfully"))
}

/// `DELETE /urls/short/{short_code}`
pub async fn delete_url_by_code_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
    Extension(app): Extension<App>,
) -> Result<ApiResponse<()>, AppError> {
    state
        .url_service
        .delete_by_short_code(&short_code, &app)
        .await?;
    Ok(ApiResponse::message_only("Short URL deleted successfully"))
}
