//! App token authentication middleware.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use serde_json::json;

use crate::{error::AppError, state::AppState};

/// Header carrying the app token, checked before `Authorization`.
pub const APP_TOKEN_HEADER: &str = "x-app-token";

/// Authenticates requests by app token and attaches the resolved
/// [`crate::domain::entities::App`] to the request extensions.
///
/// # Header Format
///
/// ```text
/// x-app-token: <token>
/// Authorization: Bearer <token>
/// ```
///
/// `x-app-token` wins when both are present.
///
/// # Errors
///
/// Returns `401 Unauthorized` if no token is supplied or it matches no app.
///
/// # Example
///
/// ```rust,ignore
/// let protected = Router::new()
///     .route("/", post(create_url_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let token = extract_token(&mut parts).await?;
    let app = st.app_service.authenticate(&token).await?;

    tracing::debug!(app_id = app.id, "Request authenticated");

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(app);

    Ok(next.run(req).await)
}

async fn extract_token(parts: &mut Parts) -> Result<String, AppError> {
    if let Some(value) = parts.headers.get(APP_TOKEN_HEADER) {
        return value
            .to_str()
            .ok()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::unauthorized(
                    "Unauthorized",
                    json!({ "reason": "x-app-token header is empty or invalid" }),
                )
            });
    }

    let AuthBearer(token) = AuthBearer::from_request_parts(parts, &())
        .await
        .map_err(|_| {
            AppError::unauthorized(
                "Unauthorized",
                json!({ "reason": "App token is missing" }),
            )
        })?;

    Ok(token)
}
