//! DTOs for app registration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::App;

/// Request body for `POST /api/app/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterAppRequest {
    #[validate(length(min = 2, message = "App name must be at least 2 characters"))]
    pub name: String,

    #[validate(url(message = "Base URL must be a valid URL"))]
    pub base_url: String,
}

/// Registered app, including its bearer token.
#[derive(Debug, Serialize)]
pub struct AppResponse {
    pub id: i64,
    pub name: String,
    pub base_url: String,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

impl From<App> for AppResponse {
    fn from(app: App) -> Self {
        AppResponse {
            id: app.id,
            name: app.name,
            base_url: app.base_url,
            token: app.token,
            created_at: app.created_at,
        }
    }
}
