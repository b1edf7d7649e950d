//! DTOs for short URL endpoints.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::sync::LazyLock;
use validator::{Validate, ValidationError};

use crate::application::services::{CreateShortUrl, CreatedShortUrl, UrlStats};
use crate::domain::entities::{ExtraParams, ShortUrl, ShortUrlPatch};

/// Caller-supplied short codes: ASCII letters and digits only.
static SHORT_CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9A-Za-z]+$").unwrap());

fn validate_future_date(date: &DateTime<Utc>) -> Result<(), ValidationError> {
    if *date <= Utc::now() {
        return Err(ValidationError::new("future_date")
            .with_message("expiration_date must be in the future".into()));
    }
    Ok(())
}

/// Request body for `POST /urls`.
///
/// Either `entity_type` + `entity_id` or `original_url` must be present;
/// that rule is enforced by the service.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateShortUrlRequest {
    /// Optional explicit short code, 3-10 alphanumeric characters.
    #[validate(length(min = 3, max = 10, message = "short_code must be 3-10 characters"))]
    #[validate(regex(path = "*SHORT_CODE_REGEX", message = "short_code must be alphanumeric"))]
    pub short_code: Option<String>,

    #[validate(length(min = 1, max = 128))]
    pub user_code: Option<String>,

    #[validate(url(message = "original_url must be a valid URL"))]
    pub original_url: Option<String>,

    #[validate(length(min = 1, max = 64))]
    pub entity_type: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub entity_id: Option<String>,

    #[validate(length(min = 1, max = 2048))]
    pub redirect_path: Option<String>,

    #[validate(length(min = 1, max = 64))]
    pub product_type: Option<String>,

    /// Opaque query parameters appended to the redirect target.
    #[serde(default)]
    pub extra_params: ExtraParams,

    #[validate(custom(function = "validate_future_date"))]
    pub expiration_date: Option<DateTime<Utc>>,
}

impl From<CreateShortUrlRequest> for CreateShortUrl {
    fn from(req: CreateShortUrlRequest) -> Self {
        CreateShortUrl {
            short_code: req.short_code,
            original_url: req.original_url,
            entity_type: req.entity_type,
            entity_id: req.entity_id,
            redirect_path: req.redirect_path,
            product_type: req.product_type,
            user_code: req.user_code,
            extra_params: req.extra_params,
            expiration_date: req.expiration_date,
        }
    }
}

/// Request body for `PUT /urls/{id}` and `PUT /urls/short/{short_code}`.
///
/// All fields are optional; only provided fields are changed.
///
/// # `expiration_date` semantics
///
/// - **Absent** → leave existing value unchanged
/// - **`null`** → clear expiry
/// - **Timestamp** → set new expiry (must be in the future)
#[serde_as]
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateShortUrlRequest {
    #[validate(length(min = 3, max = 10, message = "short_code must be 3-10 characters"))]
    #[validate(regex(path = "*SHORT_CODE_REGEX", message = "short_code must be alphanumeric"))]
    pub short_code: Option<String>,

    #[validate(length(min = 1, max = 128))]
    pub user_code: Option<String>,

    #[validate(url(message = "original_url must be a valid URL"))]
    pub original_url: Option<String>,

    #[validate(length(min = 1, max = 64))]
    pub entity_type: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub entity_id: Option<String>,

    #[validate(length(min = 1, max = 2048))]
    pub redirect_path: Option<String>,

    #[validate(length(min = 1, max = 64))]
    pub product_type: Option<String>,

    pub extra_params: Option<ExtraParams>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    #[validate(custom(function = "validate_future_date"))]
    pub expiration_date: Option<Option<DateTime<Utc>>>,
}

impl From<UpdateShortUrlRequest> for ShortUrlPatch {
    fn from(req: UpdateShortUrlRequest) -> Self {
        ShortUrlPatch {
            short_code: req.short_code,
            original_url: req.original_url,
            entity_type: req.entity_type,
            entity_id: req.entity_id,
            redirect_path: req.redirect_path,
            product_type: req.product_type,
            user_code: req.user_code,
            extra_params: req.extra_params,
            expiration_date: req.expiration_date,
            update_flag: None,
        }
    }
}

/// Public view of a short URL record.
///
/// `app_name` and `base_url` are present only on lookups by short code.
#[derive(Debug, Serialize)]
pub struct ShortUrlResponse {
    pub id: i64,
    pub app_id: i64,
    pub short_code: String,
    pub original_url: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub redirect_path: Option<String>,
    pub product_type: Option<String>,
    pub user_code: Option<String>,
    pub extra_params: ExtraParams,
    pub expiration_date: Option<DateTime<Utc>>,
    pub update_flag: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl From<ShortUrl> for ShortUrlResponse {
    fn from(url: ShortUrl) -> Self {
        let (app_name, base_url) = match url.app {
            Some(app) => (Some(app.name), Some(app.base_url)),
            None => (None, None),
        };

        ShortUrlResponse {
            id: url.id,
            app_id: url.app_id,
            short_code: url.short_code,
            original_url: url.original_url,
            entity_type: url.entity_type,
            entity_id: url.entity_id,
            redirect_path: url.redirect_path,
            product_type: url.product_type,
            user_code: url.user_code,
            extra_params: url.extra_params,
            expiration_date: url.expiration_date,
            update_flag: url.update_flag,
            created_at: url.created_at,
            app_name,
            base_url,
        }
    }
}

/// Response data for a successful create.
#[derive(Debug, Serialize)]
pub struct CreatedShortUrlResponse {
    pub id: i64,
    pub app_id: i64,
    pub short_code: String,
    pub user_code: Option<String>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub short_url: String,
}

impl From<CreatedShortUrl> for CreatedShortUrlResponse {
    fn from(created: CreatedShortUrl) -> Self {
        let record = created.record;
        CreatedShortUrlResponse {
            id: record.id,
            app_id: record.app_id,
            short_code: record.short_code,
            user_code: record.user_code,
            expiration_date: record.expiration_date,
            created_at: record.created_at,
            short_url: created.short_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total: usize,
    pub active: usize,
    pub expired: usize,
}

impl From<UrlStats> for StatsResponse {
    fn from(stats: UrlStats) -> Self {
        StatsResponse {
            total: stats.total,
            active: stats.active,
            expired: stats.expired,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn test_create_request_rejects_symbols_in_code() {
        let req: CreateShortUrlRequest = serde_json::from_value(json!({
            "short_code": "bad-code",
            "entity_type": "artist",
            "entity_id": "abc123"
        }))
        .unwrap();

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("short_code"));
    }

    #[test]
    fn test_create_request_rejects_past_expiration() {
        let req: CreateShortUrlRequest = serde_json::from_value(json!({
            "original_url": "https://example.com",
            "expiration_date": (Utc::now() - Duration::hours(1)).to_rfc3339()
        }))
        .unwrap();

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("expiration_date"));
    }

    #[test]
    fn test_create_request_accepts_entity_only() {
        let req: CreateShortUrlRequest = serde_json::from_value(json!({
            "entity_type": "artist",
            "entity_id": "abc123",
            "extra_params": { "utm_source": "share" }
        }))
        .unwrap();

        assert!(req.validate().is_ok());
        assert_eq!(req.extra_params.get("utm_source").map(String::as_str), Some("share"));
    }

    #[test]
    fn test_update_request_expiration_tristate() {
        let absent: UpdateShortUrlRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(absent.expiration_date, None);

        let cleared: UpdateShortUrlRequest =
            serde_json::from_value(json!({ "expiration_date": null })).unwrap();
        assert_eq!(cleared.expiration_date, Some(None));

        let future = Utc::now() + Duration::days(1);
        let set: UpdateShortUrlRequest =
            serde_json::from_value(json!({ "expiration_date": future.to_rfc3339() })).unwrap();
        assert!(matches!(set.expiration_date, Some(Some(_))));
        assert!(set.validate().is_ok());
    }

    #[test]
    fn test_update_request_into_patch_leaves_flag_to_service() {
        let req: UpdateShortUrlRequest =
            serde_json::from_value(json!({ "short_code": "newcode" })).unwrap();
        let patch: ShortUrlPatch = req.into();

        assert_eq!(patch.short_code.as_deref(), Some("newcode"));
        assert_eq!(patch.update_flag, None);
    }
}
