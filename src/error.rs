//! Unified error type and its HTTP envelope.
//!
//! Every layer (repositories, services, handlers) returns [`AppError`]. At the
//! HTTP boundary it renders as the failure envelope:
//!
//! ```json
//! {
//!   "success": false,
//!   "statusCode": 409,
//!   "message": "Short code already exists",
//!   "error": "conflict",
//!   "details": { "short_code": "promo1" }
//! }
//! ```
//!
//! `details` carries diagnostics. The rendered body never includes them; the
//! full envelope rides along as a [`DetailedError`] response extension and
//! [`crate::api::middleware::error_details`] swaps it in unless the service
//! runs with `APP_ENV=production`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

/// Failure envelope returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub success: bool,
    pub status_code: u16,
    pub message: String,
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },
    #[error("{message}")]
    Unauthorized { message: String, details: Value },
    #[error("{message}")]
    Forbidden { message: String, details: Value },
    #[error("{message}")]
    NotFound { message: String, details: Value },
    #[error("{message}")]
    Conflict { message: String, details: Value },
    #[error("{message}")]
    Gone { message: String, details: Value },
    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }
    pub fn forbidden(message: impl Into<String>, details: Value) -> Self {
        Self::Forbidden {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn gone(message: impl Into<String>, details: Value) -> Self {
        Self::Gone {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Conflict raised when a short code is already held by another record.
    ///
    /// Distinguishable from other conflicts via [`Self::is_short_code_conflict`].
    pub fn short_code_taken(code: &str) -> Self {
        Self::conflict(
            "Short code already exists",
            json!({ "field": "short_code", "short_code": code }),
        )
    }

    pub fn is_short_code_conflict(&self) -> bool {
        matches!(self, Self::Conflict { details, .. } if details["field"] == "short_code")
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Gone { .. } => StatusCode::GONE,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::Unauthorized { .. } => "unauthorized",
            Self::Forbidden { .. } => "forbidden",
            Self::NotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::Gone { .. } => "gone",
            Self::Internal { .. } => "internal_error",
        }
    }

    pub fn details(&self) -> &Value {
        match self {
            Self::Validation { details, .. }
            | Self::Unauthorized { details, .. }
            | Self::Forbidden { details, .. }
            | Self::NotFound { details, .. }
            | Self::Conflict { details, .. }
            | Self::Gone { details, .. }
            | Self::Internal { details, .. } => details,
        }
    }

    fn has_details(&self) -> bool {
        let details = self.details();
        !(details.is_null() || details.as_object().is_some_and(|o| o.is_empty()))
    }

    /// Builds the failure envelope, including diagnostics only when `expose_details`.
    pub fn to_envelope(&self, expose_details: bool) -> ErrorEnvelope {
        ErrorEnvelope {
            success: false,
            status_code: self.status_code().as_u16(),
            message: self.to_string(),
            error: self.code(),
            details: (expose_details && self.has_details()).then(|| self.details().clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Self::Internal { message, details } = &self {
            tracing::error!(%message, %details, "Request failed with internal error");
        }

        let mut response = (self.status_code(), Json(self.to_envelope(false))).into_response();
        if self.has_details() {
            response
                .extensions_mut()
                .insert(DetailedError(self.to_envelope(true)));
        }
        response
    }
}

/// The failure envelope with diagnostics, attached to error responses.
#[derive(Debug, Clone)]
pub struct DetailedError(pub ErrorEnvelope);

/// Name of the unique constraint guarding `short_urls.short_code`.
pub const SHORT_CODE_CONSTRAINT: &str = "short_urls_short_code_key";
/// Name of the unique constraint guarding `short_urls.user_code`.
pub const USER_CODE_CONSTRAINT: &str = "short_urls_user_code_key";

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return match db.constraint() {
                Some(SHORT_CODE_CONSTRAINT) => AppError::conflict(
                    "Short code already exists",
                    json!({ "field": "short_code" }),
                ),
                Some(USER_CODE_CONSTRAINT) => AppError::conflict(
                    "User code already exists",
                    json!({ "field": "user_code" }),
                ),
                constraint => AppError::conflict(
                    "Unique constraint violation",
                    json!({ "constraint": constraint }),
                ),
            };
        }

        AppError::internal("Database error", json!({ "reason": e.to_string() }))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields: serde_json::Map<String, Value> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages: Vec<String> = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                (field.to_string(), json!(messages))
            })
            .collect();

        AppError::bad_request("Validation failed", json!({ "fields": fields }))
    }
}
