//! Short URL creation, mutation and redirect resolution.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use crate::domain::entities::{App, ExtraParams, NewShortUrl, RedirectTarget, ShortUrl, ShortUrlPatch};
use crate::domain::repositories::ShortUrlRepository;
use crate::error::AppError;
use crate::utils::code_generator::{generate_code, validate_custom_code};

/// Maximum attempts to find a free generated code before giving up.
const MAX_GENERATE_ATTEMPTS: usize = 10;

/// Caller input for [`UrlService::create`], already schema-validated.
#[derive(Debug, Clone, Default)]
pub struct CreateShortUrl {
    pub short_code: Option<String>,
    pub original_url: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub redirect_path: Option<String>,
    pub product_type: Option<String>,
    pub user_code: Option<String>,
    pub extra_params: ExtraParams,
    pub expiration_date: Option<chrono::DateTime<Utc>>,
}

/// A freshly created record plus its public short URL.
#[derive(Debug, Clone)]
pub struct CreatedShortUrl {
    pub record: ShortUrl,
    pub short_url: String,
}

/// Counts over all records at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlStats {
    pub total: usize,
    pub active: usize,
    pub expired: usize,
}

/// Service enforcing short code uniqueness, app ownership and expiry.
///
/// Stateless: every call is an independent unit of work against the
/// injected store, so the service is shared freely across requests.
///
/// Check order for mutations is fixed: the target must exist (`NotFound`),
/// then belong to the caller (`Forbidden`), then any new short code must be
/// free (`Conflict`).
pub struct UrlService {
    repository: Arc<dyn ShortUrlRepository>,
    service_host: String,
}

impl UrlService {
    /// Creates a new URL service.
    ///
    /// `service_host` is the public origin used to compose short URLs,
    /// e.g. `https://s.example.com`.
    pub fn new(repository: Arc<dyn ShortUrlRepository>, service_host: impl Into<String>) -> Self {
        Self {
            repository,
            service_host: service_host.into(),
        }
    }

    /// Composes the public short URL for a code.
    pub fn short_url_for(&self, code: &str) -> String {
        format!(
            "{}/urls/redirect/{}",
            self.service_host.trim_end_matches('/'),
            code
        )
    }

    /// Creates a short URL owned by `caller`.
    ///
    /// Uses `input.short_code` when given, otherwise generates a 7-character
    /// code, retrying on collision.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the explicit code is malformed, or the
    ///   input names neither a complete entity nor an original URL
    /// - [`AppError::Conflict`] if the explicit code (or user code) is taken
    /// - [`AppError::Internal`] on store errors or exhausted code generation
    pub async fn create(
        &self,
        input: CreateShortUrl,
        caller: &App,
    ) -> Result<CreatedShortUrl, AppError> {
        validate_target(&input)?;

        let mut new_url = NewShortUrl {
            app_id: caller.id,
            short_code: String::new(),
            original_url: input.original_url,
            entity_type: input.entity_type,
            entity_id: input.entity_id,
            redirect_path: input.redirect_path,
            product_type: input.product_type,
            user_code: input.user_code,
            extra_params: input.extra_params,
            expiration_date: input.expiration_date,
        };

        let record = match input.short_code {
            Some(code) => {
                validate_custom_code(&code)?;

                if self
                    .repository
                    .find_by_short_code(&code, false)
                    .await?
                    .is_some()
                {
                    return Err(AppError::short_code_taken(&code));
                }

                new_url.short_code = code;
                self.repository.create(new_url).await?
            }
            None => self.create_with_generated_code(new_url).await?,
        };

        tracing::info!(
            app_id = caller.id,
            short_code = %record.short_code,
            "Short URL created"
        );

        let short_url = self.short_url_for(&record.short_code);
        Ok(CreatedShortUrl { record, short_url })
    }

    /// Inserts with generated codes until one is free.
    ///
    /// A code that passes the existence check can still lose the insert race;
    /// the store's short code conflict sends us round again.
    async fn create_with_generated_code(&self, mut new_url: NewShortUrl) -> Result<ShortUrl, AppError> {
        for _ in 0..MAX_GENERATE_ATTEMPTS {
            let code = generate_code();

            if self
                .repository
                .find_by_short_code(&code, false)
                .await?
                .is_some()
            {
                continue;
            }

            new_url.short_code = code;
            match self.repository.create(new_url.clone()).await {
                Err(e) if e.is_short_code_conflict() => {
                    tracing::debug!(short_code = %new_url.short_code, "Generated code collided on insert");
                    continue;
                }
                result => return result,
            }
        }

        Err(AppError::internal(
            "Failed to generate unique short code",
            json!({ "reason": "Too many collisions" }),
        ))
    }

    /// Returns every record, newest first.
    pub async fn get_all(&self) -> Result<Vec<ShortUrl>, AppError> {
        self.repository.find_all().await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<ShortUrl, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| url_not_found_by_id(id))
    }

    /// Returns the record with its owning app's name and base URL joined in.
    ///
    /// Reads are public: no ownership check.
    pub async fn get_by_short_code(&self, code: &str) -> Result<ShortUrl, AppError> {
        self.repository
            .find_by_short_code(code, true)
            .await?
            .ok_or_else(|| url_not_found_by_code(code))
    }

    /// Updates a record by id on behalf of its owner.
    ///
    /// The stored `update_flag` is always set to `true`.
    pub async fn update_by_id(
        &self,
        id: i64,
        patch: ShortUrlPatch,
        caller: &App,
    ) -> Result<ShortUrl, AppError> {
        let current = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| url_not_found_by_id(id))?;

        let patch = self.prepare_patch(&current, patch, caller).await?;

        let updated = self
            .repository
            .update_by_id(id, patch)
            .await?
            .ok_or_else(|| url_not_found_by_id(id))?;

        tracing::info!(app_id = caller.id, id, short_code = %updated.short_code, "Short URL updated");
        Ok(updated)
    }

    /// Updates a record by short code on behalf of its owner.
    pub async fn update_by_short_code(
        &self,
        code: &str,
        patch: ShortUrlPatch,
        caller: &App,
    ) -> Result<ShortUrl, AppError> {
        let current = self
            .repository
            .find_by_short_code(code, false)
            .await?
            .ok_or_else(|| url_not_found_by_code(code))?;

        let patch = self.prepare_patch(&current, patch, caller).await?;

        let updated = self
            .repository
            .update_by_short_code(code, patch)
            .await?
            .ok_or_else(|| url_not_found_by_code(code))?;

        tracing::info!(app_id = caller.id, short_code = %updated.short_code, "Short URL updated");
        Ok(updated)
    }

    /// Ownership and short code checks shared by both update paths.
    async fn prepare_patch(
        &self,
        current: &ShortUrl,
        mut patch: ShortUrlPatch,
        caller: &App,
    ) -> Result<ShortUrlPatch, AppError> {
        ensure_owner(current, caller)?;

        if let Some(new_code) = &patch.short_code
            && new_code != &current.short_code
        {
            validate_custom_code(new_code)?;

            if let Some(other) = self.repository.find_by_short_code(new_code, false).await?
                && other.id != current.id
            {
                return Err(AppError::short_code_taken(new_code));
            }
        }

        patch.update_flag = Some(true);
        Ok(patch)
    }

    pub async fn delete_by_id(&self, id: i64, caller: &App) -> Result<(), AppError> {
        let current = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| url_not_found_by_id(id))?;

        ensure_owner(&current, caller)?;

        self.repository
            .delete_by_id(id)
            .await?
            .ok_or_else(|| url_not_found_by_id(id))?;

        tracing::info!(app_id = caller.id, id, "Short URL deleted");
        Ok(())
    }

    pub async fn delete_by_short_code(&self, code: &str, caller: &App) -> Result<(), AppError> {
        let current = self
            .repository
            .find_by_short_code(code, false)
            .await?
            .ok_or_else(|| url_not_found_by_code(code))?;

        ensure_owner(&current, caller)?;

        self.repository
            .delete_by_short_code(code)
            .await?
            .ok_or_else(|| url_not_found_by_code(code))?;

        tracing::info!(app_id = caller.id, short_code = code, "Short URL deleted");
        Ok(())
    }

    /// Resolves a short code to its redirect target.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the code is unknown
    /// - [`AppError::Gone`] if the record is past its expiration date
    /// - [`AppError::Internal`] if the target cannot be composed
    pub async fn redirect(&self, code: &str) -> Result<RedirectTarget, AppError> {
        let record = self
            .repository
            .find_by_short_code(code, true)
            .await?
            .ok_or_else(|| url_not_found_by_code(code))?;

        if record.is_expired_at(Utc::now()) {
            return Err(AppError::gone(
                "Short URL has expired",
                json!({ "short_code": code, "expiration_date": record.expiration_date }),
            ));
        }

        let base_url = record
            .app
            .as_ref()
            .map(|app| app.base_url.as_str())
            .ok_or_else(|| {
                AppError::internal(
                    "Owning app not found for short URL",
                    json!({ "short_code": code, "app_id": record.app_id }),
                )
            })?;

        let url = record.redirect_target(base_url).map_err(|e| {
            AppError::internal(
                "Redirect target is not a valid URL",
                json!({ "short_code": code, "reason": e.to_string() }),
            )
        })?;

        tracing::debug!(short_code = code, target = %url, "Resolved redirect");

        Ok(RedirectTarget {
            short_code: record.short_code,
            url: url.into(),
        })
    }

    /// Counts total, active and expired records.
    pub async fn stats(&self) -> Result<UrlStats, AppError> {
        let now = Utc::now();
        let urls = self.repository.find_all().await?;
        let expired = urls.iter().filter(|u| u.is_expired_at(now)).count();

        Ok(UrlStats {
            total: urls.len(),
            active: urls.len() - expired,
            expired,
        })
    }

    /// Checks that the underlying store is reachable.
    pub async fn health_check(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }
}

/// A create must name a complete entity or a literal URL.
fn validate_target(input: &CreateShortUrl) -> Result<(), AppError> {
    match (&input.entity_type, &input.entity_id) {
        (Some(_), Some(_)) => Ok(()),
        (Some(_), None) | (None, Some(_)) => Err(AppError::bad_request(
            "entity_type and entity_id must be provided together",
            json!({ "entity_type": input.entity_type, "entity_id": input.entity_id }),
        )),
        (None, None) if input.original_url.is_some() => Ok(()),
        (None, None) => Err(AppError::bad_request(
            "Either entity_type/entity_id or original_url is required",
            json!({}),
        )),
    }
}

fn ensure_owner(record: &ShortUrl, caller: &App) -> Result<(), AppError> {
    if record.is_owned_by(caller.id) {
        return Ok(());
    }

    tracing::warn!(
        app_id = caller.id,
        owner_id = record.app_id,
        short_code = %record.short_code,
        "Rejected mutation by non-owning app"
    );

    Err(AppError::forbidden(
        "You do not have permission to modify this short URL",
        json!({ "short_code": record.short_code }),
    ))
}

fn url_not_found_by_id(id: i64) -> AppError {
    AppError::not_found("URL not found", json!({ "id": id }))
}

fn url_not_found_by_code(code: &str) -> AppError {
    AppError::not_found("Short URL not found", json!({ "short_code": code }))
}
