//! Repository trait for short URL records.

use crate::domain::entities::{NewShortUrl, ShortUrl, ShortUrlPatch};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for short URL records.
///
/// Every operation touches a single record and is atomic at the store level.
/// Uniqueness of `short_code` (and of `user_code`, when set) is enforced by
/// the store itself, so a racing writer gets a conflict instead of a duplicate.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgShortUrlRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryStore`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShortUrlRepository: Send + Sync {
    /// Inserts a new record with `update_flag = false`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code (see
    /// [`AppError::is_short_code_conflict`]) or user code is already taken.
    /// Returns [`AppError::Internal`] on store errors.
    async fn create(&self, new_url: NewShortUrl) -> Result<ShortUrl, AppError>;

    /// Lists all records, newest first.
    async fn find_all(&self) -> Result<Vec<ShortUrl>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<ShortUrl>, AppError>;

    /// Finds a record by short code.
    ///
    /// When `join_app` is true, the owning app's name and base URL are
    /// populated in [`ShortUrl::app`].
    async fn find_by_short_code(
        &self,
        code: &str,
        join_app: bool,
    ) -> Result<Option<ShortUrl>, AppError>;

    /// Applies `patch` and returns the updated record, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the patch moves the record onto a
    /// short code or user code held by another record.
    async fn update_by_id(&self, id: i64, patch: ShortUrlPatch)
    -> Result<Option<ShortUrl>, AppError>;

    async fn update_by_short_code(
        &self,
        code: &str,
        patch: ShortUrlPatch,
    ) -> Result<Option<ShortUrl>, AppError>;

    /// Deletes a record and returns it, or `None` if absent.
    async fn delete_by_id(&self, id: i64) -> Result<Option<ShortUrl>, AppError>;

    async fn delete_by_short_code(&self, code: &str) -> Result<Option<ShortUrl>, AppError>;

    /// Checks store connectivity.
    async fn ping(&self) -> Result<(), AppError>;
}
