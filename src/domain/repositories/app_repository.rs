//! Repository trait for registered apps.

use crate::domain::entities::{App, NewApp};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for app registration and token lookup.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgAppRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryStore`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppRepository: Send + Sync {
    /// Creates a new app.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the token or the (name, base_url)
    /// pair is already registered.
    async fn create(&self, new_app: NewApp) -> Result<App, AppError>;

    async fn find_by_name_and_base_url(
        &self,
        name: &str,
        base_url: &str,
    ) -> Result<Option<App>, AppError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<App>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<App>, AppError>;

    /// Lists all apps, newest first.
    async fn list(&self) -> Result<Vec<App>, AppError>;
}
