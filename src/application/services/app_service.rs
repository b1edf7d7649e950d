//! App registration and bearer-token identity resolution.

use std::sync::Arc;

use serde_json::json;

use crate::domain::entities::{App, NewApp};
use crate::domain::repositories::AppRepository;
use crate::error::AppError;
use crate::utils::code_generator::generate_token;

/// Service for registering apps and resolving their bearer tokens.
///
/// Registration is idempotent on the (name, base_url) pair. Tokens are opaque
/// and looked up verbatim.
pub struct AppService {
    repository: Arc<dyn AppRepository>,
}

impl AppService {
    pub fn new(repository: Arc<dyn AppRepository>) -> Self {
        Self { repository }
    }

    /// Registers an app, returning the existing record for a known pair.
    ///
    /// A concurrent registration of the same pair surfaces as a store
    /// conflict; the winner's record is then returned.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on store errors.
    pub async fn register(&self, name: &str, base_url: &str) -> Result<App, AppError> {
        if let Some(existing) = self
            .repository
            .find_by_name_and_base_url(name, base_url)
            .await?
        {
            tracing::debug!(app_id = existing.id, "App already registered");
            return Ok(existing);
        }

        let new_app = NewApp {
            name: name.to_string(),
            base_url: base_url.to_string(),
            token: generate_token(),
        };

        match self.repository.create(new_app).await {
            Ok(app) => {
                tracing::info!(app_id = app.id, name = %app.name, "App registered");
                Ok(app)
            }
            Err(AppError::Conflict { .. }) => self
                .repository
                .find_by_name_and_base_url(name, base_url)
                .await?
                .ok_or_else(|| {
                    AppError::internal(
                        "App registration conflicted but no app was found",
                        json!({ "name": name, "base_url": base_url }),
                    )
                }),
            Err(e) => Err(e),
        }
    }

    /// Looks up the app owning `token`.
    pub async fn resolve(&self, token: &str) -> Result<Option<App>, AppError> {
        self.repository.find_by_token(token).await
    }

    /// Resolves `token` or fails with [`AppError::Unauthorized`].
    pub async fn authenticate(&self, token: &str) -> Result<App, AppError> {
        self.resolve(token).await?.ok_or_else(|| {
            AppError::unauthorized("Invalid token", json!({ "reason": "Unknown app token" }))
        })
    }

    pub async fn get_by_id(&self, id: i64) -> Result<App, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("App not found", json!({ "id": id })))
    }

    pub async fn list(&self) -> Result<Vec<App>, AppError> {
        self.repository.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockAppRepository;
    use chrono::Utc;

    fn test_app(id: i64, token: &str) -> App {
        App {
            id,
            name: "music".to_string(),
            base_url: "https://music.example.com".to_string(),
            token: token.to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_register_new_app_generates_token() {
        let mut repo = MockAppRepository::new();
        repo.expect_find_by_name_and_base_url()
            .times(1)
            .returning(|_, _| Ok(None));
        repo.expect_create()
            .withf(|new_app| new_app.token.len() == 24 && new_app.name == "music")
            .times(1)
            .returning(|new_app| Ok(test_app(1, &new_app.token)));

        let service = AppService::new(Arc::new(repo));
        let app = service
            .register("music", "https://music.example.com")
            .await
            .unwrap();

        assert_eq!(app.id, 1);
        assert_eq!(app.token.len(), 24);
    }

    #[tokio::test]
    async fn test_register_is_idempotent() {
        let mut repo = MockAppRepository::new();
        repo.expect_find_by_name_and_base_url()
            .times(1)
            .returning(|_, _| Ok(Some(test_app(3, "existing-token"))));
        repo.expect_create().times(0);

        let service = AppService::new(Arc::new(repo));
        let app = service
            .register("music", "https://music.example.com")
            .await
            .unwrap();

        assert_eq!(app.id, 3);
        assert_eq!(app.token, "existing-token");
    }

    #[tokio::test]
    async fn test_register_race_returns_winner() {
        let mut repo = MockAppRepository::new();
        let mut lookups = 0;
        repo.expect_find_by_name_and_base_url()
            .times(2)
            .returning(move |_, _| {
                lookups += 1;
                if lookups == 1 {
                    Ok(None)
                } else {
                    Ok(Some(test_app(8, "winner-token")))
                }
            });
        repo.expect_create()
            .times(1)
            .returning(|_| Err(AppError::conflict("Unique constraint violation", json!({}))));

        let service = AppService::new(Arc::new(repo));
        let app = service
            .register("music", "https://music.example.com")
            .await
            .unwrap();

        assert_eq!(app.id, 8);
    }

    #[tokio::test]
    async fn test_authenticate_known_token() {
        let mut repo = MockAppRepository::new();
        repo.expect_find_by_token()
            .withf(|token| token == "good-token")
            .times(1)
            .returning(|token| Ok(Some(test_app(4, token))));

        let service = AppService::new(Arc::new(repo));
        let app = service.authenticate("good-token").await.unwrap();

        assert_eq!(app.id, 4);
    }

    #[tokio::test]
    async fn test_authenticate_unknown_token() {
        let mut repo = MockAppRepository::new();
        repo.expect_find_by_token().times(1).returning(|_| Ok(None));

        let service = AppService::new(Arc::new(repo));
        let err = service.authenticate("bad-token").await.unwrap_err();

        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let mut repo = MockAppRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok((id == 3).then(|| test_app(3, "tok"))));

        let service = AppService::new(Arc::new(repo));

        assert_eq!(service.get_by_id(3).await.unwrap().id, 3);
        let err = service.get_by_id(9).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }
}
