//! PostgreSQL implementation of the app repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{App, NewApp};
use crate::domain::repositories::AppRepository;
use crate::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct AppRow {
    id: i64,
    name: String,
    base_url: String,
    token: String,
    created_at: DateTime<Utc>,
}

impl From<AppRow> for App {
    fn from(row: AppRow) -> Self {
        App {
            id: row.id,
            name: row.name,
            base_url: row.base_url,
            token: row.token,
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL repository for registered apps.
///
/// Tokens are stored as issued so that re-registering a known app can
/// hand the same token back.
pub struct PgAppRepository {
    pool: Arc<PgPool>,
}

impl PgAppRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppRepository for PgAppRepository {
    async fn create(&self, new_app: NewApp) -> Result<App, AppError> {
        let row = sqlx::query_as::<_, AppRow>(
            r#"
            INSERT INTO apps (name, base_url, token)
            VALUES ($1, $2, $3)
            RETURNING id, name, base_url, token, created_at
            "#,
        )
        .bind(new_app.name)
        .bind(new_app.base_url)
        .bind(new_app.token)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_name_and_base_url(
        &self,
        name: &str,
        base_url: &str,
    ) -> Result<Option<App>, AppError> {
        let row = sqlx::query_as::<_, AppRow>(
            r#"
            SELECT id, name, base_url, token, created_at
            FROM apps
            WHERE name = $1 AND base_url = $2
            "#,
        )
        .bind(name)
        .bind(base_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(App::from))
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<App>, AppError> {
        let row = sqlx::query_as::<_, AppRow>(
            r#"
            SELECT id, name, base_url, token, created_at
            FROM apps
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(App::from))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<App>, AppError> {
        let row = sqlx::query_as::<_, AppRow>(
            r#"
            SELECT id, name, base_url, token, created_at
            FROM apps
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(App::from))
    }

    async fn list(&self) -> Result<Vec<App>, AppError> {
        let rows = sqlx::query_as::<_, AppRow>(
            r#"
            SELECT id, name, base_url, token, created_at
            FROM apps
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(App::from).collect())
    }
}
