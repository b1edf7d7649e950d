//! PostgreSQL implementation of the short URL repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use std::sync::Arc;

use crate::domain::entities::{AppSummary, ExtraParams, NewShortUrl, ShortUrl, ShortUrlPatch};
use crate::domain::repositories::ShortUrlRepository;
use crate::error::AppError;

/// Columns selected for every short URL read, joined to the owning app.
const SELECT_JOINED: &str = r#"
    SELECT s.id, s.app_id, s.short_code, s.original_url, s.entity_type, s.entity_id,
           s.redirect_path, s.product_type, s.user_code, s.extra_params,
           s.expiration_date, s.update_flag, s.created_at,
           a.name AS app_name, a.base_url AS app_base_url
    FROM short_urls s
    LEFT JOIN apps a ON a.id = s.app_id
"#;

const RETURNING: &str = r#"
    RETURNING id, app_id, short_code, original_url, entity_type, entity_id,
              redirect_path, product_type, user_code, extra_params,
              expiration_date, update_flag, created_at,
              NULL::text AS app_name, NULL::text AS app_base_url
"#;

/// Row shape shared by all short URL queries.
#[derive(Debug, sqlx::FromRow)]
struct ShortUrlRow {
    id: i64,
    app_id: i64,
    short_code: String,
    original_url: Option<String>,
    entity_type: Option<String>,
    entity_id: Option<String>,
    redirect_path: Option<String>,
    product_type: Option<String>,
    user_code: Option<String>,
    extra_params: Json<ExtraParams>,
    expiration_date: Option<DateTime<Utc>>,
    update_flag: bool,
    created_at: DateTime<Utc>,
    app_name: Option<String>,
    app_base_url: Option<String>,
}

impl ShortUrlRow {
    fn into_entity(self, join_app: bool) -> ShortUrl {
        let app = match (join_app, self.app_name, self.app_base_url) {
            (true, Some(name), Some(base_url)) => Some(AppSummary { name, base_url }),
            _ => None,
        };

        ShortUrl {
            id: self.id,
            app_id: self.app_id,
            short_code: self.short_code,
            original_url: self.original_url,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            redirect_path: self.redirect_path,
            product_type: self.product_type,
            user_code: self.user_code,
            extra_params: self.extra_params.0,
            expiration_date: self.expiration_date,
            update_flag: self.update_flag,
            created_at: self.created_at,
            app,
        }
    }
}

/// PostgreSQL repository for short URL records.
///
/// Uniqueness of `short_code` and `user_code` is enforced by table
/// constraints; violations surface as [`AppError::Conflict`] through
/// `From<sqlx::Error>`.
pub struct PgShortUrlRepository {
    pool: Arc<PgPool>,
}

impl PgShortUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Shared `UPDATE` for both lookup keys. `key_column` is a fixed column name.
    async fn update_where(
        &self,
        key_column: &'static str,
        bind_key: KeyBind<'_>,
        patch: ShortUrlPatch,
    ) -> Result<Option<ShortUrl>, AppError> {
        let sql = format!(
            r#"
            UPDATE short_urls SET
                short_code      = COALESCE($2, short_code),
                original_url    = COALESCE($3, original_url),
                entity_type     = COALESCE($4, entity_type),
                entity_id       = COALESCE($5, entity_id),
                redirect_path   = COALESCE($6, redirect_path),
                product_type    = COALESCE($7, product_type),
                user_code       = COALESCE($8, user_code),
                extra_params    = COALESCE($9, extra_params),
                expiration_date = CASE WHEN $10 THEN $11 ELSE expiration_date END,
                update_flag     = COALESCE($12, update_flag)
            WHERE {key_column} = $1
            {RETURNING}
            "#
        );

        let query = sqlx::query_as::<_, ShortUrlRow>(&sql);
        let query = match bind_key {
            KeyBind::Id(id) => query.bind(id),
            KeyBind::Code(code) => query.bind(code),
        };

        let row = query
            .bind(patch.short_code)
            .bind(patch.original_url)
            .bind(patch.entity_type)
            .bind(patch.entity_id)
            .bind(patch.redirect_path)
            .bind(patch.product_type)
            .bind(patch.user_code)
            .bind(patch.extra_params.map(Json))
            .bind(patch.expiration_date.is_some())
            .bind(patch.expiration_date.flatten())
            .bind(patch.update_flag)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(|r| r.into_entity(false)))
    }
}

enum KeyBind<'a> {
    Id(i64),
    Code(&'a str),
}

#[async_trait]
impl ShortUrlRepository for PgShortUrlRepository {
    async fn create(&self, new_url: NewShortUrl) -> Result<ShortUrl, AppError> {
        let sql = format!(
            r#"
            INSERT INTO short_urls (
                app_id, short_code, original_url, entity_type, entity_id,
                redirect_path, product_type, user_code, extra_params, expiration_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            {RETURNING}
            "#
        );

        let row = sqlx::query_as::<_, ShortUrlRow>(&sql)
            .bind(new_url.app_id)
            .bind(new_url.short_code)
            .bind(new_url.original_url)
            .bind(new_url.entity_type)
            .bind(new_url.entity_id)
            .bind(new_url.redirect_path)
            .bind(new_url.product_type)
            .bind(new_url.user_code)
            .bind(Json(new_url.extra_params))
            .bind(new_url.expiration_date)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into_entity(false))
    }

    async fn find_all(&self) -> Result<Vec<ShortUrl>, AppError> {
        let sql = format!("{SELECT_JOINED} ORDER BY s.created_at DESC, s.id DESC");

        let rows = sqlx::query_as::<_, ShortUrlRow>(&sql)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(|r| r.into_entity(false)).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ShortUrl>, AppError> {
        let sql = format!("{SELECT_JOINED} WHERE s.id = $1");

        let row = sqlx::query_as::<_, ShortUrlRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(|r| r.into_entity(false)))
    }

    async fn find_by_short_code(
        &self,
        code: &str,
        join_app: bool,
    ) -> Result<Option<ShortUrl>, AppError> {
        let sql = format!("{SELECT_JOINED} WHERE s.short_code = $1");

        let row = sqlx::query_as::<_, ShortUrlRow>(&sql)
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(|r| r.into_entity(join_app)))
    }

    async fn update_by_id(
        &self,
        id: i64,
        patch: ShortUrlPatch,
    ) -> Result<Option<ShortUrl>, AppError> {
        self.update_where("id", KeyBind::Id(id), patch).await
    }

    async fn update_by_short_code(
        &self,
        code: &str,
        patch: ShortUrlPatch,
    ) -> Result<Option<ShortUrl>, AppError> {
        self.update_where("short_code", KeyBind::Code(code), patch)
            .await
    }

    async fn delete_by_id(&self, id: i64) -> Result<Option<ShortUrl>, AppError> {
        let sql = format!("DELETE FROM short_urls WHERE id = $1 {RETURNING}");

        let row = sqlx::query_as::<_, ShortUrlRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(|r| r.into_entity(false)))
    }

    async fn delete_by_short_code(&self, code: &str) -> Result<Option<ShortUrl>, AppError> {
        let sql = format!("DELETE FROM short_urls WHERE short_code = $1 {RETURNING}");

        let row = sqlx::query_as::<_, ShortUrlRow>(&sql)
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(|r| r.into_entity(false)))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
