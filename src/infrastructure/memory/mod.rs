//! In-process store implementing both repository traits.
//!
//! Used when `STORAGE_BACKEND=memory` and by tests. All state sits behind a
//! single lock, so uniqueness checks and writes are atomic with respect to
//! each other, matching the guarantees of the PostgreSQL constraints.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tokio::sync::RwLock;

use crate::domain::entities::{App, NewApp, NewShortUrl, ShortUrl, ShortUrlPatch};
use crate::domain::repositories::{AppRepository, ShortUrlRepository};
use crate::error::AppError;
use crate::utils::code_generator::generate_token;

#[derive(Default)]
struct State {
    next_url_id: i64,
    next_app_id: i64,
    urls: BTreeMap<i64, ShortUrl>,
    by_code: HashMap<String, i64>,
    by_user_code: HashMap<String, i64>,
    apps: BTreeMap<i64, App>,
}

impl State {
    fn with_app(&self, mut record: ShortUrl, join_app: bool) -> ShortUrl {
        record.app = if join_app {
            self.apps.get(&record.app_id).map(App::summary)
        } else {
            None
        };
        record
    }

    /// Applies `patch` to record `id`, keeping the code indexes consistent.
    fn patch(&mut self, id: i64, patch: ShortUrlPatch) -> Result<Option<ShortUrl>, AppError> {
        let Some(current) = self.urls.get(&id) else {
            return Ok(None);
        };

        if let Some(code) = &patch.short_code
            && self.by_code.get(code).is_some_and(|owner| *owner != id)
        {
            return Err(AppError::short_code_taken(code));
        }
        if let Some(user_code) = &patch.user_code
            && self.by_user_code.get(user_code).is_some_and(|owner| *owner != id)
        {
            return Err(user_code_taken());
        }

        let mut updated = current.clone();
        patch.apply_to(&mut updated);

        if updated.short_code != current.short_code {
            self.by_code.remove(&current.short_code);
            self.by_code.insert(updated.short_code.clone(), id);
        }
        if updated.user_code != current.user_code {
            if let Some(old) = &current.user_code {
                self.by_user_code.remove(old);
            }
            if let Some(new) = &updated.user_code {
                self.by_user_code.insert(new.clone(), id);
            }
        }

        self.urls.insert(id, updated.clone());
        Ok(Some(updated))
    }

    fn remove(&mut self, id: i64) -> Option<ShortUrl> {
        let removed = self.urls.remove(&id)?;
        self.by_code.remove(&removed.short_code);
        if let Some(user_code) = &removed.user_code {
            self.by_user_code.remove(user_code);
        }
        Some(removed)
    }
}

fn user_code_taken() -> AppError {
    AppError::conflict("User code already exists", json!({ "field": "user_code" }))
}

/// In-memory implementation of [`ShortUrlRepository`] and [`AppRepository`].
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an app directly, bypassing idempotency checks.
    ///
    /// Convenience for tests and local seeding.
    pub async fn seed_app(&self, name: &str, base_url: &str) -> App {
        let mut state = self.state.write().await;
        state.next_app_id += 1;
        let app = App {
            id: state.next_app_id,
            name: name.to_string(),
            base_url: base_url.to_string(),
            token: generate_token(),
            created_at: Utc::now(),
        };
        state.apps.insert(app.id, app.clone());
        app
    }
}

#[async_trait]
impl ShortUrlRepository for MemoryStore {
    async fn create(&self, new_url: NewShortUrl) -> Result<ShortUrl, AppError> {
        let mut state = self.state.write().await;

        if state.by_code.contains_key(&new_url.short_code) {
            return Err(AppError::short_code_taken(&new_url.short_code));
        }
        if let Some(user_code) = &new_url.user_code
            && state.by_user_code.contains_key(user_code)
        {
            return Err(user_code_taken());
        }

        state.next_url_id += 1;
        let record = ShortUrl {
            id: state.next_url_id,
            app_id: new_url.app_id,
            short_code: new_url.short_code,
            original_url: new_url.original_url,
            entity_type: new_url.entity_type,
            entity_id: new_url.entity_id,
            redirect_path: new_url.redirect_path,
            product_type: new_url.product_type,
            user_code: new_url.user_code,
            extra_params: new_url.extra_params,
            expiration_date: new_url.expiration_date,
            update_flag: false,
            created_at: Utc::now(),
            app: None,
        };

        state.by_code.insert(record.short_code.clone(), record.id);
        if let Some(user_code) = &record.user_code {
            state.by_user_code.insert(user_code.clone(), record.id);
        }
        state.urls.insert(record.id, record.clone());

        Ok(record)
    }

    async fn find_all(&self) -> Result<Vec<ShortUrl>, AppError> {
        let state = self.state.read().await;
        let mut urls: Vec<ShortUrl> = state.urls.values().cloned().collect();
        urls.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(urls)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ShortUrl>, AppError> {
        let state = self.state.read().await;
        Ok(state.urls.get(&id).cloned())
    }

    async fn find_by_short_code(
        &self,
        code: &str,
        join_app: bool,
    ) -> Result<Option<ShortUrl>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .by_code
            .get(code)
            .and_then(|id| state.urls.get(id))
            .map(|record| state.with_app(record.clone(), join_app)))
    }

    async fn update_by_id(
        &self,
        id: i64,
        patch: ShortUrlPatch,
    ) -> Result<Option<ShortUrl>, AppError> {
        self.state.write().await.patch(id, patch)
    }

    async fn update_by_short_code(
        &self,
        code: &str,
        patch: ShortUrlPatch,
    ) -> Result<Option<ShortUrl>, AppError> {
        let mut state = self.state.write().await;
        match state.by_code.get(code).copied() {
            Some(id) => state.patch(id, patch),
            None => Ok(None),
        }
    }

    async fn delete_by_id(&self, id: i64) -> Result<Option<ShortUrl>, AppError> {
        Ok(self.state.write().await.remove(id))
    }

    async fn delete_by_short_code(&self, code: &str) -> Result<Option<ShortUrl>, AppError> {
        let mut state = self.state.write().await;
        match state.by_code.get(code).copied() {
            Some(id) => Ok(state.remove(id)),
            None => Ok(None),
        }
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl AppRepository for MemoryStore {
    async fn create(&self, new_app: NewApp) -> Result<App, AppError> {
        let mut state = self.state.write().await;

        if state.apps.values().any(|a| {
            a.token == new_app.token || (a.name == new_app.name && a.base_url == new_app.base_url)
        }) {
            return Err(AppError::conflict(
                "App already registered",
                json!({ "name": new_app.name, "base_url": new_app.base_url }),
            ));
        }

        state.next_app_id += 1;
        let app = App {
            id: state.next_app_id,
            name: new_app.name,
            base_url: new_app.base_url,
            token: new_app.token,
            created_at: Utc::now(),
        };
        state.apps.insert(app.id, app.clone());
        Ok(app)
    }

    async fn find_by_name_and_base_url(
        &self,
        name: &str,
        base_url: &str,
    ) -> Result<Option<App>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .apps
            .values()
            .find(|a| a.name == name && a.base_url == base_url)
            .cloned())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<App>, AppError> {
        let state = self.state.read().await;
        Ok(state.apps.values().find(|a| a.token == token).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<App>, AppError> {
        let state = self.state.read().await;
        Ok(state.apps.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<App>, AppError> {
        let state = self.state.read().await;
        Ok(state.apps.values().rev().cloned().collect())
    }
}
