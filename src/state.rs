//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{AppService, UrlService};
use crate::domain::repositories::{AppRepository, ShortUrlRepository};
use crate::infrastructure::memory::MemoryStore;

/// Services shared across requests. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub url_service: Arc<UrlService>,
    pub app_service: Arc<AppService>,
    /// Whether failure envelopes carry `details`. Off in production.
    pub expose_error_details: bool,
}

impl AppState {
    /// Wires services over the given stores.
    ///
    /// `service_host` is the public origin used to compose short URLs.
    pub fn new(
        url_repository: Arc<dyn ShortUrlRepository>,
        app_repository: Arc<dyn AppRepository>,
        service_host: impl Into<String>,
    ) -> Self {
        Self {
            url_service: Arc::new(UrlService::new(url_repository, service_host)),
            app_service: Arc::new(AppService::new(app_repository)),
            expose_error_details: true,
        }
    }

    pub fn with_error_details(mut self, expose: bool) -> Self {
        self.expose_error_details = expose;
        self
    }

    /// State backed by a fresh [`MemoryStore`], returned alongside it for seeding.
    pub fn in_memory(service_host: impl Into<String>) -> (Self, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let state = Self::new(store.clone(), store.clone(), service_host);
        (state, store)
    }
}
