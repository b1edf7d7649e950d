#![allow(dead_code)]

use axum_test::TestServer;
use chrono::{DateTime, Utc};
use deeplink_shortener::domain::entities::{App, NewShortUrl, ShortUrl};
use deeplink_shortener::domain::repositories::ShortUrlRepository;
use deeplink_shortener::infrastructure::memory::MemoryStore;
use deeplink_shortener::routes::router;
use deeplink_shortener::state::AppState;
use std::sync::Arc;

pub const SERVICE_HOST: &str = "http://localhost:8080";

/// Test server over an in-memory store with two registered apps.
pub struct TestContext {
    pub server: TestServer,
    pub store: Arc<MemoryStore>,
    pub music: App,
    pub video: App,
}

pub async fn setup() -> TestContext {
    setup_with_error_details(true).await
}

/// Same as [`setup`], with error diagnostics as configured for production.
pub async fn setup_production() -> TestContext {
    setup_with_error_details(false).await
}

async fn setup_with_error_details(expose: bool) -> TestContext {
    let (state, store) = AppState::in_memory(SERVICE_HOST);
    let state = state.with_error_details(expose);
    let music = store
        .seed_app("music", "https://music.example.com")
        .await;
    let video = store
        .seed_app("video", "https://video.example.com")
        .await;

    let server = TestServer::new(router(state)).unwrap();

    TestContext {
        server,
        store,
        music,
        video,
    }
}

/// Inserts a record directly, bypassing request validation.
pub async fn insert_url(
    store: &MemoryStore,
    app: &App,
    code: &str,
    original_url: Option<&str>,
    expiration_date: Option<DateTime<Utc>>,
) -> ShortUrl {
    ShortUrlRepository::create(
        store,
        NewShortUrl {
            app_id: app.id,
            short_code: code.to_string(),
            original_url: original_url.map(str::to_string),
            expiration_date,
            ..Default::default()
        },
    )
    .await
    .unwrap()
}
