mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::{Value, json};

fn location(response: &axum_test::TestResponse) -> String {
    response
        .header("location")
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_redirect_entity_into_app_base_url() {
    let ctx = common::setup().await;

    let response = ctx
        .server
        .post("/urls")
        .add_header("x-app-token", ctx.music.token.as_str())
        .json(&json!({
            "short_code": "artist1",
            "entity_type": "artist",
            "entity_id": "abc123",
            "extra_params": { "utm_source": "share", "ref": "home" }
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = ctx.server.get("/urls/redirect/artist1").await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        location(&response),
        "https://music.example.com/artist/abc123?ref=home&utm_source=share"
    );
}

#[tokio::test]
async fn test_redirect_path_overrides_entity_path() {
    let ctx = common::setup().await;

    ctx.server
        .post("/urls")
        .add_header("x-app-token", ctx.video.token.as_str())
        .json(&json!({
            "short_code": "clip01",
            "entity_type": "video",
            "entity_id": "77",
            "redirect_path": "/watch/77"
        }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = ctx.server.get("/api/shorten/redirect/clip01").await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "https://video.example.com/watch/77");
}

#[tokio::test]
async fn test_redirect_literal_original_url() {
    let ctx = common::setup().await;
    common::insert_url(
        &ctx.store,
        &ctx.music,
        "lit001",
        Some("https://elsewhere.example.org/page"),
        Some(Utc::now() + Duration::days(1)),
    )
    .await;

    let response = ctx.server.get("/urls/redirect/lit001").await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "https://elsewhere.example.org/page");
}

#[tokio::test]
async fn test_redirect_unknown_code() {
    let ctx = common::setup().await;

    let response = ctx.server.get("/urls/redirect/nope123").await;

    response.assert_status_not_found();
    let body = response.json::<Value>();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_redirect_expired_is_gone() {
    let ctx = common::setup().await;
    common::insert_url(
        &ctx.store,
        &ctx.music,
        "old001",
        Some("https://example.com"),
        Some(Utc::now() - Duration::minutes(5)),
    )
    .await;

    let response = ctx.server.get("/urls/redirect/old001").await;

    response.assert_status(StatusCode::GONE);
    let body = response.json::<Value>();
    assert_eq!(body["statusCode"], 410);
    assert_eq!(body["error"], "gone");

    // Expired records stay readable.
    ctx.server.get("/urls/code/old001").await.assert_status_ok();
}
