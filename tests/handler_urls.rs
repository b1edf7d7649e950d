mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

// ─── End-to-end ownership flow ───────────────────────────────────────────────

#[tokio::test]
async fn test_create_read_and_owner_scoped_delete() {
    let ctx = common::setup().await;

    let response = ctx
        .server
        .post("/urls")
        .add_header("x-app-token", ctx.music.token.as_str())
        .json(&json!({ "entity_type": "artist", "entity_id": "abc123" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["success"], true);
    assert_eq!(body["statusCode"], 201);
    assert_eq!(body["data"]["app_id"], ctx.music.id);

    let code = body["data"]["short_code"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 7);
    assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(
        body["data"]["short_url"],
        format!("{}/urls/redirect/{}", common::SERVICE_HOST, code)
    );

    let response = ctx.server.get(&format!("/urls/code/{code}")).await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["data"]["app_name"], "music");
    assert_eq!(body["data"]["base_url"], "https://music.example.com");

    let response = ctx
        .server
        .delete(&format!("/urls/short/{code}"))
        .add_header("x-app-token", ctx.video.token.as_str())
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["error"], "forbidden");

    let response = ctx
        .server
        .delete(&format!("/urls/short/{code}"))
        .add_header("x-app-token", ctx.music.token.as_str())
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["success"], true);

    ctx.server
        .get(&format!("/urls/code/{code}"))
        .await
        .assert_status_not_found();
}

// ─── Authentication ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_without_token_is_unauthorized() {
    let ctx = common::setup().await;

    let response = ctx
        .server
        .post("/urls")
        .json(&json!({ "original_url": "https://example.com" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body = response.json::<Value>();
    assert_eq!(body["success"], false);
    assert_eq!(body["statusCode"], 401);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_create_with_unknown_token_is_unauthorized() {
    let ctx = common::setup().await;

    ctx.server
        .post("/urls")
        .add_header("x-app-token", "not-a-real-token")
        .json(&json!({ "original_url": "https://example.com" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_with_bearer_token() {
    let ctx = common::setup().await;

    let response = ctx
        .server
        .post("/urls")
        .add_header("Authorization", format!("Bearer {}", ctx.video.token))
        .json(&json!({ "original_url": "https://example.com/landing" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["data"]["app_id"], ctx.video.id);
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_with_explicit_code_and_conflict() {
    let ctx = common::setup().await;
    let payload = json!({
        "short_code": "Promo1",
        "entity_type": "album",
        "entity_id": "42",
        "user_code": "campaign-1"
    });

    let response = ctx
        .server
        .post("/urls")
        .add_header("x-app-token", ctx.music.token.as_str())
        .json(&payload)
        .await;
    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["data"]["short_code"], "Promo1");
    assert_eq!(response.json::<Value>()["data"]["user_code"], "campaign-1");

    let response = ctx
        .server
        .post("/urls")
        .add_header("x-app-token", ctx.video.token.as_str())
        .json(&json!({ "short_code": "Promo1", "original_url": "https://example.com" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    let body = response.json::<Value>();
    assert_eq!(body["error"], "conflict");
    assert_eq!(body["details"]["short_code"], "Promo1");
}

#[tokio::test]
async fn test_create_rejects_invalid_short_code() {
    let ctx = common::setup().await;

    for code in ["ab", "abcdefghijk", "no-dash"] {
        let response = ctx
            .server
            .post("/urls")
            .add_header("x-app-token", ctx.music.token.as_str())
            .json(&json!({ "short_code": code, "original_url": "https://example.com" }))
            .await;

        response.assert_status_bad_request();
        assert_eq!(response.json::<Value>()["error"], "validation_error", "{code}");
    }
}

#[tokio::test]
async fn test_create_requires_a_target() {
    let ctx = common::setup().await;

    ctx.server
        .post("/urls")
        .add_header("x-app-token", ctx.music.token.as_str())
        .json(&json!({ "user_code": "lonely" }))
        .await
        .assert_status_bad_request();

    ctx.server
        .post("/urls")
        .add_header("x-app-token", ctx.music.token.as_str())
        .json(&json!({ "entity_type": "artist" }))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_create_rejects_past_expiration() {
    let ctx = common::setup().await;

    ctx.server
        .post("/urls")
        .add_header("x-app-token", ctx.music.token.as_str())
        .json(&json!({
            "original_url": "https://example.com",
            "expiration_date": "2000-01-01T00:00:00Z"
        }))
        .await
        .assert_status_bad_request();
}

// ─── Read ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_is_newest_first_with_count() {
    let ctx = common::setup().await;
    common::insert_url(&ctx.store, &ctx.music, "first", Some("https://a.example.com"), None).await;
    common::insert_url(&ctx.store, &ctx.video, "second", Some("https://b.example.com"), None).await;

    let response = ctx.server.get("/urls").await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["short_code"], "second");
    assert_eq!(body["data"][1]["short_code"], "first");
}

#[tokio::test]
async fn test_get_by_id() {
    let ctx = common::setup().await;
    let record =
        common::insert_url(&ctx.store, &ctx.music, "byid01", Some("https://a.example.com"), None)
            .await;

    let response = ctx.server.get(&format!("/urls/{}", record.id)).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["short_code"], "byid01");

    ctx.server.get("/urls/9999").await.assert_status_not_found();
    ctx.server.get("/urls/not-a-number").await.assert_status_bad_request();
}

#[tokio::test]
async fn test_stats_counts_expired() {
    let ctx = common::setup().await;
    let past = chrono::Utc::now() - chrono::Duration::hours(1);
    common::insert_url(&ctx.store, &ctx.music, "live01", Some("https://a.example.com"), None).await;
    common::insert_url(&ctx.store, &ctx.music, "dead01", Some("https://a.example.com"), Some(past))
        .await;

    let response = ctx.server.get("/urls/stats").await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["data"],
        json!({ "total": 2, "active": 1, "expired": 1 })
    );
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_by_id_sets_update_flag() {
    let ctx = common::setup().await;
    let record =
        common::insert_url(&ctx.store, &ctx.music, "upd001", Some("https://old.example.com"), None)
            .await;
    assert!(!record.update_flag);

    let response = ctx
        .server
        .put(&format!("/urls/{}", record.id))
        .add_header("x-app-token", ctx.music.token.as_str())
        .json(&json!({ "original_url": "https://new.example.com" }))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["data"]["original_url"], "https://new.example.com");
    assert_eq!(body["data"]["update_flag"], true);
}

#[tokio::test]
async fn test_update_check_order() {
    let ctx = common::setup().await;
    let mine = common::insert_url(&ctx.store, &ctx.music, "mine01", None, None).await;
    common::insert_url(&ctx.store, &ctx.music, "taken1", None, None).await;

    // Missing record wins over everything else.
    ctx.server
        .put("/urls/9999")
        .add_header("x-app-token", ctx.video.token.as_str())
        .json(&json!({ "short_code": "taken1" }))
        .await
        .assert_status_not_found();

    // Ownership is checked before the new code.
    ctx.server
        .put(&format!("/urls/{}", mine.id))
        .add_header("x-app-token", ctx.video.token.as_str())
        .json(&json!({ "short_code": "taken1" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    ctx.server
        .put(&format!("/urls/{}", mine.id))
        .add_header("x-app-token", ctx.music.token.as_str())
        .json(&json!({ "short_code": "taken1" }))
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_update_by_short_code_renames() {
    let ctx = common::setup().await;
    common::insert_url(&ctx.store, &ctx.music, "oldcode", Some("https://a.example.com"), None)
        .await;

    let response = ctx
        .server
        .put("/urls/short/oldcode")
        .add_header("x-app-token", ctx.music.token.as_str())
        .json(&json!({ "short_code": "newcode", "expiration_date": null }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["short_code"], "newcode");

    ctx.server.get("/urls/code/oldcode").await.assert_status_not_found();
    ctx.server.get("/urls/code/newcode").await.assert_status_ok();
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_by_id() {
    let ctx = common::setup().await;
    let record = common::insert_url(&ctx.store, &ctx.video, "del001", None, None).await;

    ctx.server
        .delete(&format!("/urls/{}", record.id))
        .add_header("x-app-token", ctx.music.token.as_str())
        .await
        .assert_status(StatusCode::FORBIDDEN);

    ctx.server
        .delete(&format!("/urls/{}", record.id))
        .add_header("x-app-token", ctx.video.token.as_str())
        .await
        .assert_status_ok();

    ctx.server
        .delete(&format!("/urls/{}", record.id))
        .add_header("x-app-token", ctx.video.token.as_str())
        .await
        .assert_status_not_found();
}

// ─── Error details ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_production_hides_error_details() {
    let ctx = common::setup_production().await;
    common::insert_url(&ctx.store, &ctx.music, "Promo1", Some("https://a.example.com"), None)
        .await;

    let response = ctx
        .server
        .post("/urls")
        .add_header("x-app-token", ctx.video.token.as_str())
        .json(&json!({ "short_code": "Promo1", "original_url": "https://example.com" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body = response.json::<Value>();
    assert_eq!(body["error"], "conflict");
    assert_eq!(body["message"], "Short code already exists");
    assert!(body.get("details").is_none());

    let response = ctx.server.post("/urls").json(&json!({})).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert!(response.json::<Value>().get("details").is_none());
}

// ─── Legacy prefix ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_api_shorten_prefix_serves_same_routes() {
    let ctx = common::setup().await;

    let response = ctx
        .server
        .post("/api/shorten")
        .add_header("x-app-token", ctx.music.token.as_str())
        .json(&json!({ "short_code": "alias1", "original_url": "https://example.com" }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = ctx.server.get("/api/shorten/code/alias1").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["app_name"], "music");

    let response = ctx.server.get("/urls").await;
    assert_eq!(response.json::<Value>()["count"], 1);
}
