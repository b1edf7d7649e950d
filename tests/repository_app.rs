//! PostgreSQL app repository tests. Run with `cargo test -- --ignored`.

use deeplink_shortener::AppError;
use deeplink_shortener::domain::entities::NewApp;
use deeplink_shortener::domain::repositories::AppRepository;
use deeplink_shortener::infrastructure::persistence::PgAppRepository;
use sqlx::PgPool;
use std::sync::Arc;

fn new_app(name: &str, token: &str) -> NewApp {
    NewApp {
        name: name.to_string(),
        base_url: "https://example.com".to_string(),
        token: token.to_string(),
    }
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_create_and_lookup(pool: PgPool) {
    let repo = PgAppRepository::new(Arc::new(pool));

    let app = repo.create(new_app("music", "tok-music")).await.unwrap();

    let by_token = repo.find_by_token("tok-music").await.unwrap().unwrap();
    assert_eq!(by_token.id, app.id);

    let by_pair = repo
        .find_by_name_and_base_url("music", "https://example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_pair.id, app.id);

    assert!(repo.find_by_token("unknown").await.unwrap().is_none());
    assert_eq!(repo.find_by_id(app.id).await.unwrap().unwrap().name, "music");
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_duplicate_pair_is_conflict(pool: PgPool) {
    let repo = PgAppRepository::new(Arc::new(pool));

    repo.create(new_app("music", "tok-1")).await.unwrap();
    let err = repo.create(new_app("music", "tok-2")).await.unwrap_err();

    assert!(matches!(err, AppError::Conflict { .. }));
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_list_newest_first(pool: PgPool) {
    let repo = PgAppRepository::new(Arc::new(pool));

    repo.create(new_app("music", "tok-1")).await.unwrap();
    repo.create(new_app("video", "tok-2")).await.unwrap();

    let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|a| a.name).collect();
    assert_eq!(names, vec!["video", "music"]);
}
