//! HTTP tests for the creative catalog.

mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;
use sqlx::PgPool;

const CATALOG: &str = "Creative Title,Ad creative url,Link url\n\
    Summer Sale,https://cdn.example.com/summer.png,https://shop.example.com/summer\n\
    Winter Boots,gs://creatives/boots.jpg,\n";

async fn import(app: &TestApp, csv: &str) -> axum::response::Response {
    post_text(app, "/api/v1/creatives/import", "text/csv", csv).await
}

#[sqlx::test(migrations = "../db/migrations")]
async fn import_then_list_and_get(pool: PgPool) {
    let app = build_test_app(pool);

    let response = import(&app, CATALOG).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["imported"], 2);

    let listed = body_json(get(&app, "/api/v1/creatives").await).await;
    let titles: Vec<&str> = listed["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Summer Sale", "Winter Boots"]);

    let id = listed["data"][0]["id"].as_i64().unwrap();
    let one = body_json(get(&app, &format!("/api/v1/creatives/{id}")).await).await;
    assert_eq!(one["data"]["landing_page_url"], "https://shop.example.com/summer");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn reimport_updates_instead_of_duplicating(pool: PgPool) {
    let app = build_test_app(pool);
    import(&app, CATALOG).await;

    let updated = "Creative Title,Ad creative url,Link url\n\
        Winter Boots,gs://creatives/boots.jpg,https://shop.example.com/boots\n";
    import(&app, updated).await;

    let listed = body_json(get(&app, "/api/v1/creatives").await).await;
    let rows = listed["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["landing_page_url"], "https://shop.example.com/boots");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn empty_catalog_is_rejected(pool: PgPool) {
    let app = build_test_app(pool);
    let response = import(&app, "Creative Title,Ad creative url,Link url\n").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_creative_is_404(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(&app, "/api/v1/creatives/31337").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn run_can_start_from_a_creative(pool: PgPool) {
    let app = build_test_app(pool);
    let imported = body_json(import(&app, CATALOG).await).await;
    let creative_id = imported["data"]["creatives"][0]["id"].as_i64().unwrap();

    let response = post_json(
        &app,
        "/api/v1/runs",
        json!({"run_key": "run-from-catalog", "creative_id": creative_id}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let run = &body_json(response).await["data"]["run"];
    assert_eq!(run["creative_id"], creative_id);
    assert_eq!(run["creative_title"], "Summer Sale");
    assert_eq!(run["landing_page_url"], "https://shop.example.com/summer");
    assert_eq!(run["image_uris"], json!(["https://cdn.example.com/summer.png"]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_creative_cannot_start_a_run(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(&app, "/api/v1/runs", json!({"creative_id": 999})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
