//! HTTP tests for `/api/v1/runs`.

mod common;

use adapt_core::artifacts::ArtifactKind;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use common::*;
use serde_json::json;
use sqlx::PgPool;

fn run_body(run_key: &str) -> serde_json::Value {
    json!({
        "run_key": run_key,
        "product_description": "Pocket espresso maker for campers",
        "image_uris": ["gs://brand/logo.png"],
        "submitted_by": "marketer@example.com"
    })
}

#[sqlx::test(migrations = "../db/migrations")]
async fn submit_creates_pending_run_and_analysis_job(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(&app, "/api/v1/runs", run_body("run-espresso")).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["run"]["run_key"], "run-espresso");
    assert_eq!(json["data"]["run"]["stage"], "pending");
    assert_eq!(json["data"]["run"]["artifact_root"], "gs://artifacts/runs");
    assert_eq!(json["data"]["job"]["job_type"], "analyze");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_run_key_conflicts(pool: PgPool) {
    let app = build_test_app(pool);
    post_json(&app, "/api/v1/runs", run_body("run-twice")).await;
    let response = post_json(&app, "/api/v1/runs", run_body("run-twice")).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn submit_without_images_is_rejected(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(
        &app,
        "/api/v1/runs",
        json!({"product_description": "No pictures of this one"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"].as_str().unwrap().contains("image"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn runs_can_be_listed_by_stage(pool: PgPool) {
    let app = build_test_app(pool);
    post_json(&app, "/api/v1/runs", run_body("run-listed")).await;
    seed_analysis_checkpoint(&app, "run-reviewing").await;

    let all = body_json(get(&app, "/api/v1/runs").await).await;
    assert_eq!(all["data"].as_array().unwrap().len(), 2);

    let waiting = body_json(get(&app, "/api/v1/runs?stage=awaiting_analysis_review").await).await;
    let waiting = waiting["data"].as_array().unwrap();
    assert_eq!(waiting.len(), 1);
    assert_eq!(waiting[0]["run_key"], "run-reviewing");

    let response = get(&app, "/api/v1/runs?stage=sleeping").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_run_is_404(pool: PgPool) {
    let app = build_test_app(pool);
    for path in ["/api/v1/runs/999999", "/api/v1/runs/999999/jobs", "/api/v1/runs/999999/tasks"] {
        let response = get(&app, path).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn run_detail_and_jobs(pool: PgPool) {
    let app = build_test_app(pool);
    let created = body_json(post_json(&app, "/api/v1/runs", run_body("run-detail")).await).await;
    let run_id = created["data"]["run"]["id"].as_i64().unwrap();

    let detail = body_json(get(&app, &format!("/api/v1/runs/{run_id}")).await).await;
    assert_eq!(detail["data"]["run_key"], "run-detail");
    assert_eq!(detail["data"]["stage"], "pending");

    let jobs = body_json(get(&app, &format!("/api/v1/runs/{run_id}/jobs")).await).await;
    let jobs = jobs["data"].as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["job_type"], "analyze");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn artifacts_are_listed_and_served(pool: PgPool) {
    let app = build_test_app(pool);
    let (run, _) = seed_analysis_checkpoint(&app, "run-artifacts").await;

    let listed = body_json(get(&app, &format!("/api/v1/runs/{}/artifacts", run.id)).await).await;
    let kinds: Vec<&str> = listed["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["kind"].as_str().unwrap())
        .collect();
    assert!(kinds.contains(&"usp_analysis"));
    assert!(kinds.contains(&"style_analysis"));

    let usp = body_json(
        get(&app, &format!("/api/v1/runs/{}/artifacts/usp_analysis", run.id)).await,
    )
    .await;
    assert_eq!(usp["data"]["analysis"]["usps"][0], "Brews in 90 seconds");

    let missing = get(
        &app,
        &format!("/api/v1/runs/{}/artifacts/{}", run.id, ArtifactKind::FinalVideo.name()),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let unknown = get(&app, &format!("/api/v1/runs/{}/artifacts/storyboard", run.id)).await;
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn gate_marker_is_served_as_text(pool: PgPool) {
    let app = build_test_app(pool);
    let (run, task) = seed_analysis_checkpoint(&app, "run-gate").await;
    post_json(
        &app,
        &format!("/api/v1/tasks/{}/approve", task.id),
        json!({"reviewer": "lead@example.com"}),
    )
    .await;

    let response = get(&app, &format!("/api/v1/runs/{}/artifacts/approval_gate_1", run.id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
    assert_eq!(body_bytes(response).await, b"approved");
}
