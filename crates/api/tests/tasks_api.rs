//! HTTP tests for review tasks under `/api/v1/tasks`.

mod common;

use adapt_core::job::JobType;
use adapt_db::repositories::JobRepo;
use axum::http::StatusCode;
use common::*;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn pending_tasks_are_listed(pool: PgPool) {
    let app = build_test_app(pool);
    let (_, task) = seed_analysis_checkpoint(&app, "run-pending").await;

    let json = body_json(get(&app, "/api/v1/tasks/pending").await).await;
    let tasks = json["data"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["id"], task.id);
    assert_eq!(tasks[0]["task_name"], "analysis_review");
    assert_eq!(tasks[0]["status"], "pending");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn task_detail_loads_input_artifacts(pool: PgPool) {
    let app = build_test_app(pool);
    let (_, task) = seed_analysis_checkpoint(&app, "run-detail").await;

    let json = body_json(get(&app, &format!("/api/v1/tasks/{}", task.id)).await).await;
    let artifacts = &json["data"]["artifacts"];
    assert_eq!(artifacts["usp_analysis"]["analysis"]["usps"][1], "Fits in a jacket pocket");
    assert_eq!(
        artifacts["style_analysis"]["analysis"]["dominant_colors"][0]["hex_code"],
        "#0F4C81"
    );
    assert_eq!(json["data"]["assignee"], "reviewer@example.com");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_task_is_404(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(&app, "/api/v1/tasks/424242").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json(
        &app,
        "/api/v1/tasks/424242/approve",
        json!({"reviewer": "lead@example.com"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn approving_analysis_queues_brief_generation(pool: PgPool) {
    let app = build_test_app(pool);
    let (run, task) = seed_analysis_checkpoint(&app, "run-approve").await;

    let response = post_json(
        &app,
        &format!("/api/v1/tasks/{}/approve", task.id),
        json!({
            "reviewer": "lead@example.com",
            "comment": "Sharpen the first USP",
            "edits": {"usp": {"usps": ["Espresso anywhere in 90 seconds"], "emotions": ["freedom"]}}
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["task"]["status"], "approved");
    assert_eq!(json["data"]["task"]["decided_by"], "lead@example.com");
    assert_eq!(json["data"]["run"]["stage"], "generating_brief");

    let jobs = JobRepo::list_for_run(&app.state.pool, run.id).await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].job_type, JobType::GenerateBrief.as_str());

    let approved = body_json(
        get(&app, &format!("/api/v1/runs/{}/artifacts/usp_analysis_approved", run.id)).await,
    )
    .await;
    assert_eq!(
        approved["data"]["analysis"]["usps"][0],
        "Espresso anywhere in 90 seconds"
    );
    // Style was not edited, so the draft is approved as is.
    let style = body_json(
        get(&app, &format!("/api/v1/runs/{}/artifacts/style_analysis_approved", run.id)).await,
    )
    .await;
    assert_eq!(style["data"]["analysis"]["tone_of_voice"], "Warm");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn a_decided_task_cannot_be_decided_again(pool: PgPool) {
    let app = build_test_app(pool);
    let (_, task) = seed_analysis_checkpoint(&app, "run-once").await;
    let uri = format!("/api/v1/tasks/{}/approve", task.id);

    let first = post_json(&app, &uri, json!({"reviewer": "lead@example.com"})).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = post_json(&app, &uri, json!({"reviewer": "lead@example.com"})).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_edits_are_rejected(pool: PgPool) {
    let app = build_test_app(pool);
    let (run, task) = seed_analysis_checkpoint(&app, "run-bad-edits").await;

    let response = post_json(
        &app,
        &format!("/api/v1/tasks/{}/approve", task.id),
        json!({"reviewer": "lead@example.com", "edits": {"usp": {"usps": []}}}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        &app,
        &format!("/api/v1/tasks/{}/approve", task.id),
        json!({"reviewer": "lead@example.com", "edits": {"usp": "not an object"}}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The run is still waiting for a valid decision.
    let detail = body_json(get(&app, &format!("/api/v1/runs/{}", run.id)).await).await;
    assert_eq!(detail["data"]["stage"], "awaiting_analysis_review");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn blank_reviewer_is_rejected(pool: PgPool) {
    let app = build_test_app(pool);
    let (_, task) = seed_analysis_checkpoint(&app, "run-anon").await;

    let response = post_json(
        &app,
        &format!("/api/v1/tasks/{}/approve", task.id),
        json!({"reviewer": ""}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn rejection_requires_a_comment_and_ends_the_run(pool: PgPool) {
    let app = build_test_app(pool);
    let (run, task) = seed_analysis_checkpoint(&app, "run-reject").await;
    let uri = format!("/api/v1/tasks/{}/reject", task.id);

    let response = post_json(&app, &uri, json!({"reviewer": "lead@example.com", "comment": ""})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        &app,
        &uri,
        json!({"reviewer": "lead@example.com", "comment": "Wrong product line"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["task"]["status"], "rejected");
    assert_eq!(json["data"]["task"]["decision_comment"], "Wrong product line");
    assert_eq!(json["data"]["run"]["stage"], "rejected");

    assert!(JobRepo::list_for_run(&app.state.pool, run.id)
        .await
        .unwrap()
        .is_empty());
}
