#![allow(dead_code)]

use std::sync::Arc;

use adapt_api::app::build_app;
use adapt_api::config::ServerConfig;
use adapt_api::state::AppState;
use adapt_cloud::{LocalObjectStore, ObjectStore};
use adapt_core::analysis::{AnalysisEnvelope, ColorSwatch, StyleAnalysis, UspAnalysis};
use adapt_core::artifacts::ArtifactKind;
use adapt_core::hitl::TASK_ANALYSIS_REVIEW;
use adapt_core::run::RunStage;
use adapt_db::models::hitl_task::{CreateHitlTask, HitlTask};
use adapt_db::models::run::{CreateRun, PipelineRun};
use adapt_db::repositories::{HitlTaskRepo, PipelineRunRepo};
use adapt_events::EventBus;
use adapt_pipeline::{artifacts, PipelineConfig};
use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _dir: tempfile::TempDir,
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
    }
}

/// Build the full router, middleware included, over a temporary local store.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn ObjectStore> = Arc::new(LocalObjectStore::new(dir.path()));
    let pipeline = PipelineConfig {
        artifact_root: "gs://artifacts/runs".into(),
        ..PipelineConfig::default()
    };
    let state = AppState::new(
        pool,
        test_config(),
        store,
        Arc::new(EventBus::default()),
        pipeline,
    );
    TestApp {
        router: build_app(state.clone()),
        state,
        _dir: dir,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: &TestApp, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn post_json(app: &TestApp, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn post_text(app: &TestApp, uri: &str, content_type: &str, body: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(body.to_string()))
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn usp_draft() -> UspAnalysis {
    UspAnalysis {
        usps: vec!["Brews in 90 seconds".into(), "Fits in a jacket pocket".into()],
        emotions: vec!["calm".into()],
    }
}

pub fn style_draft() -> StyleAnalysis {
    StyleAnalysis {
        dominant_colors: vec![ColorSwatch {
            hex_code: "#0F4C81".into(),
            name: "classic blue".into(),
        }],
        font_style: "Rounded sans".into(),
        tone_of_voice: "Warm".into(),
        aesthetic: "Scandinavian minimal".into(),
    }
}

/// Insert a run and pause it at the analysis checkpoint, with both draft
/// analyses written to storage.
pub async fn seed_analysis_checkpoint(app: &TestApp, run_key: &str) -> (PipelineRun, HitlTask) {
    let pool = &app.state.pool;
    let run = PipelineRunRepo::create(
        pool,
        &CreateRun {
            run_key: run_key.into(),
            creative_id: None,
            campaign_id: "campaign_test".into(),
            product_id: "product_test".into(),
            product_description: "Pocket espresso maker".into(),
            landing_page_url: None,
            creative_title: None,
            image_uris: vec!["gs://brand/logo.png".into()],
            artifact_root: "gs://artifacts/runs".into(),
            submitted_by: None,
        },
    )
    .await
    .unwrap();
    PipelineRunRepo::transition(pool, run.id, RunStage::Pending, RunStage::Analyzing)
        .await
        .unwrap()
        .unwrap();

    let usp_uri = artifacts::write_json(
        pool,
        &app.state.store,
        &run,
        ArtifactKind::UspAnalysis,
        &AnalysisEnvelope::new(usp_draft()),
    )
    .await
    .unwrap();
    let style_uri = artifacts::write_json(
        pool,
        &app.state.store,
        &run,
        ArtifactKind::StyleAnalysis,
        &AnalysisEnvelope::new(style_draft()),
    )
    .await
    .unwrap();

    let mut inputs = serde_json::Map::new();
    inputs.insert(ArtifactKind::UspAnalysis.name().into(), usp_uri.into());
    inputs.insert(ArtifactKind::StyleAnalysis.name().into(), style_uri.into());

    let task = HitlTaskRepo::open_checkpoint(
        pool,
        RunStage::Analyzing,
        RunStage::AwaitingAnalysisReview,
        &CreateHitlTask {
            run_id: run.id,
            task_name: TASK_ANALYSIS_REVIEW.into(),
            assignee: "reviewer@example.com".into(),
            input_artifacts: serde_json::Value::Object(inputs),
        },
    )
    .await
    .unwrap()
    .unwrap();

    (run, task)
}
