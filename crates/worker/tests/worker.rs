use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use adapt_cloud::{LocalObjectStore, ObjectStore};
use adapt_core::run::RunStage;
use adapt_core::video_prompt::VideoPrompt;
use adapt_db::models::status::JobStatus;
use adapt_db::repositories::{JobRepo, PipelineRunRepo};
use adapt_events::EventBus;
use adapt_genai::{
    GenAiError, GenerateRequest, OperationStatus, PollConfig, TextModel, VideoModel,
    VideoOperation,
};
use adapt_pipeline::{submit_run, Orchestrator, PipelineConfig, PipelineContext, SubmitRun};
use adapt_worker::{CycleStats, Worker, WorkerConfig};
use async_trait::async_trait;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

const USP_RESPONSE: &str = r#"{"usps": ["Folds flat"], "emotions": ["relief"]}"#;
const STYLE_RESPONSE: &str = r##"{"dominant_colors": [{"hex_code": "#FFFFFF", "name": "white"}],
    "font_style": "Serif", "tone_of_voice": "Calm", "aesthetic": "Minimal"}"##;
const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

struct QueuedTextModel(Mutex<VecDeque<Result<&'static str, u16>>>);

#[async_trait]
impl TextModel for QueuedTextModel {
    async fn generate(&self, _request: GenerateRequest) -> Result<String, GenAiError> {
        match self.0.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text.to_string()),
            Some(Err(status)) => Err(GenAiError::Api {
                status,
                body: "queued failure".into(),
            }),
            None => Err(GenAiError::Parse("queue exhausted".into())),
        }
    }
}

struct UnusedVideoModel;

#[async_trait]
impl VideoModel for UnusedVideoModel {
    async fn start(&self, _prompt: &VideoPrompt) -> Result<VideoOperation, GenAiError> {
        Err(GenAiError::Config("video is not used here".into()))
    }

    async fn poll(&self, _operation: &VideoOperation) -> Result<OperationStatus, GenAiError> {
        Err(GenAiError::Config("video is not used here".into()))
    }
}

struct Setup {
    pool: PgPool,
    store: Arc<dyn ObjectStore>,
    events: Arc<EventBus>,
    config: PipelineConfig,
    worker: Worker,
    _dir: tempfile::TempDir,
}

async fn setup(pool: PgPool, responses: Vec<Result<&'static str, u16>>) -> Setup {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn ObjectStore> = Arc::new(LocalObjectStore::new(dir.path()));
    store
        .put("gs://brand/mark.png", PNG_MAGIC.to_vec(), "image/png")
        .await
        .unwrap();

    let config = PipelineConfig {
        artifact_root: "gs://artifacts/runs".into(),
        video_poll: PollConfig {
            interval: Duration::from_millis(1),
            timeout: Duration::from_secs(1),
        },
        ..PipelineConfig::default()
    };
    let events = Arc::new(EventBus::default());
    let ctx = Arc::new(PipelineContext {
        store: Arc::clone(&store),
        text_model: Arc::new(QueuedTextModel(Mutex::new(responses.into()))),
        video_model: Arc::new(UnusedVideoModel),
        http: reqwest::Client::new(),
        config: config.clone(),
    });
    let orchestrator = Arc::new(Orchestrator::new(pool.clone(), ctx, Arc::clone(&events)));
    let worker = Worker::new(
        pool.clone(),
        orchestrator,
        WorkerConfig {
            name: "worker-a".into(),
            poll_interval: Duration::from_millis(10),
        },
    );

    Setup {
        pool,
        store,
        events,
        config,
        worker,
        _dir: dir,
    }
}

fn input(run_key: &str) -> SubmitRun {
    SubmitRun {
        run_key: Some(run_key.into()),
        product_description: "A travel kettle that folds flat".into(),
        image_uris: vec!["gs://brand/mark.png".into()],
        ..SubmitRun::default()
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn drain_runs_analysis_to_the_first_checkpoint(pool: PgPool) {
    let s = setup(pool, vec![Ok(USP_RESPONSE), Ok(STYLE_RESPONSE)]).await;
    let (run, job) = submit_run(&s.pool, &s.store, &s.events, &s.config, input("run-kettle"))
        .await
        .unwrap();

    let stats = s.worker.drain(&CancellationToken::new()).await.unwrap();
    assert_eq!(
        stats,
        CycleStats {
            completed: 1,
            failed: 0
        }
    );

    let job = JobRepo::find_by_id(&s.pool, job.id).await.unwrap().unwrap();
    assert_eq!(job.status_id, JobStatus::Completed.id());
    assert_eq!(job.worker_name.as_deref(), Some("worker-a"));
    assert!(job.started_at.is_some());
    assert!(job.result.unwrap()["task_id"].is_i64());

    let run = PipelineRunRepo::find_by_id(&s.pool, run.id).await.unwrap().unwrap();
    assert_eq!(run.stage().unwrap(), RunStage::AwaitingAnalysisReview);

    // The checkpoint enqueues nothing, so the next cycle is idle.
    let idle = s.worker.drain(&CancellationToken::new()).await.unwrap();
    assert_eq!(idle.processed(), 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn failed_job_records_classified_details(pool: PgPool) {
    let s = setup(pool, vec![Err(429)]).await;
    let (run, job) = submit_run(&s.pool, &s.store, &s.events, &s.config, input("run-throttled"))
        .await
        .unwrap();

    let stats = s.worker.drain(&CancellationToken::new()).await.unwrap();
    assert_eq!(stats.failed, 1);

    let job = JobRepo::find_by_id(&s.pool, job.id).await.unwrap().unwrap();
    assert_eq!(job.status_id, JobStatus::Failed.id());
    assert!(job.error_message.unwrap().contains("429"));
    assert_eq!(job.error_details.unwrap()["error_type"], "RATE_LIMITED");

    let run = PipelineRunRepo::find_by_id(&s.pool, run.id).await.unwrap().unwrap();
    assert_eq!(run.stage().unwrap(), RunStage::Failed);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn cancelled_token_claims_nothing(pool: PgPool) {
    let s = setup(pool, vec![]).await;
    let (_, job) = submit_run(&s.pool, &s.store, &s.events, &s.config, input("run-idle"))
        .await
        .unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    assert_eq!(s.worker.drain(&cancel).await.unwrap().processed(), 0);

    let job = JobRepo::find_by_id(&s.pool, job.id).await.unwrap().unwrap();
    assert_eq!(job.status_id, JobStatus::Pending.id());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn run_loop_stops_on_cancel(pool: PgPool) {
    let s = setup(pool, vec![Ok(USP_RESPONSE), Ok(STYLE_RESPONSE)]).await;
    let (run, _) = submit_run(&s.pool, &s.store, &s.events, &s.config, input("run-loop"))
        .await
        .unwrap();

    let cancel = CancellationToken::new();
    let worker = s.worker;
    let loop_cancel = cancel.clone();
    let handle = tokio::spawn(async move { worker.run(loop_cancel).await });

    let mut stage = RunStage::Pending;
    for _ in 0..200 {
        stage = PipelineRunRepo::find_by_id(&s.pool, run.id)
            .await
            .unwrap()
            .unwrap()
            .stage()
            .unwrap();
        if stage == RunStage::AwaitingAnalysisReview {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(stage, RunStage::AwaitingAnalysisReview);

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
}
