use std::sync::Arc;
use std::time::Duration;

use adapt_cloud::StorageConfig;
use adapt_events::{EventBus, EventPersistence, HitlNotifier, NotifierConfig};
use adapt_genai::GenAiConfig;
use adapt_pipeline::{Orchestrator, PipelineConfig, PipelineContext};
use adapt_worker::{Worker, WorkerConfig};
use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How long background tasks get to flush after shutdown begins.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adapt_worker=debug,adapt_pipeline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = adapt_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    adapt_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    adapt_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database ready");

    // --- Clients ---
    let store = StorageConfig::from_env()?.build().await;
    let genai = GenAiConfig::from_env()?;
    let http = GenAiConfig::http_client()?;
    let (text_model, video_model) = genai.build_models(http.clone());
    let pipeline_config = PipelineConfig::from_env();
    tracing::info!(
        text_model = %pipeline_config.text_model,
        video_model = %genai.video_model,
        artifact_root = %pipeline_config.artifact_root,
        "Model clients configured",
    );

    // --- Events ---
    let event_bus = Arc::new(EventBus::default());
    let persistence_handle = tokio::spawn(EventPersistence::run(
        pool.clone(),
        event_bus.subscribe(),
    ));

    let cancel = CancellationToken::new();
    let notifier_config = NotifierConfig::from_env();
    let notifier_handle = if notifier_config.is_enabled() {
        let notifier = HitlNotifier::new(notifier_config);
        Some(tokio::spawn(notifier.run(event_bus.subscribe(), cancel.clone())))
    } else {
        tracing::info!("No HITL notification channel configured");
        None
    };

    // --- Worker ---
    let ctx = Arc::new(PipelineContext {
        store,
        text_model,
        video_model,
        http,
        config: pipeline_config,
    });
    let orchestrator = Arc::new(Orchestrator::new(
        pool.clone(),
        ctx,
        Arc::clone(&event_bus),
    ));
    let worker = Worker::new(pool, orchestrator, WorkerConfig::from_env());

    let worker_cancel = cancel.clone();
    let worker_handle = tokio::spawn(async move { worker.run(worker_cancel).await });

    shutdown_signal().await;
    cancel.cancel();

    if tokio::time::timeout(SHUTDOWN_GRACE, worker_handle).await.is_err() {
        tracing::warn!("Worker did not stop within the grace period");
    }
    if let Some(handle) = notifier_handle {
        let _ = tokio::time::timeout(SHUTDOWN_GRACE, handle).await;
    }

    // The orchestrator held the last clone; dropping ours closes the bus.
    drop(event_bus);
    if tokio::time::timeout(SHUTDOWN_GRACE, persistence_handle)
        .await
        .is_err()
    {
        tracing::warn!("Event persistence did not drain within the grace period");
    }

    tracing::info!("Worker stopped");
    Ok(())
}

/// Wait for SIGINT (Ctrl-C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
