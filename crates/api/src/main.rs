use std::sync::Arc;
use std::time::Duration;

use adapt_api::app::build_app;
use adapt_api::config::ServerConfig;
use adapt_api::state::AppState;
use adapt_cloud::StorageConfig;
use adapt_events::{EventBus, EventPersistence};
use adapt_pipeline::PipelineConfig;
use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adapt_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(host = %config.host, port = config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = adapt_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    adapt_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database connection established");
    adapt_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    // --- Storage ---
    let store = StorageConfig::from_env()?.build().await;

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let persistence_handle = tokio::spawn(EventPersistence::run(
        pool.clone(),
        event_bus.subscribe(),
    ));

    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    let addr = config.bind_addr();
    let state = AppState::new(
        pool,
        config,
        store,
        Arc::clone(&event_bus),
        PipelineConfig::from_env(),
    );
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // The router (and its state) is gone; dropping the last sender closes
    // the bus so persistence drains and exits.
    drop(event_bus);
    if tokio::time::timeout(shutdown_timeout, persistence_handle)
        .await
        .is_err()
    {
        tracing::warn!("Event persistence did not drain within the shutdown timeout");
    }

    tracing::info!("Server shut down");
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
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
