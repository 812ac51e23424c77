use std::sync::Arc;

use adapt_cloud::ObjectStore;
use adapt_events::EventBus;
use adapt_pipeline::review::ReviewService;
use adapt_pipeline::PipelineConfig;

use crate::config::ServerConfig;

/// Shared application state available to all handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub pool: adapt_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Artifact storage, read when serving artifacts and review tasks.
    pub store: Arc<dyn ObjectStore>,
    pub event_bus: Arc<EventBus>,
    /// Artifact root and assignee used when submitting runs.
    pub pipeline: Arc<PipelineConfig>,
    pub review: Arc<ReviewService>,
}

impl AppState {
    pub fn new(
        pool: adapt_db::DbPool,
        config: ServerConfig,
        store: Arc<dyn ObjectStore>,
        event_bus: Arc<EventBus>,
        pipeline: PipelineConfig,
    ) -> Self {
        let review = ReviewService::new(pool.clone(), Arc::clone(&store), Arc::clone(&event_bus));
        Self {
            pool,
            config: Arc::new(config),
            store,
            event_bus,
            pipeline: Arc::new(pipeline),
            review: Arc::new(review),
        }
    }
}
