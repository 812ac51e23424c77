//! Background job worker.
//!
//! Polls the `jobs` table every `poll_interval` and executes claimed jobs
//! through the pipeline [`Orchestrator`]. Claiming uses
//! `SELECT FOR UPDATE SKIP LOCKED` via [`JobRepo::claim_next`], so several
//! workers can share one database.

use std::sync::Arc;
use std::time::Duration;

use adapt_db::repositories::JobRepo;
use adapt_db::DbPool;
use adapt_pipeline::Orchestrator;
use tokio_util::sync::CancellationToken;

/// Default polling interval for the worker loop.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Name recorded on claimed jobs when `WORKER_NAME` is unset.
pub const DEFAULT_WORKER_NAME: &str = "adapt-worker";

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub name: String,
    pub poll_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_WORKER_NAME.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl WorkerConfig {
    /// | Env Var                   | Default        |
    /// |---------------------------|----------------|
    /// | `WORKER_NAME`             | `adapt-worker` |
    /// | `WORKER_POLL_INTERVAL_MS` | `1000`         |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            name: std::env::var("WORKER_NAME")
                .ok()
                .filter(|n| !n.is_empty())
                .unwrap_or(defaults.name),
            poll_interval: std::env::var("WORKER_POLL_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
        }
    }
}

/// What a single drain cycle did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleStats {
    pub completed: usize,
    pub failed: usize,
}

impl CycleStats {
    pub fn processed(&self) -> usize {
        self.completed + self.failed
    }
}

pub struct Worker {
    pool: DbPool,
    orchestrator: Arc<Orchestrator>,
    config: WorkerConfig,
}

impl Worker {
    pub fn new(pool: DbPool, orchestrator: Arc<Orchestrator>, config: WorkerConfig) -> Self {
        Self {
            pool,
            orchestrator,
            config,
        }
    }

    /// Run the worker loop until the cancellation token is triggered.
    ///
    /// A job in flight when cancellation fires sees the same token; video
    /// polling stops and the run is failed.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        tracing::info!(
            worker = %self.config.name,
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            "Worker started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(worker = %self.config.name, "Worker shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.drain(&cancel).await {
                        tracing::error!(error = %e, "Worker cycle failed");
                    }
                }
            }
        }
    }

    /// Claim and execute pending jobs until the queue is empty or the token
    /// fires.
    pub async fn drain(&self, cancel: &CancellationToken) -> Result<CycleStats, sqlx::Error> {
        let mut stats = CycleStats::default();
        while !cancel.is_cancelled() {
            let Some(job) = JobRepo::claim_next(&self.pool, &self.config.name).await? else {
                break;
            };
            tracing::info!(
                job_id = job.id,
                run_id = job.run_id,
                job_type = %job.job_type,
                "Job claimed",
            );
            JobRepo::mark_started(&self.pool, job.id).await?;

            match self.orchestrator.execute(&job, &cancel.child_token()).await {
                Ok(result) => {
                    JobRepo::complete(&self.pool, job.id, &result).await?;
                    tracing::info!(job_id = job.id, "Job completed");
                    stats.completed += 1;
                }
                Err(e) => {
                    tracing::error!(job_id = job.id, error = %e, "Job failed");
                    let details = serde_json::to_value(e.details()).ok();
                    JobRepo::fail(&self.pool, job.id, &e.to_string(), details.as_ref()).await?;
                    stats.failed += 1;
                }
            }
        }
        Ok(stats)
    }
}
