//! Reading and writing run artifacts, keeping `run_artifacts` in step with
//! object storage.

use std::sync::Arc;

use adapt_cloud::ObjectStore;
use adapt_core::artifacts::{artifact_uri, ArtifactKind};
use adapt_core::hitl::GATE_CONTENT;
use adapt_db::models::run::PipelineRun;
use adapt_db::repositories::{ArtifactRepo, ClaimedTask};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::PgPool;

use crate::error::PipelineError;

pub fn uri_for(run: &PipelineRun, kind: ArtifactKind) -> String {
    artifact_uri(&run.artifact_root, &run.run_key, kind)
}

/// An object written to storage but not yet recorded in `run_artifacts`.
#[derive(Debug, Clone)]
pub struct StoredArtifact {
    pub kind: ArtifactKind,
    pub uri: String,
    pub size: i64,
}

impl StoredArtifact {
    /// Record the artifact as part of a reviewer decision.
    pub async fn record_in(&self, claim: &mut ClaimedTask) -> Result<(), PipelineError> {
        claim.record_artifact(self.kind, &self.uri, self.size).await?;
        Ok(())
    }
}

/// Write `value` as JSON without recording it.
pub async fn store_json<T: Serialize>(
    store: &Arc<dyn ObjectStore>,
    run: &PipelineRun,
    kind: ArtifactKind,
    value: &T,
) -> Result<StoredArtifact, PipelineError> {
    let uri = uri_for(run, kind);
    let size = store.put_json(&uri, value).await?;
    tracing::debug!(run_key = %run.run_key, artifact = kind.name(), size, "Artifact written");
    Ok(StoredArtifact {
        kind,
        uri,
        size: size as i64,
    })
}

/// Write `value` as JSON and record it. Returns the artifact URI.
pub async fn write_json<T: Serialize>(
    pool: &PgPool,
    store: &Arc<dyn ObjectStore>,
    run: &PipelineRun,
    kind: ArtifactKind,
    value: &T,
) -> Result<String, PipelineError> {
    let stored = store_json(store, run, kind, value).await?;
    ArtifactRepo::upsert(pool, run.id, kind, &stored.uri, stored.size).await?;
    Ok(stored.uri)
}

pub async fn read_json<T: DeserializeOwned>(
    store: &Arc<dyn ObjectStore>,
    run: &PipelineRun,
    kind: ArtifactKind,
) -> Result<T, PipelineError> {
    Ok(store.get_json(&uri_for(run, kind)).await?)
}

/// Open an approval gate by writing its marker file. The caller records it.
pub async fn store_gate(
    store: &Arc<dyn ObjectStore>,
    run: &PipelineRun,
    gate: ArtifactKind,
) -> Result<StoredArtifact, PipelineError> {
    let uri = uri_for(run, gate);
    let size = store.put_text(&uri, GATE_CONTENT).await?;
    Ok(StoredArtifact {
        kind: gate,
        uri,
        size: size as i64,
    })
}

/// Close a gate opened by a decision that did not go through.
pub async fn remove_gate(
    store: &Arc<dyn ObjectStore>,
    run: &PipelineRun,
    gate: ArtifactKind,
) -> Result<(), PipelineError> {
    Ok(store.delete(&uri_for(run, gate)).await?)
}

/// Whether the gate marker exists in storage.
pub async fn gate_is_open(
    store: &Arc<dyn ObjectStore>,
    run: &PipelineRun,
    gate: ArtifactKind,
) -> Result<bool, PipelineError> {
    Ok(store.exists(&uri_for(run, gate)).await?)
}
