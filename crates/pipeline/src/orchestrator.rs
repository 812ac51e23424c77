//! Executes claimed jobs against their run.
//!
//! Each job type drives exactly one stage. Before running, the orchestrator
//! checks the run is in the stage the job expects and, for post-checkpoint
//! jobs, that the approval gate file exists. Any failure after those checks
//! marks the run failed with classified error details.

use std::sync::Arc;

use adapt_core::analysis::{AnalysisEnvelope, StyleAnalysis, UspAnalysis};
use adapt_core::artifacts::ArtifactKind;
use adapt_core::error::CoreError;
use adapt_core::hitl::{TASK_ANALYSIS_REVIEW, TASK_PROMPT_REVIEW};
use adapt_core::job::JobType;
use adapt_core::run::RunStage;
use adapt_core::video_prompt::VideoPrompt;
use adapt_db::models::hitl_task::CreateHitlTask;
use adapt_db::models::job::Job;
use adapt_db::models::run::PipelineRun;
use adapt_db::repositories::{ArtifactRepo, HitlTaskRepo, PipelineRunRepo};
use adapt_events::{event_types, EventBus};
use serde_json::json;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::artifacts;
use crate::context::PipelineContext;
use crate::error::PipelineError;
use crate::publish;
use crate::stages;

/// Actor recorded on events when the job has no worker name.
const DEFAULT_ACTOR: &str = "pipeline";

pub struct Orchestrator {
    pool: PgPool,
    ctx: Arc<PipelineContext>,
    events: Arc<EventBus>,
}

impl Orchestrator {
    pub fn new(pool: PgPool, ctx: Arc<PipelineContext>, events: Arc<EventBus>) -> Self {
        Self { pool, ctx, events }
    }

    pub fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    /// Execute one job and return the JSON result stored on it.
    pub async fn execute(
        &self,
        job: &Job,
        cancel: &CancellationToken,
    ) -> Result<serde_json::Value, PipelineError> {
        let job_type = JobType::parse(&job.job_type)?;
        let run = PipelineRunRepo::find_by_id(&self.pool, job.run_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "pipeline_run",
                id: job.run_id,
            })?;

        // A stale job for a run that moved on must not fail the run.
        let stage = run.stage()?;
        if stage != job_type.expected_stage() {
            return Err(CoreError::Conflict(format!(
                "Run {} is {} but job {job_type} expects {}",
                run.run_key,
                stage.name(),
                job_type.expected_stage().name()
            ))
            .into());
        }

        let actor = job.worker_name.as_deref().unwrap_or(DEFAULT_ACTOR);
        tracing::info!(job_id = job.id, run_key = %run.run_key, %job_type, "Executing job");

        let outcome = match job_type {
            JobType::Analyze => self.analyze(&run, actor).await,
            JobType::GenerateBrief => self.generate_brief(&run, actor).await,
            JobType::GenerateVideo => self.generate_video(&run, actor, cancel).await,
        };

        match &outcome {
            // Another job or reviewer moved the run; it is theirs to finish.
            Err(PipelineError::Core(CoreError::Conflict(msg))) => {
                tracing::warn!(
                    job_id = job.id,
                    run_key = %run.run_key,
                    %job_type,
                    reason = %msg,
                    "Run moved on during job"
                );
            }
            Err(err) => self.fail_run(&run, err, actor).await,
            Ok(_) => {}
        }
        outcome
    }

    // -----------------------------------------------------------------------
    // Stages
    // -----------------------------------------------------------------------

    async fn analyze(&self, run: &PipelineRun, actor: &str) -> Result<serde_json::Value, PipelineError> {
        self.transition(run, RunStage::Pending, RunStage::Analyzing, actor)
            .await?;

        let input = stages::load_product_input(
            &self.ctx,
            &run.product_description,
            run.landing_page_url.as_deref(),
            run.creative_title.as_deref(),
        )
        .await;
        let usp = stages::extract_usps(&self.ctx, &input).await?;
        let style = stages::analyze_brand_style(&self.ctx, &run.image_uri_list()).await?;

        let usp_uri = self
            .write(run, ArtifactKind::UspAnalysis, &AnalysisEnvelope::new(usp))
            .await?;
        let style_uri = self
            .write(run, ArtifactKind::StyleAnalysis, &AnalysisEnvelope::new(style))
            .await?;

        let input_artifacts = artifact_map(&[
            (ArtifactKind::UspAnalysis, usp_uri),
            (ArtifactKind::StyleAnalysis, style_uri),
        ]);
        let task_id = self
            .open_checkpoint(
                run,
                RunStage::Analyzing,
                RunStage::AwaitingAnalysisReview,
                TASK_ANALYSIS_REVIEW,
                input_artifacts.clone(),
                actor,
            )
            .await?;

        Ok(json!({ "task_id": task_id, "artifacts": input_artifacts }))
    }

    async fn generate_brief(
        &self,
        run: &PipelineRun,
        actor: &str,
    ) -> Result<serde_json::Value, PipelineError> {
        self.require_gate(run, JobType::GenerateBrief).await?;

        let usp: AnalysisEnvelope<UspAnalysis> =
            artifacts::read_json(&self.ctx.store, run, ArtifactKind::UspAnalysisApproved).await?;
        let style: AnalysisEnvelope<StyleAnalysis> =
            artifacts::read_json(&self.ctx.store, run, ArtifactKind::StyleAnalysisApproved).await?;

        let brief = stages::generate_brief(
            &self.ctx,
            &usp.analysis,
            &style.analysis,
            &run.campaign_id,
            &run.product_id,
        )
        .await?;
        let draft = VideoPrompt::from_brief(&brief);

        let brief_uri = self.write(run, ArtifactKind::AdBrief, &brief).await?;
        let prompt_uri = self.write(run, ArtifactKind::VideoPromptDraft, &draft).await?;

        let input_artifacts = artifact_map(&[
            (ArtifactKind::AdBrief, brief_uri),
            (ArtifactKind::VideoPromptDraft, prompt_uri),
        ]);
        let task_id = self
            .open_checkpoint(
                run,
                RunStage::GeneratingBrief,
                RunStage::AwaitingPromptReview,
                TASK_PROMPT_REVIEW,
                input_artifacts.clone(),
                actor,
            )
            .await?;

        Ok(json!({
            "task_id": task_id,
            "artifacts": input_artifacts,
            "total_duration_seconds": brief.total_duration_secs(),
        }))
    }

    async fn generate_video(
        &self,
        run: &PipelineRun,
        actor: &str,
        cancel: &CancellationToken,
    ) -> Result<serde_json::Value, PipelineError> {
        self.require_gate(run, JobType::GenerateVideo).await?;

        let prompt: VideoPrompt =
            artifacts::read_json(&self.ctx.store, run, ArtifactKind::VideoPromptApproved).await?;

        let video_uri = artifacts::uri_for(run, ArtifactKind::FinalVideo);
        let size = stages::generate_video(&self.ctx, &prompt, &video_uri, cancel).await?;
        ArtifactRepo::upsert(&self.pool, run.id, ArtifactKind::FinalVideo, &video_uri, size as i64)
            .await?;
        PipelineRunRepo::set_final_video(&self.pool, run.id, &video_uri).await?;
        self.events.publish(
            publish::run_event(event_types::VIDEO_GENERATED, run, actor).with_payload(json!({
                "run_key": run.run_key,
                "uri": video_uri,
                "size_bytes": size,
            })),
        );

        let completed = self
            .transition(run, RunStage::GeneratingVideo, RunStage::Completed, actor)
            .await?;
        self.events
            .publish(publish::run_event(event_types::RUN_COMPLETED, &completed, actor));

        Ok(json!({ "final_video_uri": video_uri, "size_bytes": size }))
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn write<T: serde::Serialize>(
        &self,
        run: &PipelineRun,
        kind: ArtifactKind,
        value: &T,
    ) -> Result<String, PipelineError> {
        artifacts::write_json(&self.pool, &self.ctx.store, run, kind, value).await
    }

    async fn require_gate(&self, run: &PipelineRun, job_type: JobType) -> Result<(), PipelineError> {
        let Some(gate) = job_type.required_gate() else {
            return Ok(());
        };
        if !artifacts::gate_is_open(&self.ctx.store, run, gate).await? {
            return Err(PipelineError::GateClosed {
                run_key: run.run_key.clone(),
                gate: gate.file_name(),
            });
        }
        Ok(())
    }

    async fn transition(
        &self,
        run: &PipelineRun,
        from: RunStage,
        to: RunStage,
        actor: &str,
    ) -> Result<PipelineRun, PipelineError> {
        adapt_core::run::validate_transition(from, to)?;
        let moved = PipelineRunRepo::transition(&self.pool, run.id, from, to)
            .await?
            .ok_or_else(|| {
                CoreError::Conflict(format!(
                    "Run {} is no longer {}",
                    run.run_key,
                    from.name()
                ))
            })?;
        self.events
            .publish(publish::stage_changed(&moved, from, to, actor));
        Ok(moved)
    }

    async fn open_checkpoint(
        &self,
        run: &PipelineRun,
        from: RunStage,
        awaiting: RunStage,
        task_name: &str,
        input_artifacts: serde_json::Value,
        actor: &str,
    ) -> Result<i64, PipelineError> {
        adapt_core::run::validate_transition(from, awaiting)?;
        let task = HitlTaskRepo::open_checkpoint(
            &self.pool,
            from,
            awaiting,
            &CreateHitlTask {
                run_id: run.id,
                task_name: task_name.to_string(),
                assignee: self.ctx.config.assignee.clone(),
                input_artifacts,
            },
        )
        .await?
        .ok_or_else(|| {
            CoreError::Conflict(format!("Run {} is no longer {}", run.run_key, from.name()))
        })?;

        tracing::info!(
            run_key = %run.run_key,
            task_id = task.id,
            task_name,
            assignee = %task.assignee,
            "Run paused for review"
        );
        self.events
            .publish(publish::stage_changed(run, from, awaiting, actor));
        self.events.publish(publish::task_event(
            event_types::HITL_TASK_CREATED,
            &task,
            run,
            actor,
        ));
        Ok(task.id)
    }

    async fn fail_run(&self, run: &PipelineRun, err: &PipelineError, actor: &str) {
        let details = err.details();
        tracing::error!(
            run_key = %run.run_key,
            error_type = %details.error_type,
            error = %err,
            "Run failed"
        );
        let details_json = serde_json::to_value(&details).unwrap_or_default();
        match PipelineRunRepo::fail(&self.pool, run.id, &err.to_string(), Some(&details_json)).await {
            Ok(true) => self.events.publish(
                publish::run_event(event_types::RUN_FAILED, run, actor).with_payload(json!({
                    "run_key": run.run_key,
                    "error": details_json,
                })),
            ),
            Ok(false) => {}
            Err(e) => tracing::error!(run_key = %run.run_key, error = %e, "Failed to record run failure"),
        }
    }
}

/// `{ kind name: uri }` object stored as a task's input artifacts.
fn artifact_map(entries: &[(ArtifactKind, String)]) -> serde_json::Value {
    entries
        .iter()
        .map(|(kind, uri)| (kind.name().to_string(), json!(uri)))
        .collect::<serde_json::Map<_, _>>()
        .into()
}
