//! Reviewer decisions on HITL tasks.
//!
//! Every decision first locks the pending task. Approving a checkpoint then
//! writes the (possibly edited) approved artifacts and the gate file, and
//! commits their records with the task decision, the run transition and the
//! next job. Rejection ends the run. A reviewer who loses a race for the same
//! task gets a conflict and writes nothing.

use std::sync::Arc;

use adapt_cloud::ObjectStore;
use adapt_core::analysis::{AnalysisEnvelope, StyleAnalysis, UspAnalysis};
use adapt_core::artifacts::ArtifactKind;
use adapt_core::brief::AdBrief;
use adapt_core::error::CoreError;
use adapt_core::hitl::{self, DECISION_APPROVED, DECISION_REJECTED, TASK_ANALYSIS_REVIEW, TASK_PROMPT_REVIEW};
use adapt_core::job::JobType;
use adapt_core::run::{validate_transition, RunStage};
use adapt_core::types::DbId;
use adapt_core::video_prompt::VideoPrompt;
use adapt_db::models::hitl_task::{HitlTask, TaskDecision};
use adapt_db::models::run::PipelineRun;
use adapt_db::models::status::HitlTaskStatus;
use adapt_db::repositories::{ClaimedTask, HitlTaskRepo, PipelineRunRepo};
use adapt_events::{event_types, EventBus};
use serde::Deserialize;
use sqlx::PgPool;

use crate::artifacts::{self, StoredArtifact};
use crate::error::PipelineError;
use crate::publish;

/// Reviewer edits for the analysis checkpoint. Omitted parts are approved
/// as drafted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisEdits {
    pub usp: Option<UspAnalysis>,
    pub style: Option<StyleAnalysis>,
}

/// Reviewer edits for the prompt checkpoint.
///
/// An edited video prompt wins. Otherwise an edited brief regenerates the
/// prompt, and with no edits the drafted prompt is approved.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptEdits {
    pub brief: Option<AdBrief>,
    pub video_prompt: Option<VideoPrompt>,
}

/// State after a decision has been applied.
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub task: HitlTask,
    pub run: PipelineRun,
}

/// Stage a run waits in while the named task is open.
pub fn awaiting_stage(task_name: &str) -> Result<RunStage, CoreError> {
    match task_name {
        TASK_ANALYSIS_REVIEW => Ok(RunStage::AwaitingAnalysisReview),
        TASK_PROMPT_REVIEW => Ok(RunStage::AwaitingPromptReview),
        other => Err(CoreError::Validation(format!("Unknown task '{other}'"))),
    }
}

pub struct ReviewService {
    pool: PgPool,
    store: Arc<dyn ObjectStore>,
    events: Arc<EventBus>,
}

impl ReviewService {
    pub fn new(pool: PgPool, store: Arc<dyn ObjectStore>, events: Arc<EventBus>) -> Self {
        Self {
            pool,
            store,
            events,
        }
    }

    /// Approve checkpoint 1 and queue brief generation.
    pub async fn approve_analysis(
        &self,
        task_id: DbId,
        reviewer: &str,
        comment: Option<&str>,
        edits: AnalysisEdits,
    ) -> Result<ReviewOutcome, PipelineError> {
        validate_approval(reviewer, comment)?;
        let (claim, run) = self.claim_open_task(task_id, Some(TASK_ANALYSIS_REVIEW)).await?;

        let usp = match edits.usp {
            Some(edited) => edited.normalized(),
            None => {
                artifacts::read_json::<AnalysisEnvelope<UspAnalysis>>(&self.store, &run, ArtifactKind::UspAnalysis)
                    .await?
                    .analysis
            }
        };
        let style = match edits.style {
            Some(edited) => edited.normalized(),
            None => {
                artifacts::read_json::<AnalysisEnvelope<StyleAnalysis>>(
                    &self.store,
                    &run,
                    ArtifactKind::StyleAnalysis,
                )
                .await?
                .analysis
            }
        };
        usp.validate()?;
        style.validate()?;

        let approved = [
            artifacts::store_json(
                &self.store,
                &run,
                ArtifactKind::UspAnalysisApproved,
                &AnalysisEnvelope::new(usp),
            )
            .await?,
            artifacts::store_json(
                &self.store,
                &run,
                ArtifactKind::StyleAnalysisApproved,
                &AnalysisEnvelope::new(style),
            )
            .await?,
        ];

        self.approve(
            claim,
            run,
            &approved,
            reviewer,
            comment,
            (RunStage::GeneratingBrief, JobType::GenerateBrief),
        )
        .await
    }

    /// Approve checkpoint 2 and queue video generation.
    pub async fn approve_prompt(
        &self,
        task_id: DbId,
        reviewer: &str,
        comment: Option<&str>,
        edits: PromptEdits,
    ) -> Result<ReviewOutcome, PipelineError> {
        validate_approval(reviewer, comment)?;
        let (claim, run) = self.claim_open_task(task_id, Some(TASK_PROMPT_REVIEW)).await?;

        let brief_edited = edits.brief.is_some();
        let mut brief = match edits.brief {
            Some(edited) => edited,
            None => artifacts::read_json::<AdBrief>(&self.store, &run, ArtifactKind::AdBrief).await?,
        };
        brief.campaign_id = run.campaign_id.clone();
        brief.product_id = run.product_id.clone();
        brief.metadata.approved_by = Some(reviewer.trim().to_string());
        brief.validate()?;

        let prompt = match edits.video_prompt {
            Some(edited) => edited,
            None if brief_edited => VideoPrompt::from_brief(&brief),
            None => {
                artifacts::read_json::<VideoPrompt>(&self.store, &run, ArtifactKind::VideoPromptDraft)
                    .await?
            }
        };
        prompt.validate()?;

        let approved = [
            artifacts::store_json(&self.store, &run, ArtifactKind::AdBriefApproved, &brief).await?,
            artifacts::store_json(&self.store, &run, ArtifactKind::VideoPromptApproved, &prompt)
                .await?,
        ];

        self.approve(
            claim,
            run,
            &approved,
            reviewer,
            comment,
            (RunStage::GeneratingVideo, JobType::GenerateVideo),
        )
        .await
    }

    /// Reject either checkpoint. The run ends in `rejected`.
    pub async fn reject(
        &self,
        task_id: DbId,
        reviewer: &str,
        comment: &str,
    ) -> Result<ReviewOutcome, PipelineError> {
        hitl::validate_reviewer(reviewer)?;
        hitl::validate_comment(DECISION_REJECTED, Some(comment))?;
        let (claim, run) = self.claim_open_task(task_id, None).await?;
        let from = awaiting_stage(&claim.task.task_name)?;
        validate_transition(from, RunStage::Rejected)?;

        let decision = TaskDecision {
            status: HitlTaskStatus::Rejected,
            decided_by: reviewer.trim(),
            comment: Some(comment.trim()),
        };
        let outcome = self
            .resolve(claim, &[], &decision, from, RunStage::Rejected, None)
            .await?;

        tracing::info!(run_key = %run.run_key, task_id, reviewer, "Run rejected");
        self.events.publish(publish::task_event(
            event_types::HITL_TASK_REJECTED,
            &outcome.task,
            &outcome.run,
            reviewer,
        ));
        self.events
            .publish(publish::stage_changed(&outcome.run, from, RunStage::Rejected, reviewer));
        self.events.publish(
            publish::run_event(event_types::RUN_REJECTED, &outcome.run, reviewer).with_payload(
                serde_json::json!({
                    "run_key": outcome.run.run_key,
                    "task_name": outcome.task.task_name,
                    "comment": comment.trim(),
                }),
            ),
        );
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Lock a pending task and load its run, checking the run is still
    /// waiting on it. The lock is held until the claim is resolved or dropped.
    async fn claim_open_task(
        &self,
        task_id: DbId,
        expected_name: Option<&str>,
    ) -> Result<(ClaimedTask, PipelineRun), PipelineError> {
        let task = HitlTaskRepo::find_by_id(&self.pool, task_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "hitl_task",
                id: task_id,
            })?;
        if let Some(expected) = expected_name {
            if task.task_name != expected {
                return Err(CoreError::Validation(format!(
                    "Task {task_id} is a {} task, not {expected}",
                    task.task_name
                ))
                .into());
            }
        }

        let claim = HitlTaskRepo::claim_pending(&self.pool, task_id)
            .await?
            .ok_or_else(|| CoreError::Conflict(format!("Task {task_id} has already been decided")))?;

        let run = PipelineRunRepo::find_by_id(&self.pool, claim.task.run_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "pipeline_run",
                id: claim.task.run_id,
            })?;
        let awaiting = awaiting_stage(&claim.task.task_name)?;
        if run.stage()? != awaiting {
            return Err(CoreError::Conflict(format!(
                "Run {} is {}, not {}",
                run.run_key,
                run.stage()?.name(),
                awaiting.name()
            ))
            .into());
        }
        Ok((claim, run))
    }

    async fn approve(
        &self,
        claim: ClaimedTask,
        run: PipelineRun,
        approved: &[StoredArtifact],
        reviewer: &str,
        comment: Option<&str>,
        (to, next_job): (RunStage, JobType),
    ) -> Result<ReviewOutcome, PipelineError> {
        let task_id = claim.task.id;
        let from = awaiting_stage(&claim.task.task_name)?;
        validate_transition(from, to)?;
        let gate = hitl::gate_for_task(&claim.task.task_name)?;

        let mut recorded = approved.to_vec();
        recorded.push(artifacts::store_gate(&self.store, &run, gate).await?);

        let comment = comment.map(str::trim).filter(|c| !c.is_empty());
        let decision = TaskDecision {
            status: HitlTaskStatus::Approved,
            decided_by: reviewer.trim(),
            comment,
        };
        let outcome = match self
            .resolve(claim, &recorded, &decision, from, to, Some(next_job))
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                if let Err(cleanup) = artifacts::remove_gate(&self.store, &run, gate).await {
                    tracing::warn!(
                        run_key = %run.run_key,
                        gate = gate.file_name(),
                        error = %cleanup,
                        "Failed to remove gate after an aborted approval"
                    );
                }
                return Err(err);
            }
        };

        tracing::info!(
            run_key = %run.run_key,
            task_id,
            reviewer,
            decision = DECISION_APPROVED,
            gate = gate.file_name(),
            %next_job,
            "Checkpoint approved"
        );
        self.events.publish(publish::task_event(
            event_types::HITL_TASK_APPROVED,
            &outcome.task,
            &outcome.run,
            reviewer,
        ));
        self.events
            .publish(publish::stage_changed(&outcome.run, from, to, reviewer));
        Ok(outcome)
    }

    /// Record `stored` and apply the decision in the claim's transaction.
    async fn resolve(
        &self,
        mut claim: ClaimedTask,
        stored: &[StoredArtifact],
        decision: &TaskDecision<'_>,
        from: RunStage,
        to: RunStage,
        next_job: Option<JobType>,
    ) -> Result<ReviewOutcome, PipelineError> {
        let (task_id, run_id) = (claim.task.id, claim.task.run_id);
        let conflict = || {
            CoreError::Conflict(format!("Run {run_id} changed while task {task_id} was decided"))
        };
        for artifact in stored {
            artifact.record_in(&mut claim).await?;
        }
        let decided = claim
            .resolve(decision, from, to, next_job)
            .await?
            .ok_or_else(conflict)?;
        let run = PipelineRunRepo::find_by_id(&self.pool, run_id)
            .await?
            .ok_or_else(conflict)?;
        Ok(ReviewOutcome { task: decided, run })
    }
}

fn validate_approval(reviewer: &str, comment: Option<&str>) -> Result<(), CoreError> {
    hitl::validate_reviewer(reviewer)?;
    hitl::validate_comment(DECISION_APPROVED, comment)
}
