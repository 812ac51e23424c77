//! Builders for the events the pipeline publishes.

use adapt_core::run::RunStage;
use adapt_db::models::hitl_task::HitlTask;
use adapt_db::models::run::PipelineRun;
use adapt_events::event_types::{self, ENTITY_HITL_TASK, ENTITY_RUN};
use adapt_events::PlatformEvent;
use serde_json::json;

pub fn run_event(event_type: &str, run: &PipelineRun, actor: &str) -> PlatformEvent {
    PlatformEvent::new(event_type)
        .with_source(ENTITY_RUN, run.id)
        .with_actor(actor)
        .with_payload(json!({ "run_key": run.run_key }))
}

pub fn stage_changed(run: &PipelineRun, from: RunStage, to: RunStage, actor: &str) -> PlatformEvent {
    PlatformEvent::new(event_types::RUN_STAGE_CHANGED)
        .with_source(ENTITY_RUN, run.id)
        .with_actor(actor)
        .with_payload(json!({
            "run_key": run.run_key,
            "from": from.name(),
            "to": to.name(),
        }))
}

pub fn task_event(event_type: &str, task: &HitlTask, run: &PipelineRun, actor: &str) -> PlatformEvent {
    PlatformEvent::new(event_type)
        .with_source(ENTITY_HITL_TASK, task.id)
        .with_actor(actor)
        .with_payload(json!({
            "run_id": run.id,
            "run_key": run.run_key,
            "task_name": task.task_name,
            "assignee": task.assignee,
            "input_artifacts": task.input_artifacts,
            "comment": task.decision_comment,
        }))
}
