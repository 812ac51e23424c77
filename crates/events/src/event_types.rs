//! Names of the events published by the pipeline.
//!
//! Every name here is seeded into the `event_types` table by the
//! migrations; unknown names cannot be persisted.

pub const RUN_CREATED: &str = "run.created";
pub const RUN_STAGE_CHANGED: &str = "run.stage_changed";
pub const RUN_COMPLETED: &str = "run.completed";
pub const RUN_FAILED: &str = "run.failed";
pub const RUN_REJECTED: &str = "run.rejected";
pub const HITL_TASK_CREATED: &str = "hitl.task_created";
pub const HITL_TASK_APPROVED: &str = "hitl.task_approved";
pub const HITL_TASK_REJECTED: &str = "hitl.task_rejected";
pub const VIDEO_GENERATED: &str = "video.generated";

pub const ALL: [&str; 9] = [
    RUN_CREATED,
    RUN_STAGE_CHANGED,
    RUN_COMPLETED,
    RUN_FAILED,
    RUN_REJECTED,
    HITL_TASK_CREATED,
    HITL_TASK_APPROVED,
    HITL_TASK_REJECTED,
    VIDEO_GENERATED,
];

/// Source entity kinds attached to events.
pub const ENTITY_RUN: &str = "pipeline_run";
pub const ENTITY_HITL_TASK: &str = "hitl_task";
