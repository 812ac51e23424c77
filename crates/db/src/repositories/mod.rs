//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod artifact_repo;
pub mod creative_repo;
pub mod event_repo;
pub mod hitl_task_repo;
pub mod job_repo;
pub mod run_repo;

pub use artifact_repo::ArtifactRepo;
pub use creative_repo::CreativeRepo;
pub use event_repo::EventRepo;
pub use hitl_task_repo::{ClaimedTask, HitlTaskRepo};
pub use job_repo::JobRepo;
pub use run_repo::PipelineRunRepo;
