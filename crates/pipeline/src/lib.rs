//! The ad-generation pipeline: stage implementations, the job orchestrator
//! and the reviewer actions that resume a paused run.
//!
//! A run moves through three background jobs (`analyze`, `generate_brief`,
//! `generate_video`) separated by two human checkpoints. Every stage reads
//! and writes its inputs and outputs as artifacts in object storage.

pub mod artifacts;
pub mod config;
pub mod context;
pub mod error;
pub mod orchestrator;
pub mod prompts;
mod publish;
pub mod review;
pub mod stages;
pub mod submit;

pub use config::PipelineConfig;
pub use context::PipelineContext;
pub use error::PipelineError;
pub use orchestrator::Orchestrator;
pub use submit::{submit_run, SubmitRun};
