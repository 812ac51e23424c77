//! Domain types, constants, and validation for the AdAPT ad generation
//! pipeline.
//!
//! This crate has no I/O. It is shared by the database layer, the pipeline
//! stages, the worker, and the HTTP API.

pub mod analysis;
pub mod artifacts;
pub mod brief;
pub mod creative;
pub mod error;
pub mod hitl;
pub mod html_text;
pub mod job;
pub mod model_output;
pub mod run;
pub mod types;
pub mod video_prompt;
