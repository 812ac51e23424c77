//! Clients for the generative-AI services the pipeline calls.
//!
//! Two seams: [`TextModel`] (text and vision prompts, answered with text)
//! and [`VideoModel`] (long-running video generation). [`VertexClient`]
//! implements both over the Vertex AI REST API; [`VideoJobsClient`] speaks
//! a plain job-queue video API.

pub mod config;
pub mod error;
mod http;
pub mod model;
pub mod poll;
pub mod types;
pub mod vertex;
pub mod video_jobs;

pub use config::{GenAiConfig, VideoBackend};
pub use error::{ErrorDetails, GenAiError};
pub use model::{TextModel, VideoModel};
pub use poll::{wait_for_video, PollConfig};
pub use types::{GenerateRequest, GeneratedVideo, OperationStatus, Part, VideoOperation};
pub use vertex::VertexClient;
pub use video_jobs::VideoJobsClient;
