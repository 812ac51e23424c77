use adapt_core::video_prompt::VideoPrompt;
use async_trait::async_trait;

use crate::error::GenAiError;
use crate::types::{GenerateRequest, OperationStatus, VideoOperation};

/// A model that answers a (possibly multimodal) prompt with text.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> Result<String, GenAiError>;
}

/// A model that renders video asynchronously.
#[async_trait]
pub trait VideoModel: Send + Sync {
    async fn start(&self, prompt: &VideoPrompt) -> Result<VideoOperation, GenAiError>;

    async fn poll(&self, operation: &VideoOperation) -> Result<OperationStatus, GenAiError>;
}
