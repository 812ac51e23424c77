//! Polling loop for long-running video generation.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::GenAiError;
use crate::model::VideoModel;
use crate::types::{GeneratedVideo, OperationStatus, VideoOperation};

#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(900),
        }
    }
}

/// Poll `operation` until it finishes, the timeout elapses, or `cancel`
/// fires. Returns the generated videos on success.
pub async fn wait_for_video(
    model: &dyn VideoModel,
    operation: &VideoOperation,
    config: PollConfig,
    cancel: &CancellationToken,
) -> Result<Vec<GeneratedVideo>, GenAiError> {
    let deadline = Instant::now() + config.timeout;
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        match model.poll(operation).await? {
            OperationStatus::Succeeded(videos) => {
                tracing::info!(operation = %operation.name, attempts, "Video generation complete");
                return Ok(videos);
            }
            OperationStatus::Failed(reason) => {
                tracing::warn!(operation = %operation.name, %reason, "Video generation failed");
                return Err(GenAiError::GenerationFailed(reason));
            }
            OperationStatus::Running => {}
        }

        if Instant::now() + config.interval > deadline {
            return Err(GenAiError::Timeout(config.timeout.as_secs()));
        }

        tracing::debug!(operation = %operation.name, attempts, "Waiting for video generation");
        tokio::select! {
            _ = cancel.cancelled() => return Err(GenAiError::Cancelled),
            _ = tokio::time::sleep(config.interval) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use adapt_core::video_prompt::VideoPrompt;
    use assert_matches::assert_matches;
    use async_trait::async_trait;

    use super::*;

    /// Reports `Running` for the first `running_polls` calls, then `last`.
    struct ScriptedVideoModel {
        polls: AtomicU32,
        running_polls: u32,
        last: OperationStatus,
    }

    #[async_trait]
    impl VideoModel for ScriptedVideoModel {
        async fn start(&self, _prompt: &VideoPrompt) -> Result<VideoOperation, GenAiError> {
            Ok(VideoOperation { name: "op".into() })
        }

        async fn poll(&self, _op: &VideoOperation) -> Result<OperationStatus, GenAiError> {
            let n = self.polls.fetch_add(1, Ordering::SeqCst);
            if n < self.running_polls {
                Ok(OperationStatus::Running)
            } else {
                Ok(self.last.clone())
            }
        }
    }

    fn fast() -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(5),
            timeout: Duration::from_secs(5),
        }
    }

    fn op() -> VideoOperation {
        VideoOperation { name: "op".into() }
    }

    #[tokio::test]
    async fn returns_videos_after_running_polls() {
        let model = ScriptedVideoModel {
            polls: AtomicU32::new(0),
            running_polls: 3,
            last: OperationStatus::Succeeded(vec![GeneratedVideo::Bytes(vec![7])]),
        };
        let videos = wait_for_video(&model, &op(), fast(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(videos, vec![GeneratedVideo::Bytes(vec![7])]);
        assert_eq!(model.polls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn failure_is_reported() {
        let model = ScriptedVideoModel {
            polls: AtomicU32::new(0),
            running_polls: 0,
            last: OperationStatus::Failed("blocked".into()),
        };
        let err = wait_for_video(&model, &op(), fast(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_matches!(err, GenAiError::GenerationFailed(reason) if reason == "blocked");
    }

    #[tokio::test]
    async fn times_out() {
        let model = ScriptedVideoModel {
            polls: AtomicU32::new(0),
            running_polls: u32::MAX,
            last: OperationStatus::Running,
        };
        let config = PollConfig {
            interval: Duration::from_millis(10),
            timeout: Duration::from_millis(30),
        };
        let err = wait_for_video(&model, &op(), config, &CancellationToken::new())
            .await
            .unwrap_err();
        assert_matches!(err, GenAiError::Timeout(_));
    }

    #[tokio::test]
    async fn cancellation_stops_polling() {
        let model = ScriptedVideoModel {
            polls: AtomicU32::new(0),
            running_polls: u32::MAX,
            last: OperationStatus::Running,
        };
        let cancel = CancellationToken::new();
        cancel.cancel();
        let config = PollConfig {
            interval: Duration::from_secs(60),
            timeout: Duration::from_secs(600),
        };
        let err = wait_for_video(&model, &op(), config, &cancel).await.unwrap_err();
        assert_matches!(err, GenAiError::Cancelled);
        assert_eq!(model.polls.load(Ordering::SeqCst), 1);
    }
}
