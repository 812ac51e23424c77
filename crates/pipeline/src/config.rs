//! Pipeline settings loaded from the environment.

use std::time::Duration;

use adapt_core::hitl::DEFAULT_ASSIGNEE;
use adapt_core::html_text::SCRAPE_CHAR_LIMIT;
use adapt_genai::config::DEFAULT_TEXT_MODEL;
use adapt_genai::PollConfig;

/// Largest landing page or HTTP-hosted image a run will download.
pub const DEFAULT_MAX_FETCH_BYTES: usize = 20 * 1024 * 1024;

/// Where run artifacts are written unless `ARTIFACT_ROOT` says otherwise.
pub const DEFAULT_ARTIFACT_ROOT: &str = "gs://adapt-artifacts/runs";

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Model used for USP extraction, style analysis and brief writing.
    pub text_model: String,
    pub video_poll: PollConfig,
    pub scrape_char_limit: usize,
    pub max_fetch_bytes: usize,
    /// Reviewer assigned to new HITL tasks.
    pub assignee: String,
    pub artifact_root: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            video_poll: PollConfig::default(),
            scrape_char_limit: SCRAPE_CHAR_LIMIT,
            max_fetch_bytes: DEFAULT_MAX_FETCH_BYTES,
            assignee: DEFAULT_ASSIGNEE.to_string(),
            artifact_root: DEFAULT_ARTIFACT_ROOT.to_string(),
        }
    }
}

impl PipelineConfig {
    /// | Env Var                    | Default                      |
    /// |----------------------------|------------------------------|
    /// | `TEXT_MODEL`               | `gemini-2.5-pro`             |
    /// | `VIDEO_POLL_INTERVAL_SECS` | `10`                         |
    /// | `VIDEO_TIMEOUT_SECS`       | `900`                        |
    /// | `SCRAPE_CHAR_LIMIT`        | `2000`                       |
    /// | `MAX_FETCH_BYTES`          | `20971520` (20 MiB)          |
    /// | `HITL_ASSIGNEE`            | `creative_team@example.com`  |
    /// | `ARTIFACT_ROOT`            | `gs://adapt-artifacts/runs`  |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let secs = |name: &str, default: Duration| {
            std::env::var(name)
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(default)
        };

        Self {
            text_model: std::env::var("TEXT_MODEL").unwrap_or(defaults.text_model),
            video_poll: PollConfig {
                interval: secs("VIDEO_POLL_INTERVAL_SECS", defaults.video_poll.interval),
                timeout: secs("VIDEO_TIMEOUT_SECS", defaults.video_poll.timeout),
            },
            scrape_char_limit: std::env::var("SCRAPE_CHAR_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.scrape_char_limit),
            max_fetch_bytes: std::env::var("MAX_FETCH_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.max_fetch_bytes),
            assignee: std::env::var("HITL_ASSIGNEE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.assignee),
            artifact_root: std::env::var("ARTIFACT_ROOT")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.artifact_root),
        }
    }
}
