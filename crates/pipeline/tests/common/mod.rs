use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use adapt_cloud::{LocalObjectStore, ObjectStore};
use adapt_core::video_prompt::VideoPrompt;
use adapt_events::EventBus;
use adapt_genai::{
    GenAiError, GenerateRequest, GeneratedVideo, OperationStatus, PollConfig, TextModel,
    VideoModel, VideoOperation,
};
use adapt_pipeline::review::ReviewService;
use adapt_pipeline::{Orchestrator, PipelineConfig, PipelineContext};
use async_trait::async_trait;
use sqlx::PgPool;

pub const USP_RESPONSE: &str =
    r#"{"usps": ["Waterproof for life", "Weighs 300 g"], "emotions": ["confidence"]}"#;

pub const STYLE_RESPONSE: &str = r##"{
    "dominant_colors": [{"hex_code": "#1A2B3C", "name": "navy"}],
    "font_style": "Geometric sans",
    "tone_of_voice": "Adventurous",
    "aesthetic": "Rugged outdoor"
}"##;

pub const BRIEF_RESPONSE: &str = r##"{
    "creativeConcept": {
        "hook": "Rain? Bring it.",
        "coreMessage": "Dry feet on every trail",
        "callToAction": {"text": "Shop now", "url": "https://shop.example.com/boots"}
    },
    "script": [
        {"scene": 1, "duration_seconds": 3, "visuals": "Boots splash through a puddle", "voiceover": "Rain?"},
        {"scene": 2, "duration_seconds": 4, "visuals": "Hiker reaches a misty summit", "voiceover": "Bring it."}
    ],
    "styleGuidance": {"tone": "Adventurous", "dominantColors": ["#1A2B3C"], "fontStyle": "Geometric sans"}
}"##;

pub const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

pub struct ScriptedTextModel {
    responses: Mutex<VecDeque<Result<String, u16>>>,
}

impl ScriptedTextModel {
    pub fn new(responses: Vec<Result<&str, u16>>) -> Self {
        Self {
            responses: Mutex::new(
                responses
                    .into_iter()
                    .map(|r| r.map(str::to_string))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl TextModel for ScriptedTextModel {
    async fn generate(&self, _request: GenerateRequest) -> Result<String, GenAiError> {
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(status)) => Err(GenAiError::Api {
                status,
                body: "scripted failure".into(),
            }),
            None => Err(GenAiError::Parse("no scripted response left".into())),
        }
    }
}

#[derive(Default)]
pub struct RecordingVideoModel {
    pub prompts: Mutex<Vec<VideoPrompt>>,
}

#[async_trait]
impl VideoModel for RecordingVideoModel {
    async fn start(&self, prompt: &VideoPrompt) -> Result<VideoOperation, GenAiError> {
        self.prompts.lock().unwrap().push(prompt.clone());
        Ok(VideoOperation {
            name: "operations/fake".into(),
        })
    }

    async fn poll(&self, _operation: &VideoOperation) -> Result<OperationStatus, GenAiError> {
        Ok(OperationStatus::Succeeded(vec![GeneratedVideo::Bytes(
            b"fake-mp4".to_vec(),
        )]))
    }
}

pub struct Harness {
    pub pool: PgPool,
    pub store: Arc<dyn ObjectStore>,
    pub events: Arc<EventBus>,
    pub video: Arc<RecordingVideoModel>,
    pub orchestrator: Orchestrator,
    pub review: ReviewService,
    pub config: PipelineConfig,
    _dir: tempfile::TempDir,
}

pub async fn harness(pool: PgPool, text: impl TextModel + 'static) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn ObjectStore> = Arc::new(LocalObjectStore::new(dir.path()));
    store
        .put("gs://brand/logo.png", PNG_MAGIC.to_vec(), "image/png")
        .await
        .unwrap();

    let config = PipelineConfig {
        artifact_root: "gs://artifacts/runs".into(),
        video_poll: PollConfig {
            interval: Duration::from_millis(1),
            timeout: Duration::from_secs(1),
        },
        ..PipelineConfig::default()
    };
    let video = Arc::new(RecordingVideoModel::default());
    let events = Arc::new(EventBus::default());
    let ctx = Arc::new(PipelineContext {
        store: Arc::clone(&store),
        text_model: Arc::new(text),
        video_model: video.clone(),
        http: reqwest::Client::new(),
        config: config.clone(),
    });

    Harness {
        orchestrator: Orchestrator::new(pool.clone(), ctx, Arc::clone(&events)),
        review: ReviewService::new(pool.clone(), Arc::clone(&store), Arc::clone(&events)),
        pool,
        store,
        events,
        video,
        config,
        _dir: dir,
    }
}
