//! Request and response types shared by all model clients.

use serde::{Deserialize, Serialize};

/// One piece of multimodal prompt content.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    InlineData { mime_type: String, data: Vec<u8> },
}

impl Part {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub parts: Vec<Part>,
    /// Ask the model to answer with `application/json`.
    pub json_response: bool,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, parts: Vec<Part>) -> Self {
        Self {
            model: model.into(),
            parts,
            json_response: false,
        }
    }

    pub fn json(mut self) -> Self {
        self.json_response = true;
        self
    }
}

/// Handle to a started video generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoOperation {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedVideo {
    Bytes(Vec<u8>),
    /// `gs://`, `s3://` or HTTP(S) location of the clip.
    Uri(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus {
    Running,
    Succeeded(Vec<GeneratedVideo>),
    Failed(String),
}
