#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid object URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
