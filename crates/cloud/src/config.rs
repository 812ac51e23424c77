//! Storage backend selection from the environment.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::StorageError;
use crate::local::LocalObjectStore;
use crate::s3::S3ObjectStore;
use crate::store::ObjectStore;

#[derive(Debug, Clone)]
pub struct S3Settings {
    pub region: String,
    pub endpoint: Option<String>,
    pub force_path_style: bool,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

#[derive(Debug, Clone)]
pub enum StorageConfig {
    Local { base_dir: PathBuf },
    S3(S3Settings),
}

impl StorageConfig {
    /// Load storage configuration from environment variables.
    ///
    /// | Env Var                | Default          |
    /// |------------------------|------------------|
    /// | `STORAGE_BACKEND`      | `local`          |
    /// | `LOCAL_STORAGE_DIR`    | `./data/storage` |
    /// | `S3_REGION`            | `us-east-1`      |
    /// | `S3_ENDPOINT`          | (AWS default)    |
    /// | `S3_FORCE_PATH_STYLE`  | `false`          |
    /// | `S3_ACCESS_KEY_ID`     | (credential chain) |
    /// | `S3_SECRET_ACCESS_KEY` | (credential chain) |
    pub fn from_env() -> Result<Self, StorageError> {
        let backend = std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "local".into());
        match backend.as_str() {
            "local" => Ok(Self::Local {
                base_dir: std::env::var("LOCAL_STORAGE_DIR")
                    .unwrap_or_else(|_| "./data/storage".into())
                    .into(),
            }),
            "s3" => Ok(Self::S3(S3Settings {
                region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".into()),
                endpoint: std::env::var("S3_ENDPOINT").ok().filter(|v| !v.is_empty()),
                force_path_style: std::env::var("S3_FORCE_PATH_STYLE")
                    .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE"))
                    .unwrap_or(false),
                access_key_id: std::env::var("S3_ACCESS_KEY_ID").ok(),
                secret_access_key: std::env::var("S3_SECRET_ACCESS_KEY").ok(),
            })),
            other => Err(StorageError::Backend(format!(
                "Unknown STORAGE_BACKEND '{other}'. Must be one of: local, s3"
            ))),
        }
    }

    /// Instantiate the configured backend.
    pub async fn build(&self) -> Arc<dyn ObjectStore> {
        match self {
            Self::Local { base_dir } => {
                tracing::info!(base_dir = %base_dir.display(), "Using local object store");
                Arc::new(LocalObjectStore::new(base_dir.clone()))
            }
            Self::S3(settings) => Arc::new(S3ObjectStore::connect(settings).await),
        }
    }
}
