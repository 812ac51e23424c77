//! Filesystem-backed object store for development and tests.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::StorageError;
use crate::store::ObjectStore;
use crate::uri::{ObjectUri, Scheme};

/// Maps `{scheme}://{bucket}/{key}` to `{base_dir}/{bucket}/{key}`.
/// `file://` URIs map straight to their path.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    base_dir: PathBuf,
}

impl LocalObjectStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn path_for(&self, uri: &str) -> Result<PathBuf, StorageError> {
        let parsed = ObjectUri::parse(uri)?;
        Ok(match parsed.scheme {
            Scheme::File => PathBuf::from(parsed.key),
            Scheme::Gs | Scheme::S3 => self.base_dir.join(&parsed.bucket).join(&parsed.key),
        })
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(
        &self,
        uri: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        let path = self.path_for(uri)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(uri, path = %path.display(), "Wrote object");
        Ok(())
    }

    async fn get(&self, uri: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(uri)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(uri.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, uri: &str) -> Result<bool, StorageError> {
        let path = self.path_for(uri)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    async fn delete(&self, uri: &str) -> Result<(), StorageError> {
        let path = self.path_for(uri)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;

    use super::*;

    fn store() -> (tempfile::TempDir, Arc<dyn ObjectStore>, LocalObjectStore) {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalObjectStore::new(dir.path());
        (dir, Arc::new(local.clone()), local)
    }

    #[tokio::test]
    async fn put_get_round_trip_creates_parents() {
        let (_dir, store, local) = store();
        store
            .put("gs://runs/run-1/final_video.mp4", vec![1, 2, 3], "video/mp4")
            .await
            .unwrap();

        let path = local.path_for("gs://runs/run-1/final_video.mp4").unwrap();
        assert!(path.ends_with("runs/run-1/final_video.mp4"));
        assert_eq!(store.get("gs://runs/run-1/final_video.mp4").await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn missing_object_is_not_found() {
        let (_dir, store, _) = store();
        assert_matches!(store.get("s3://b/missing.json").await, Err(StorageError::NotFound(_)));
        assert!(!store.exists("s3://b/missing.json").await.unwrap());
        store.delete("s3://b/missing.json").await.unwrap();
    }

    #[tokio::test]
    async fn json_and_text_helpers() {
        let (_dir, store, _) = store();
        let value = serde_json::json!({"usps": ["fast"]});
        let written = store.put_json("gs://b/r/a.json", &value).await.unwrap();
        assert!(written > 0);
        let back: serde_json::Value = store.get_json("gs://b/r/a.json").await.unwrap();
        assert_eq!(back, value);

        store.put_text("gs://b/r/approval_gate_1.txt", "approved").await.unwrap();
        assert!(store.exists("gs://b/r/approval_gate_1.txt").await.unwrap());
        store.delete("gs://b/r/approval_gate_1.txt").await.unwrap();
        assert!(!store.exists("gs://b/r/approval_gate_1.txt").await.unwrap());
    }

    #[tokio::test]
    async fn file_uris_map_to_their_path() {
        let (dir, store, _) = store();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, b"png").unwrap();
        let uri = format!("file://{}", path.display());
        assert_eq!(store.get(&uri).await.unwrap(), b"png");
    }

    #[test]
    fn bucket_cannot_escape_the_base_dir() {
        let local = LocalObjectStore::new("/srv/adapt/objects");
        assert_matches!(
            local.path_for("gs://../secrets/key.png"),
            Err(StorageError::InvalidUri { .. })
        );
        assert_matches!(local.path_for("s3://./key.png"), Err(StorageError::InvalidUri { .. }));
        assert_eq!(
            local.path_for("gs://brand/logo.png").unwrap(),
            PathBuf::from("/srv/adapt/objects/brand/logo.png")
        );
    }
}
