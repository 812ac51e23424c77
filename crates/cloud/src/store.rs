//! The storage trait and typed helpers.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorageError;
use crate::uri::ObjectUri;

/// Byte-level access to objects addressed by URI.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, uri: &str, bytes: Vec<u8>, content_type: &str)
        -> Result<(), StorageError>;

    /// Fails with [`StorageError::NotFound`] when the object does not exist.
    async fn get(&self, uri: &str) -> Result<Vec<u8>, StorageError>;

    async fn exists(&self, uri: &str) -> Result<bool, StorageError>;

    /// Deleting a missing object is not an error.
    async fn delete(&self, uri: &str) -> Result<(), StorageError>;

    /// Whether this backend can serve `uri` at all.
    fn supports(&self, _uri: &ObjectUri) -> bool {
        true
    }
}

impl dyn ObjectStore {
    /// Write `value` as pretty-printed JSON. Returns the number of bytes written.
    pub async fn put_json<T: Serialize + ?Sized>(
        &self,
        uri: &str,
        value: &T,
    ) -> Result<usize, StorageError> {
        let bytes = serde_json::to_vec_pretty(value)?;
        let len = bytes.len();
        self.put(uri, bytes, "application/json").await?;
        Ok(len)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, uri: &str) -> Result<T, StorageError> {
        let bytes = self.get(uri).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn put_text(&self, uri: &str, text: &str) -> Result<usize, StorageError> {
        self.put(uri, text.as_bytes().to_vec(), "text/plain").await?;
        Ok(text.len())
    }
}
