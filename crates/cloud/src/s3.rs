//! S3-compatible object store.
//!
//! `gs://` URIs are served through the same client, which works against
//! Cloud Storage's S3 interoperability endpoint when `S3_ENDPOINT` points
//! there.

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use crate::config::S3Settings;
use crate::error::StorageError;
use crate::store::ObjectStore;
use crate::uri::{ObjectUri, Scheme};

pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Build a client from settings, falling back to the default AWS
    /// credential chain when no static keys are configured.
    pub async fn connect(settings: &S3Settings) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(settings.region.clone()));

        if let (Some(access_key), Some(secret_key)) =
            (&settings.access_key_id, &settings.secret_access_key)
        {
            loader = loader.credentials_provider(aws_credential_types::Credentials::new(
                access_key.clone(),
                secret_key.clone(),
                None,
                None,
                "adapt-env",
            ));
        }

        let shared = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(settings.force_path_style);
        if let Some(endpoint) = &settings.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        tracing::info!(
            region = %settings.region,
            endpoint = settings.endpoint.as_deref().unwrap_or("default"),
            "S3 object store configured"
        );
        Self {
            client: Client::from_conf(builder.build()),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    fn locate(uri: &str) -> Result<ObjectUri, StorageError> {
        let parsed = ObjectUri::parse(uri)?;
        if parsed.scheme == Scheme::File {
            return Err(StorageError::InvalidUri {
                uri: uri.to_string(),
                reason: "file URIs are not served by the S3 backend".to_string(),
            });
        }
        Ok(parsed)
    }
}

fn backend_error<E: std::error::Error>(err: E) -> StorageError {
    StorageError::Backend(DisplayErrorContext(err).to_string())
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, uri: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        let target = Self::locate(uri)?;
        self.client
            .put_object()
            .bucket(&target.bucket)
            .key(&target.key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(backend_error)?;
        tracing::debug!(uri, "Uploaded object");
        Ok(())
    }

    async fn get(&self, uri: &str) -> Result<Vec<u8>, StorageError> {
        let target = Self::locate(uri)?;
        let output = self
            .client
            .get_object()
            .bucket(&target.bucket)
            .key(&target.key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    StorageError::NotFound(uri.to_string())
                } else {
                    backend_error(e)
                }
            })?;
        let data = output.body.collect().await.map_err(backend_error)?;
        Ok(data.into_bytes().to_vec())
    }

    async fn exists(&self, uri: &str) -> Result<bool, StorageError> {
        let target = Self::locate(uri)?;
        match self
            .client
            .head_object()
            .bucket(&target.bucket)
            .key(&target.key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => Err(backend_error(e)),
        }
    }

    async fn delete(&self, uri: &str) -> Result<(), StorageError> {
        let target = Self::locate(uri)?;
        self.client
            .delete_object()
            .bucket(&target.bucket)
            .key(&target.key)
            .send()
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    fn supports(&self, uri: &ObjectUri) -> bool {
        uri.scheme != Scheme::File
    }
}
