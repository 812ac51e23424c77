//! Object storage for run artifacts and brand assets.
//!
//! Artifacts are addressed by URI (`gs://`, `s3://`, `file://`). The
//! [`ObjectStore`] trait hides whether they live on the local filesystem or
//! in an S3-compatible bucket.

pub mod config;
pub mod error;
pub mod local;
pub mod s3;
pub mod store;
pub mod uri;

pub use config::StorageConfig;
pub use error::StorageError;
pub use local::LocalObjectStore;
pub use s3::S3ObjectStore;
pub use store::ObjectStore;
pub use uri::{ObjectUri, Scheme};
