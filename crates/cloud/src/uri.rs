//! Object URI parsing.

use std::fmt;

use crate::error::StorageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Gs,
    S3,
    File,
}

impl Scheme {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Gs => "gs://",
            Self::S3 => "s3://",
            Self::File => "file://",
        }
    }
}

/// A parsed `gs://bucket/key`, `s3://bucket/key` or `file:///abs/path`.
///
/// For `file://` URIs the bucket is empty and the key is the absolute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectUri {
    pub scheme: Scheme,
    pub bucket: String,
    pub key: String,
}

impl ObjectUri {
    pub fn parse(uri: &str) -> Result<Self, StorageError> {
        let invalid = |reason: &str| StorageError::InvalidUri {
            uri: uri.to_string(),
            reason: reason.to_string(),
        };

        if let Some(path) = uri.strip_prefix(Scheme::File.prefix()) {
            if !path.starts_with('/') || path.len() < 2 {
                return Err(invalid("file URIs must carry an absolute path"));
            }
            return Ok(Self {
                scheme: Scheme::File,
                bucket: String::new(),
                key: path.to_string(),
            });
        }

        let (scheme, rest) = if let Some(rest) = uri.strip_prefix(Scheme::Gs.prefix()) {
            (Scheme::Gs, rest)
        } else if let Some(rest) = uri.strip_prefix(Scheme::S3.prefix()) {
            (Scheme::S3, rest)
        } else {
            return Err(invalid("expected a gs://, s3:// or file:// URI"));
        };

        let (bucket, key) = rest.split_once('/').ok_or_else(|| invalid("missing object key"))?;
        if bucket.is_empty() {
            return Err(invalid("missing bucket"));
        }
        if bucket == "." || bucket == ".." || bucket.contains('\\') {
            return Err(invalid("bucket must be a plain name"));
        }
        let key = key.trim_start_matches('/');
        if key.is_empty() {
            return Err(invalid("missing object key"));
        }
        if key.split(['/', '\\']).any(|segment| segment == "..") {
            return Err(invalid("object key must not contain '..'"));
        }

        Ok(Self {
            scheme,
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }

    /// `true` for URIs this crate can resolve (as opposed to HTTP URLs).
    pub fn is_object_uri(value: &str) -> bool {
        [Scheme::Gs, Scheme::S3, Scheme::File]
            .iter()
            .any(|s| value.starts_with(s.prefix()))
    }
}

impl fmt::Display for ObjectUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scheme {
            Scheme::File => write!(f, "file://{}", self.key),
            scheme => write!(f, "{}{}/{}", scheme.prefix(), self.bucket, self.key),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parses_bucket_uris() {
        let uri = ObjectUri::parse("gs://adapt-runs/run-1/ad_brief.json").unwrap();
        assert_eq!(uri.scheme, Scheme::Gs);
        assert_eq!(uri.bucket, "adapt-runs");
        assert_eq!(uri.key, "run-1/ad_brief.json");
        assert_eq!(uri.to_string(), "gs://adapt-runs/run-1/ad_brief.json");

        let s3 = ObjectUri::parse("s3://b/k").unwrap();
        assert_eq!(s3.scheme, Scheme::S3);
    }

    #[test]
    fn parses_file_uris() {
        let uri = ObjectUri::parse("file:///tmp/brand/logo.png").unwrap();
        assert_eq!(uri.scheme, Scheme::File);
        assert_eq!(uri.key, "/tmp/brand/logo.png");
        assert_eq!(uri.to_string(), "file:///tmp/brand/logo.png");
    }

    #[test]
    fn rejects_malformed_uris() {
        assert_matches!(ObjectUri::parse("gs://bucket"), Err(StorageError::InvalidUri { .. }));
        assert_matches!(ObjectUri::parse("gs:///key"), Err(StorageError::InvalidUri { .. }));
        assert_matches!(ObjectUri::parse("gs://bucket/"), Err(StorageError::InvalidUri { .. }));
        assert_matches!(ObjectUri::parse("https://x/y"), Err(StorageError::InvalidUri { .. }));
        assert_matches!(ObjectUri::parse("file://relative"), Err(StorageError::InvalidUri { .. }));
        assert_matches!(ObjectUri::parse("s3://b/../etc"), Err(StorageError::InvalidUri { .. }));
        assert_matches!(ObjectUri::parse("s3://b/a\\..\\etc"), Err(StorageError::InvalidUri { .. }));
        assert_matches!(ObjectUri::parse("gs://../secrets/key.png"), Err(StorageError::InvalidUri { .. }));
        assert_matches!(ObjectUri::parse("gs://./key.png"), Err(StorageError::InvalidUri { .. }));
        assert_matches!(ObjectUri::parse("gs://b\\..\\x/key.png"), Err(StorageError::InvalidUri { .. }));
    }

    #[test]
    fn detects_object_uris() {
        assert!(ObjectUri::is_object_uri("gs://b/k"));
        assert!(ObjectUri::is_object_uri("file:///x"));
        assert!(!ObjectUri::is_object_uri("https://example.com/a.png"));
    }
}
