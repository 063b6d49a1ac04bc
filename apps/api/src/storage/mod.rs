//! Object storage for uploaded resumes.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;

/// Key prefix every resume object is stored under.
pub const RESUME_PREFIX: &str = "resumes/";

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `body` at `key`, makes it publicly readable and returns its public URL.
    async fn put_public(
        &self,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> Result<String, AppError>;
}

/// S3-compatible blob store (AWS, MinIO, R2, GCS interop).
#[derive(Clone)]
pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3BlobStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            public_base_url,
        }
    }

    pub fn public_url(&self, key: &str) -> String {
        public_url(&self.public_base_url, key)
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put_public(
        &self,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> Result<String, AppError> {
        let size = body.len();
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .acl(ObjectCannedAcl::PublicRead)
            .body(ByteStream::from(body));
        if let Some(content_type) = content_type {
            request = request.content_type(content_type);
        }
        request
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

        info!("Uploaded {size} bytes to s3://{}/{}", self.bucket, key);
        Ok(self.public_url(key))
    }
}

/// Joins a base URL and an object key, percent-encoding path-unsafe characters.
pub fn public_url(base: &str, key: &str) -> String {
    let encoded: String = key
        .split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/");
    format!("{}/{}", base.trim_end_matches('/'), encoded)
}

fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
pub mod memory {
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone)]
    pub struct StoredBlob {
        pub key: String,
        pub body: Bytes,
        pub content_type: Option<String>,
    }

    /// Test double that keeps uploads in memory.
    #[derive(Default)]
    pub struct InMemoryBlobStore {
        pub blobs: Mutex<Vec<StoredBlob>>,
    }

    impl InMemoryBlobStore {
        pub fn stored(&self) -> Vec<StoredBlob> {
            self.blobs.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BlobStore for InMemoryBlobStore {
        async fn put_public(
            &self,
            key: &str,
            body: Bytes,
            content_type: Option<&str>,
        ) -> Result<String, AppError> {
            self.blobs.lock().unwrap().push(StoredBlob {
                key: key.to_string(),
                body,
                content_type: content_type.map(String::from),
            });
            Ok(public_url("https://blobs.test", key))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_joins_base_and_key() {
        assert_eq!(
            public_url("https://cdn.example.com/", "resumes/cv.pdf"),
            "https://cdn.example.com/resumes/cv.pdf"
        );
    }

    #[test]
    fn test_public_url_encodes_spaces_but_keeps_separators() {
        assert_eq!(
            public_url("https://cdn.example.com", "resumes/Doe_Jane_1.5_my cv.pdf"),
            "https://cdn.example.com/resumes/Doe_Jane_1.5_my%20cv.pdf"
        );
    }
}
