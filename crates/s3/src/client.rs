//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from syncer-core.

use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::primitives::ByteStream;
use aws_smithy_types::DateTime;

use syncer_core::{Error, ListResult, ObjectEntry, ObjectStore, PutOptions, Result, StorageConfig};

/// S3 client bound to the configured bucket
pub struct S3Client {
    inner: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Client {
    /// Create a new S3 client from a storage configuration
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        // Build credentials provider
        let credentials = aws_credential_types::Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None, // session token
            None, // expiry
            "syncer-static-credentials",
        );

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(aws_config::Region::new(config.region.clone()));

        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;

        // Custom endpoints (MinIO, RustFS, ...) generally need path-style addressing
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.endpoint.is_some())
            .build();

        tracing::debug!(
            bucket = %config.bucket,
            region = %config.region,
            endpoint = config.endpoint.as_deref().unwrap_or("aws"),
            "Created S3 client"
        );

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        })
    }

    /// Get the underlying aws-sdk-s3 client
    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

/// Map an S3 error code onto the core error taxonomy
fn classify(code: Option<&str>, message: String) -> Error {
    match code {
        Some("NoSuchKey" | "NotFound" | "NoSuchBucket") => Error::NotFound(message),
        Some(
            "AccessDenied" | "InvalidAccessKeyId" | "SignatureDoesNotMatch" | "Forbidden"
            | "ExpiredToken",
        ) => Error::Auth(message),
        _ => Error::Connectivity(message),
    }
}

fn sdk_error<E: ProvideErrorMetadata + std::error::Error>(err: E) -> Error {
    let message = match err.message() {
        Some(msg) => format!("{}: {msg}", err.code().unwrap_or("S3 error")),
        None => err.to_string(),
    };
    classify(err.code(), message)
}

fn to_timestamp(value: &DateTime) -> Option<jiff::Timestamp> {
    jiff::Timestamp::from_second(value.secs()).ok()
}

fn clean_etag(etag: &str) -> String {
    etag.trim_matches('"').to_string()
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn list_page(
        &self,
        prefix: &str,
        max_keys: i32,
        continuation_token: Option<String>,
    ) -> Result<ListResult> {
        let mut request = self
            .inner
            .list_objects_v2()
            .bucket(&self.bucket)
            .max_keys(max_keys);

        if !prefix.is_empty() {
            request = request.prefix(prefix);
        }

        if let Some(token) = continuation_token {
            request = request.continuation_token(token);
        }

        let response = request.send().await.map_err(sdk_error)?;

        let items = response
            .contents()
            .iter()
            .map(|object| {
                let size = object.size().unwrap_or(0).max(0) as u64;
                let mut entry = ObjectEntry::new(object.key().unwrap_or_default(), size);

                entry.last_modified = object.last_modified().and_then(to_timestamp);
                entry.etag = object.e_tag().map(clean_etag);

                if let Some(sc) = object.storage_class() {
                    entry.storage_class = sc.as_str().to_string();
                }

                entry
            })
            .collect();

        Ok(ListResult {
            items,
            truncated: response.is_truncated().unwrap_or(false),
            continuation_token: response.next_continuation_token().map(|s| s.to_string()),
        })
    }

    async fn head_object(&self, key: &str) -> Result<Option<ObjectEntry>> {
        let response = match self
            .inner
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => {
                return Ok(None);
            }
            Err(e) => return Err(sdk_error(e)),
        };

        let size = response.content_length().unwrap_or(0).max(0) as u64;
        let mut entry = ObjectEntry::new(key, size);

        entry.last_modified = response.last_modified().and_then(to_timestamp);
        entry.etag = response.e_tag().map(clean_etag);

        // HEAD omits the header for STANDARD objects
        if let Some(sc) = response.storage_class() {
            entry.storage_class = sc.as_str().to_string();
        }

        Ok(Some(entry))
    }

    async fn put_object(&self, key: &str, source: &Path, options: PutOptions) -> Result<()> {
        let body = ByteStream::from_path(source)
            .await
            .map_err(|e| Error::General(format!("Failed to read {}: {e}", source.display())))?;

        let mut request = self
            .inner
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .storage_class(aws_sdk_s3::types::StorageClass::from(
                options.storage_class.as_str(),
            ))
            .body(body);

        if let Some(ct) = options.content_type {
            request = request.content_type(ct);
        }

        request.send().await.map_err(sdk_error)?;
        Ok(())
    }

    async fn get_object(&self, key: &str, destination: &Path) -> Result<u64> {
        let response = self
            .inner
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(sdk_error)?;

        let mut reader = response.body.into_async_read();
        let mut file = tokio::fs::File::create(destination).await?;
        let written = tokio::io::copy(&mut reader, &mut file).await?;
        tokio::io::AsyncWriteExt::flush(&mut file).await?;

        Ok(written)
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.inner
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_codes() {
        assert!(matches!(
            classify(Some("NoSuchBucket"), "x".into()),
            Error::NotFound(_)
        ));
        assert!(matches!(
            classify(Some("InvalidAccessKeyId"), "x".into()),
            Error::Auth(_)
        ));
        assert!(matches!(
            classify(Some("SignatureDoesNotMatch"), "x".into()),
            Error::Auth(_)
        ));
        assert!(matches!(classify(None, "dispatch failure".into()), Error::Connectivity(_)));
        assert!(matches!(
            classify(Some("SlowDown"), "x".into()),
            Error::Connectivity(_)
        ));
    }

    #[test]
    fn test_clean_etag() {
        assert_eq!(clean_etag("\"abc123\""), "abc123");
        assert_eq!(clean_etag("abc123"), "abc123");
    }

    #[test]
    fn test_to_timestamp() {
        let ts = to_timestamp(&DateTime::from_secs(1_700_000_000)).unwrap();
        assert_eq!(ts.as_second(), 1_700_000_000);
    }

    #[tokio::test]
    async fn test_new_with_custom_endpoint() {
        let config = StorageConfig::new("ak", "sk", "bucket", "us-east-1")
            .with_endpoint("http://localhost:9000");
        let client = S3Client::new(&config).await.unwrap();
        assert_eq!(client.bucket(), "bucket");
        assert_eq!(
            client.inner().config().region().map(|r| r.to_string()),
            Some("us-east-1".to_string())
        );
    }
}
