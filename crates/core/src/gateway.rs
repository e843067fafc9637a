//! Object store gateway
//!
//! Wraps an [`ObjectStore`] for one bucket and turns its fallible primitives
//! into transfer results. Everything above this layer deals in
//! [`UploadResult`], [`DownloadResult`] and [`DeleteResult`] values rather
//! than errors.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::Result;
use crate::traits::{ObjectEntry, ObjectStore, PutOptions};
use crate::transfer::{DeleteResult, DownloadRequest, DownloadResult, UploadRequest, UploadResult};

/// Largest page the backend returns per list call
const MAX_PAGE_SIZE: usize = 1000;

/// Single-object operations against the configured bucket
pub struct StorageGateway {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    reachable: AtomicBool,
}

impl StorageGateway {
    /// Create a gateway over `store`, which must already target `bucket`
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            reachable: AtomicBool::new(false),
        }
    }

    /// Bucket this gateway operates on
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Remote URL for a key
    pub fn object_url(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }

    /// Check that the bucket can be listed with the configured credentials
    ///
    /// Never fails: any error is logged and reported as `false`. A success is
    /// remembered so later uploads skip the check.
    pub async fn test_connection(&self) -> bool {
        match self.store.list_page("", 1, None).await {
            Ok(_) => {
                self.reachable.store(true, Ordering::Relaxed);
                tracing::debug!(bucket = %self.bucket, "Bucket reachable");
                true
            }
            Err(e) => {
                tracing::warn!(bucket = %self.bucket, error = %e, "Connection test failed");
                false
            }
        }
    }

    /// List up to `max_keys` objects under `prefix`, following continuation
    /// tokens until the cap is reached or the listing is exhausted
    pub async fn list_objects(&self, prefix: &str, max_keys: usize) -> Result<Vec<ObjectEntry>> {
        let mut items = Vec::new();
        let mut token: Option<String> = None;

        while items.len() < max_keys {
            let page_size = (max_keys - items.len()).min(MAX_PAGE_SIZE);
            // page_size is at most MAX_PAGE_SIZE so the cast cannot truncate
            let page = self
                .store
                .list_page(prefix, page_size as i32, token.take())
                .await
                .inspect_err(|e| {
                    tracing::error!(bucket = %self.bucket, prefix, error = %e, "List failed");
                })?;

            let remaining = max_keys - items.len();
            items.extend(page.items.into_iter().take(remaining));

            match page.continuation_token {
                Some(next) if page.truncated => token = Some(next),
                _ => break,
            }
        }

        Ok(items)
    }

    /// Whether `key` exists; lookup failures count as absent
    pub async fn object_exists(&self, key: &str) -> bool {
        self.get_object_info(key).await.is_some()
    }

    /// Metadata for `key`; lookup failures count as absent
    pub async fn get_object_info(&self, key: &str) -> Option<ObjectEntry> {
        match self.store.head_object(key).await {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(bucket = %self.bucket, key, error = %e, "Head object failed");
                None
            }
        }
    }

    /// Upload one local file
    pub async fn upload_object(&self, request: &UploadRequest) -> UploadResult {
        let key = request.key.as_str();
        let path = &request.file_path;

        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                return UploadResult::failure(
                    key,
                    format!("Path is not a file: {}", path.display()),
                );
            }
            Err(_) => {
                return UploadResult::failure(
                    key,
                    format!("File does not exist: {}", path.display()),
                );
            }
        }

        if !self.reachable.load(Ordering::Relaxed) && !self.test_connection().await {
            return UploadResult::failure(key, "Cannot connect to S3 bucket");
        }

        let storage_class = request.effective_storage_class();
        let options = PutOptions {
            storage_class,
            content_type: mime_guess::from_path(path)
                .first()
                .map(|mime| mime.essence_str().to_string()),
        };

        if let Err(e) = self.store.put_object(key, path, options).await {
            tracing::error!(bucket = %self.bucket, key, error = %e, "Upload failed");
            return UploadResult::failure(key, format!("Upload failed: {e}"));
        }

        let size_bytes = tokio::fs::metadata(path)
            .await
            .map(|meta| meta.len())
            .unwrap_or_default();

        tracing::info!(
            bucket = %self.bucket,
            key,
            size = size_bytes,
            storage_class = %storage_class,
            "Uploaded object"
        );

        UploadResult::Success {
            key: key.to_string(),
            url: self.object_url(key),
            storage_class,
            size_bytes,
        }
    }

    /// Download one object to its local destination
    pub async fn download_object(&self, request: &DownloadRequest) -> DownloadResult {
        let key = request.key();

        match self.store.head_object(key).await {
            Ok(Some(_)) => {}
            Ok(None) => return DownloadResult::failure(key, format!("File not found in S3: {key}")),
            Err(e) => {
                tracing::error!(bucket = %self.bucket, key, error = %e, "Head object failed");
                return DownloadResult::failure(key, format!("Download failed: {e}"));
            }
        }

        let local_path = request.local_path();
        if !request.overwrite() && tokio::fs::try_exists(&local_path).await.unwrap_or(false) {
            return DownloadResult::failure(
                key,
                format!(
                    "Local file already exists: {}. Use --overwrite to replace it.",
                    local_path.display()
                ),
            );
        }

        let staging_dir = local_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        if let Err(e) = tokio::fs::create_dir_all(staging_dir).await {
            return DownloadResult::failure(
                key,
                format!("Failed to create directory {}: {e}", staging_dir.display()),
            );
        }

        // Staged beside the target and renamed over it only on success
        let staging = match tempfile::NamedTempFile::new_in(staging_dir) {
            Ok(staging) => staging,
            Err(e) => {
                tracing::error!(bucket = %self.bucket, key, error = %e, "Staging file failed");
                return DownloadResult::failure(key, format!("Download failed: {e}"));
            }
        };

        let size_bytes = match self.store.get_object(key, staging.path()).await {
            Ok(size_bytes) => size_bytes,
            Err(e) => {
                tracing::error!(bucket = %self.bucket, key, error = %e, "Download failed");
                return DownloadResult::failure(key, format!("Download failed: {e}"));
            }
        };

        if let Err(e) = staging.persist(&local_path) {
            tracing::error!(bucket = %self.bucket, key, error = %e.error, "Download failed");
            return DownloadResult::failure(key, format!("Download failed: {}", e.error));
        }

        tracing::info!(
            bucket = %self.bucket,
            key,
            path = %local_path.display(),
            size = size_bytes,
            "Downloaded object"
        );
        DownloadResult::Success {
            key: key.to_string(),
            local_path,
            size_bytes,
        }
    }

    /// Delete one object
    ///
    /// Deleting a missing key succeeds. Existence is checked beforehand only to
    /// report whether the object was there.
    pub async fn delete_object(&self, key: &str) -> DeleteResult {
        let existed = self.object_exists(key).await;

        match self.store.delete_object(key).await {
            Ok(()) => {
                tracing::info!(bucket = %self.bucket, key, existed, "Deleted object");
                DeleteResult::success(key, existed)
            }
            Err(e) => {
                tracing::error!(bucket = %self.bucket, key, error = %e, "Delete failed");
                DeleteResult::failure(key, format!("Delete failed: {e}"))
            }
        }
    }
}
