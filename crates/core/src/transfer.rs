//! Transfer requests and results
//!
//! A request describes one single-object operation; a result is its outcome.
//! Results are sum types: the success branch carries only the fields that
//! make sense after a completed operation, the failure branch only a message.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::storage::StorageClass;

/// Reject keys that are empty or whitespace only
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::Validation("S3 key cannot be empty".into()));
    }
    if key.trim().is_empty() {
        return Err(Error::Validation("S3 key cannot be whitespace only".into()));
    }
    Ok(())
}

/// Final path segment of a key, ignoring trailing separators
pub fn key_file_name(key: &str) -> &str {
    key.trim_end_matches('/').rsplit('/').next().unwrap_or(key)
}

/// Upload one local file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub file_path: PathBuf,
    pub key: String,
    pub storage_class: Option<StorageClass>,
}

impl UploadRequest {
    pub fn new(file_path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            key: key.into(),
            storage_class: None,
        }
    }

    pub fn with_storage_class(mut self, storage_class: Option<StorageClass>) -> Self {
        self.storage_class = storage_class;
        self
    }

    /// Requested class, falling back to STANDARD
    pub fn effective_storage_class(&self) -> StorageClass {
        self.storage_class.unwrap_or_default()
    }
}

/// Download one object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    key: String,
    output_path: Option<PathBuf>,
    overwrite: bool,
}

impl DownloadRequest {
    /// Create a download request, failing fast on a blank key
    pub fn new(key: impl Into<String>, output_path: Option<PathBuf>, overwrite: bool) -> Result<Self> {
        let key = key.into();
        validate_key(&key)?;
        Ok(Self {
            key,
            output_path,
            overwrite,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// Where the object will be written: the explicit output path, or the
    /// key's file name in the current directory.
    pub fn local_path(&self) -> PathBuf {
        match &self.output_path {
            Some(path) => path.clone(),
            None => PathBuf::from(key_file_name(&self.key)),
        }
    }
}

/// Delete one object or prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    key: String,
    force: bool,
}

impl DeleteRequest {
    /// Create a delete request, failing fast on a blank key
    ///
    /// `force` only suppresses the "nothing matched" error; existence is
    /// still checked.
    pub fn new(key: impl Into<String>, force: bool) -> Result<Self> {
        let key = key.into();
        validate_key(&key)?;
        Ok(Self { key, force })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn force(&self) -> bool {
        self.force
    }
}

/// Common view over the three result kinds, used for batch aggregation
pub trait TransferOutcome {
    /// Whether the operation completed
    fn is_success(&self) -> bool;

    /// Remote key (or prefix) the result refers to
    fn key(&self) -> &str;

    /// Failure message, if the operation failed
    fn error_message(&self) -> Option<&str>;

    /// For deletes: whether the object existed before the delete
    fn existed_before(&self) -> bool {
        true
    }
}

/// Outcome of an upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadResult {
    Success {
        key: String,
        url: String,
        storage_class: StorageClass,
        size_bytes: u64,
    },
    Failure {
        key: String,
        message: String,
    },
}

impl UploadResult {
    pub fn failure(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failure {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl TransferOutcome for UploadResult {
    fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    fn key(&self) -> &str {
        match self {
            Self::Success { key, .. } | Self::Failure { key, .. } => key,
        }
    }

    fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { message, .. } => Some(message.as_str()),
        }
    }
}

/// Outcome of a download
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DownloadResult {
    Success {
        key: String,
        local_path: PathBuf,
        size_bytes: u64,
    },
    Failure {
        key: String,
        message: String,
    },
}

impl DownloadResult {
    pub fn failure(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failure {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl TransferOutcome for DownloadResult {
    fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    fn key(&self) -> &str {
        match self {
            Self::Success { key, .. } | Self::Failure { key, .. } => key,
        }
    }

    fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { message, .. } => Some(message.as_str()),
        }
    }
}

/// Outcome of a delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeleteResult {
    Success {
        key: String,
        existed_before_delete: bool,
    },
    Failure {
        key: String,
        message: String,
    },
}

impl DeleteResult {
    pub fn success(key: impl Into<String>, existed_before_delete: bool) -> Self {
        Self::Success {
            key: key.into(),
            existed_before_delete,
        }
    }

    pub fn failure(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failure {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl TransferOutcome for DeleteResult {
    fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    fn key(&self) -> &str {
        match self {
            Self::Success { key, .. } | Self::Failure { key, .. } => key,
        }
    }

    fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { message, .. } => Some(message.as_str()),
        }
    }

    fn existed_before(&self) -> bool {
        matches!(
            self,
            Self::Success {
                existed_before_delete: true,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_request_rejects_blank_key() {
        assert!(matches!(
            DownloadRequest::new("", None, false),
            Err(Error::Validation(_))
        ));
        let err = DownloadRequest::new("   ", None, false).unwrap_err();
        assert!(err.to_string().contains("whitespace"));
    }

    #[test]
    fn test_delete_request_rejects_blank_key() {
        assert!(DeleteRequest::new("", true).is_err());
        assert!(DeleteRequest::new("\t", false).is_err());
        let req = DeleteRequest::new("docs/", true).unwrap();
        assert_eq!(req.key(), "docs/");
        assert!(req.force());
    }

    #[test]
    fn test_download_local_path_defaults_to_file_name() {
        let req = DownloadRequest::new("reports/2024/summary.pdf", None, false).unwrap();
        assert_eq!(req.local_path(), PathBuf::from("summary.pdf"));

        let req = DownloadRequest::new("a.txt", Some(PathBuf::from("/tmp/out.txt")), true).unwrap();
        assert_eq!(req.local_path(), PathBuf::from("/tmp/out.txt"));
        assert!(req.overwrite());
    }

    #[test]
    fn test_key_file_name() {
        assert_eq!(key_file_name("a/b/c.txt"), "c.txt");
        assert_eq!(key_file_name("photos/2024/"), "2024");
        assert_eq!(key_file_name("plain"), "plain");
    }

    #[test]
    fn test_upload_effective_storage_class() {
        let req = UploadRequest::new("a.txt", "a.txt");
        assert_eq!(req.effective_storage_class(), StorageClass::Standard);

        let req = req.with_storage_class(Some(StorageClass::Glacier));
        assert_eq!(req.effective_storage_class(), StorageClass::Glacier);
    }

    #[test]
    fn test_outcome_accessors() {
        let ok = DeleteResult::success("k", false);
        assert!(ok.is_success());
        assert!(!ok.existed_before());
        assert_eq!(ok.error_message(), None);

        let failed = DownloadResult::failure("k", "boom");
        assert!(!failed.is_success());
        assert_eq!(failed.key(), "k");
        assert_eq!(failed.error_message(), Some("boom"));
    }

    #[test]
    fn test_result_serializes_with_status_tag() {
        let value = serde_json::to_value(UploadResult::failure("x", "missing")).unwrap();
        assert_eq!(value["status"], "failure");
        assert_eq!(value["key"], "x");
        assert_eq!(value["message"], "missing");
    }
}
