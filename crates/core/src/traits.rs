//! ObjectStore trait definition
//!
//! This trait defines the single-object primitives of an S3-compatible bucket.
//! It allows the gateway and the bulk operations to be decoupled from the
//! specific S3 SDK implementation.

use std::path::Path;

use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::StorageClass;

/// Metadata for one remote object, as produced by a listing or a head request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    /// Object key
    pub key: String,

    /// Size in bytes
    pub size: u64,

    /// Last modified timestamp
    pub last_modified: Option<Timestamp>,

    /// ETag (usually MD5 for single-part uploads)
    pub etag: Option<String>,

    /// Storage class name as reported by the backend
    pub storage_class: String,
}

impl ObjectEntry {
    /// Create an entry in the default storage class
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
            last_modified: None,
            etag: None,
            storage_class: StorageClass::Standard.to_string(),
        }
    }

    /// Human-readable size
    pub fn size_human(&self) -> String {
        humansize::format_size(self.size, humansize::BINARY)
    }

    /// Whether the object lives in the default storage class
    pub fn is_standard(&self) -> bool {
        self.storage_class == StorageClass::Standard.as_str()
    }
}

/// One page of a list operation
#[derive(Debug, Clone, Default)]
pub struct ListResult {
    /// Listed objects, in backend order
    pub items: Vec<ObjectEntry>,

    /// Whether the result is truncated (more items available)
    pub truncated: bool,

    /// Continuation token for pagination
    pub continuation_token: Option<String>,
}

/// Options for put operations
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    /// Storage class to write the object with
    pub storage_class: StorageClass,

    /// Content type for the object
    pub content_type: Option<String>,
}

/// Trait for S3-compatible single-object operations against one bucket
///
/// This trait is implemented by the S3 adapter and can be mocked for testing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List one page of objects under a prefix
    async fn list_page(
        &self,
        prefix: &str,
        max_keys: i32,
        continuation_token: Option<String>,
    ) -> Result<ListResult>;

    /// Get object metadata, `None` when the key does not exist
    async fn head_object(&self, key: &str) -> Result<Option<ObjectEntry>>;

    /// Upload a local file to `key`
    async fn put_object(&self, key: &str, source: &Path, options: PutOptions) -> Result<()>;

    /// Download `key` into `destination`, returning the number of bytes written
    async fn get_object(&self, key: &str, destination: &Path) -> Result<u64>;

    /// Delete an object; deleting a missing key is not an error
    async fn delete_object(&self, key: &str) -> Result<()>;
}
