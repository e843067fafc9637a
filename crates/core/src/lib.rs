//! syncer-core: Core library for the cloud-syncer S3 client
//!
//! This crate provides the functionality shared by the CLI and the web API:
//! - Configuration storage
//! - Transfer request and result models
//! - The ObjectStore trait and the gateway built on top of it
//! - Directory walking and bulk operations
//! - Listing helpers (search, storage summaries)
//!
//! Nothing here depends on a specific S3 SDK; `syncer-s3` supplies the
//! production `ObjectStore`.

pub mod bulk;
pub mod config;
pub mod error;
pub mod gateway;
pub mod listing;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod storage;
pub mod traits;
pub mod transfer;
pub mod walker;

pub use bulk::{BatchObserver, BatchReport, BatchStatus, BatchSummary};
pub use config::{ConfigStore, StorageConfig};
pub use error::{Error, Result};
pub use gateway::StorageGateway;
pub use listing::{SearchPattern, StorageSummary};
pub use storage::StorageClass;
pub use traits::{ListResult, ObjectEntry, ObjectStore, PutOptions};
pub use transfer::{
    DeleteRequest, DeleteResult, DownloadRequest, DownloadResult, TransferOutcome, UploadRequest,
    UploadResult,
};
pub use walker::TargetKind;
