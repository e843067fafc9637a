//! syncer-s3: S3 SDK adapter for the cloud-syncer client
//!
//! This crate provides the implementation of the ObjectStore trait
//! using the aws-sdk-s3 crate. It is the only crate that directly
//! depends on the AWS SDK.

pub mod client;

use std::sync::Arc;

use syncer_core::{Result, StorageConfig, StorageGateway};

pub use client::S3Client;

/// Build a gateway over the configured bucket
pub async fn connect(config: &StorageConfig) -> Result<StorageGateway> {
    let client = S3Client::new(config).await?;
    Ok(StorageGateway::new(Arc::new(client), config.bucket.clone()))
}
