//! Shared server state
//!
//! The configuration is re-read on every request so that `syncer config
//! setup` takes effect without restarting the server.

use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use syncer_core::{ConfigStore, StorageConfig, StorageGateway};

use crate::error::{ApiError, ErrorCode};

/// Builds a gateway from a loaded configuration
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn connect(&self, config: &StorageConfig) -> syncer_core::Result<StorageGateway>;
}

/// Connects to the real S3 backend
#[derive(Debug, Default, Clone, Copy)]
pub struct S3Connector;

#[async_trait]
impl StoreConnector for S3Connector {
    async fn connect(&self, config: &StorageConfig) -> syncer_core::Result<StorageGateway> {
        syncer_s3::connect(config).await
    }
}

/// HTTP Basic credentials accepted by the server
///
/// Only SHA-256 digests are kept, and they are compared without early exit.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: [u8; 32],
    password: [u8; 32],
}

impl Credentials {
    pub fn new(username: impl AsRef<str>, password: impl AsRef<str>) -> Self {
        Self {
            username: digest(username.as_ref()),
            password: digest(password.as_ref()),
        }
    }

    pub fn matches(&self, username: &str, password: &str) -> bool {
        let user_ok = same_digest(&self.username, &digest(username));
        let password_ok = same_digest(&self.password, &digest(password));
        user_ok & password_ok
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").finish_non_exhaustive()
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

fn same_digest(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[derive(Clone)]
pub struct AppState {
    config_store: ConfigStore,
    credentials: Credentials,
    connector: Arc<dyn StoreConnector>,
}

impl AppState {
    pub fn new(
        config_store: ConfigStore,
        credentials: Credentials,
        connector: Arc<dyn StoreConnector>,
    ) -> Self {
        Self {
            config_store,
            credentials,
            connector,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Load the configuration and build a gateway for one request
    pub async fn gateway(&self) -> Result<StorageGateway, ApiError> {
        let config = match self.config_store.load() {
            Ok(Some(config)) => config,
            Ok(None) => return Err(ApiError::not_configured()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load configuration");
                return Err(ApiError::not_configured());
            }
        };

        self.connector.connect(&config).await.map_err(|e| {
            tracing::error!(bucket = %config.bucket, error = %e, "Failed to create S3 client");
            ApiError::new(
                axum::http::StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::ServiceUnavailable,
                "Failed to create S3 client",
                e.to_string(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_match_exact_pair_only() {
        let credentials = Credentials::new("admin", "secret");

        assert!(credentials.matches("admin", "secret"));
        assert!(!credentials.matches("admin", "secreT"));
        assert!(!credentials.matches("admin", "secret "));
        assert!(!credentials.matches("admin", ""));
        assert!(!credentials.matches("Admin", "secret"));
        assert!(!credentials.matches("secret", "admin"));
    }

    #[test]
    fn test_credentials_debug_hides_values() {
        let rendered = format!("{:?}", Credentials::new("admin", "cloudsyncer2025"));
        assert!(!rendered.contains("admin"));
        assert!(!rendered.contains("cloudsyncer2025"));
    }
}
