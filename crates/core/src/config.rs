//! Configuration management
//!
//! This module handles loading, saving and removing the storage credentials.
//! The configuration file is stored as JSON at ~/.cloud_storage_syncer/config.json.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the configuration directory under the user's home directory
const CONFIG_DIR: &str = ".cloud_storage_syncer";

/// Name of the configuration file
const CONFIG_FILE: &str = "config.json";

/// Region used when the user accepts the prompt default
pub const DEFAULT_REGION: &str = "us-east-1";

/// Credentials and target bucket for one S3-compatible account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Access key ID
    pub access_key: String,

    /// Secret access key
    pub secret_key: String,

    /// Bucket all operations run against
    pub bucket: String,

    /// Region of the bucket
    pub region: String,

    /// Custom endpoint for S3-compatible services (AWS when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl StorageConfig {
    /// Create a new configuration for AWS S3
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        bucket: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            bucket: bucket.into(),
            region: region.into(),
            endpoint: None,
        }
    }

    /// Set a custom endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// A configuration is usable only when all four credential fields carry
    /// non-whitespace content.
    pub fn is_valid(&self) -> bool {
        [
            &self.access_key,
            &self.secret_key,
            &self.bucket,
            &self.region,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }

    /// Validate the configuration, including the endpoint URL when present
    pub fn validate(&self) -> Result<()> {
        if !self.is_valid() {
            return Err(Error::Validation(
                "access key, secret key, bucket and region are all required".into(),
            ));
        }
        if let Some(endpoint) = &self.endpoint {
            url::Url::parse(endpoint)?;
        }
        Ok(())
    }

    /// Access key shortened for display
    pub fn masked_access_key(&self) -> String {
        let prefix: String = self.access_key.chars().take(8).collect();
        format!("{prefix}...")
    }
}

/// Loads and persists the storage configuration file
#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a ConfigStore at the default location under the home directory
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".into()))?;
        Ok(Self {
            config_path: home.join(CONFIG_DIR).join(CONFIG_FILE),
        })
    }

    /// Create a ConfigStore with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Resolve an optional user-supplied path, falling back to the default location
    pub fn resolve(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Ok(Self::with_path(path)),
            None => Self::new(),
        }
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Whether a configuration file is present
    pub fn exists(&self) -> bool {
        self.config_path.exists()
    }

    /// Load the configuration from disk
    ///
    /// Returns `Ok(None)` when the file is absent, cannot be parsed, lacks a
    /// required field, or holds an invalid configuration.
    pub fn load(&self) -> Result<Option<StorageConfig>> {
        if !self.config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let config: StorageConfig = match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    path = %self.config_path.display(),
                    error = %e,
                    "Ignoring unreadable configuration file"
                );
                return Ok(None);
            }
        };

        Ok(config.is_valid().then_some(config))
    }

    /// Save the configuration to disk
    ///
    /// Creates parent directories if they don't exist.
    /// Sets file permissions to 600 (owner read/write only).
    pub fn save(&self, config: &StorageConfig) -> Result<()> {
        config.validate()?;

        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.config_path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.config_path, permissions)?;
        }

        tracing::debug!(path = %self.config_path.display(), "Configuration saved");
        Ok(())
    }

    /// Delete the configuration file
    ///
    /// Returns `Ok(false)` when there was nothing to delete.
    pub fn remove(&self) -> Result<bool> {
        if !self.config_path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&self.config_path)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_config_store() -> (ConfigStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.json");
        (ConfigStore::with_path(config_path), temp_dir)
    }

    fn sample() -> StorageConfig {
        StorageConfig::new("AKIAEXAMPLE123", "secret", "my-bucket", "ap-northeast-1")
    }

    #[test]
    fn test_valid_config() {
        assert!(sample().is_valid());
    }

    #[test]
    fn test_blank_field_invalidates_config() {
        let blanks = ["", "   ", "\t\n"];
        for blank in blanks {
            let mut c = sample();
            c.access_key = blank.to_string();
            assert!(!c.is_valid());

            let mut c = sample();
            c.secret_key = blank.to_string();
            assert!(!c.is_valid());

            let mut c = sample();
            c.bucket = blank.to_string();
            assert!(!c.is_valid());

            let mut c = sample();
            c.region = blank.to_string();
            assert!(!c.is_valid());
        }
    }

    #[test]
    fn test_endpoint_does_not_affect_validity() {
        let config = sample().with_endpoint("http://localhost:9000");
        assert!(config.is_valid());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_endpoint_rejected() {
        let config = sample().with_endpoint("not a url");
        assert!(matches!(config.validate(), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_masked_access_key() {
        assert_eq!(sample().masked_access_key(), "AKIAEXAM...");
        let short = StorageConfig::new("abc", "s", "b", "r");
        assert_eq!(short.masked_access_key(), "abc...");
    }

    #[test]
    fn test_load_nonexistent_returns_none() {
        let (store, _temp_dir) = temp_config_store();
        assert!(!store.exists());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let (store, _temp_dir) = temp_config_store();
        store.save(&sample()).unwrap();

        assert!(store.exists());
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_saved_file_uses_plain_keys() {
        let (store, _temp_dir) = temp_config_store();
        store.save(&sample()).unwrap();

        let raw = std::fs::read_to_string(store.config_path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["access_key"], "AKIAEXAMPLE123");
        assert_eq!(value["bucket"], "my-bucket");
        assert_eq!(value["region"], "ap-northeast-1");
        assert!(value.get("endpoint").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let (store, _temp_dir) = temp_config_store();
        store.save(&sample()).unwrap();

        let mode = std::fs::metadata(store.config_path())
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_save_rejects_invalid() {
        let (store, _temp_dir) = temp_config_store();
        let mut config = sample();
        config.bucket = " ".into();

        assert!(matches!(store.save(&config), Err(Error::Validation(_))));
        assert!(!store.exists());
    }

    #[test]
    fn test_load_missing_field_returns_none() {
        let (store, _temp_dir) = temp_config_store();
        std::fs::create_dir_all(store.config_path().parent().unwrap()).unwrap();
        std::fs::write(
            store.config_path(),
            r#"{"access_key": "a", "secret_key": "b", "bucket": "c"}"#,
        )
        .unwrap();

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_load_malformed_json_returns_none() {
        let (store, _temp_dir) = temp_config_store();
        std::fs::create_dir_all(store.config_path().parent().unwrap()).unwrap();
        std::fs::write(store.config_path(), "{ not json").unwrap();

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_load_blank_values_returns_none() {
        let (store, _temp_dir) = temp_config_store();
        std::fs::create_dir_all(store.config_path().parent().unwrap()).unwrap();
        std::fs::write(
            store.config_path(),
            r#"{"access_key": "a", "secret_key": "b", "bucket": "  ", "region": "r"}"#,
        )
        .unwrap();

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_remove() {
        let (store, _temp_dir) = temp_config_store();
        assert!(!store.remove().unwrap());

        store.save(&sample()).unwrap();
        assert!(store.remove().unwrap());
        assert!(!store.exists());
    }
}
