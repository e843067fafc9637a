//! In-memory object store
//!
//! A bucket held in a `BTreeMap`, used by the unit tests here and by the
//! CLI and API test suites (through the `testing` feature).

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::traits::{ListResult, ObjectEntry, ObjectStore, PutOptions};

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    entry: ObjectEntry,
}

/// Object store backed by a sorted map, listing keys in lexicographic order
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, StoredObject>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object in the default storage class
    pub fn with_object(self, key: &str, data: &[u8]) -> Self {
        self.insert(key, data, None);
        self
    }

    /// Insert or replace an object
    pub fn insert(&self, key: &str, data: &[u8], storage_class: Option<&str>) {
        let mut entry = ObjectEntry::new(key, data.len() as u64);
        if let Some(class) = storage_class {
            entry.storage_class = class.to_string();
        }
        entry.last_modified = Some(jiff::Timestamp::now());
        self.lock().insert(
            key.to_string(),
            StoredObject {
                data: data.to_vec(),
                entry,
            },
        );
    }

    /// Metadata of a stored object
    pub fn entry(&self, key: &str) -> Option<ObjectEntry> {
        self.lock().get(key).map(|o| o.entry.clone())
    }

    /// Contents of a stored object
    pub fn data(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().get(key).map(|o| o.data.clone())
    }

    /// All stored keys in order
    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, StoredObject>> {
        // A panic while holding the lock leaves the map intact
        self.objects.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_page(
        &self,
        prefix: &str,
        max_keys: i32,
        continuation_token: Option<String>,
    ) -> Result<ListResult> {
        let max_keys = usize::try_from(max_keys).unwrap_or(0);
        let objects = self.lock();

        // The continuation token is the last key of the previous page
        let mut matching = objects
            .values()
            .filter(|o| o.entry.key.starts_with(prefix))
            .filter(|o| {
                continuation_token
                    .as_deref()
                    .is_none_or(|after| o.entry.key.as_str() > after)
            })
            .map(|o| o.entry.clone());

        let items: Vec<ObjectEntry> = matching.by_ref().take(max_keys).collect();
        let truncated = matching.next().is_some();
        let continuation_token = if truncated {
            items.last().map(|e| e.key.clone())
        } else {
            None
        };

        Ok(ListResult {
            items,
            truncated,
            continuation_token,
        })
    }

    async fn head_object(&self, key: &str) -> Result<Option<ObjectEntry>> {
        Ok(self.entry(key))
    }

    async fn put_object(&self, key: &str, source: &Path, options: PutOptions) -> Result<()> {
        let data = tokio::fs::read(source).await?;
        self.insert(key, &data, Some(options.storage_class.as_str()));
        Ok(())
    }

    async fn get_object(&self, key: &str, destination: &Path) -> Result<u64> {
        let data = self
            .data(key)
            .ok_or_else(|| Error::NotFound(key.to_string()))?;
        tokio::fs::write(destination, &data).await?;
        Ok(data.len() as u64)
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}
