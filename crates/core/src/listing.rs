//! Listing helpers: key search and per-storage-class summaries

use std::collections::BTreeMap;

use glob::{MatchOptions, Pattern};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::traits::ObjectEntry;

/// Listing cap for search and summary scans
pub const SCAN_LIMIT: usize = 10_000;

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// A key filter: case-insensitive substring, or a glob when the pattern
/// contains `*`, `?` or `[`
#[derive(Debug, Clone)]
pub enum SearchPattern {
    Substring(String),
    Glob(Pattern),
}

impl SearchPattern {
    pub fn parse(pattern: &str) -> Result<Self> {
        if pattern.contains(['*', '?', '[']) {
            let glob = Pattern::new(pattern)
                .map_err(|e| Error::Validation(format!("Invalid pattern '{pattern}': {e}")))?;
            Ok(Self::Glob(glob))
        } else {
            Ok(Self::Substring(pattern.to_lowercase()))
        }
    }

    pub fn matches(&self, key: &str) -> bool {
        match self {
            Self::Substring(needle) => key.to_lowercase().contains(needle.as_str()),
            Self::Glob(glob) => glob.matches_with(key, GLOB_OPTIONS),
        }
    }

    /// Keep the entries whose key matches, in listing order
    pub fn filter(&self, entries: Vec<ObjectEntry>) -> Vec<ObjectEntry> {
        entries
            .into_iter()
            .filter(|entry| self.matches(&entry.key))
            .collect()
    }
}

/// Totals for one storage class
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ClassUsage {
    pub count: usize,
    pub size_bytes: u64,
    /// Share of the total size, 0 to 100
    pub percent: f64,
}

/// Object count and size broken down by storage class
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StorageSummary {
    pub total_count: usize,
    pub total_bytes: u64,
    /// Keyed by class name, so iteration is sorted by name
    pub classes: BTreeMap<String, ClassUsage>,
}

impl StorageSummary {
    pub fn from_entries(entries: &[ObjectEntry]) -> Self {
        let mut summary = Self {
            total_count: entries.len(),
            ..Default::default()
        };

        for entry in entries {
            summary.total_bytes += entry.size;
            let usage = summary
                .classes
                .entry(entry.storage_class.clone())
                .or_default();
            usage.count += 1;
            usage.size_bytes += entry.size;
        }

        if summary.total_bytes > 0 {
            let total = summary.total_bytes as f64;
            for usage in summary.classes.values_mut() {
                usage.percent = usage.size_bytes as f64 / total * 100.0;
            }
        }

        summary
    }

    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }
}
