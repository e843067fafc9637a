//! Directory walker and key mapper
//!
//! Pairs local paths with remote keys for directory-scoped operations while
//! preserving the relative structure on both sides. Remote keys always use
//! `/` as separator regardless of the local platform.

use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::traits::ObjectEntry;

/// One file to upload and the key it maps to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadItem {
    pub local_path: PathBuf,
    pub relative_path: String,
    pub key: String,
}

/// One remote object under a prefix and its path relative to that prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteItem {
    pub key: String,
    pub relative_path: String,
}

/// What a user-supplied key refers to in the bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Exactly one object with this key and nothing nested beneath it
    SingleObject,
    /// A prefix with at least one object under it
    Directory,
    /// Nothing matched
    NotFound,
}

/// Join an optional prefix and a relative path with exactly one `/`
pub fn join_key(prefix: Option<&str>, relative: &str) -> String {
    let relative = relative.trim_start_matches('/');
    match prefix.map(|p| p.trim_end_matches('/')) {
        Some(p) if !p.is_empty() => format!("{p}/{relative}"),
        _ => relative.to_string(),
    }
}

/// Normalize a prefix so it ends with exactly one `/` (empty stays empty)
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}/")
    }
}

/// Enumerate the files under `root` and compute their destination keys
///
/// With `recursive` false only the immediate children of `root` are
/// considered. Entries are returned sorted by file name at each level.
pub fn plan_upload(root: &Path, prefix: Option<&str>, recursive: bool) -> Result<Vec<UploadItem>> {
    if !root.is_dir() {
        return Err(Error::NotFound(format!(
            "Directory not found: {}",
            root.display()
        )));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut items = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| Error::General(format!("Failed to read directory: {e}")))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| Error::General(e.to_string()))?;
        let relative_path = relative_to_key(relative);

        items.push(UploadItem {
            local_path: entry.path().to_path_buf(),
            key: join_key(prefix, &relative_path),
            relative_path,
        });
    }

    Ok(items)
}

/// Render a relative filesystem path as a `/`-separated key fragment
fn relative_to_key(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Relativize listed keys against a prefix
///
/// The directory placeholder (a key equal to the normalized prefix), keys
/// outside the prefix, and keys with an empty remainder are skipped.
pub fn plan_remote(prefix: &str, entries: &[ObjectEntry]) -> Vec<RemoteItem> {
    let normalized = normalize_prefix(prefix);

    entries
        .iter()
        .filter_map(|entry| {
            if entry.key == normalized {
                return None;
            }
            let relative = entry.key.strip_prefix(normalized.as_str())?;
            if relative.is_empty() {
                return None;
            }
            Some(RemoteItem {
                key: entry.key.clone(),
                relative_path: relative.to_string(),
            })
        })
        .collect()
}

/// Map a relative key onto a local directory
///
/// Returns `None` when the key would escape `base` (`..` segments or an
/// absolute component).
pub fn local_path_for(base: &Path, relative: &str) -> Option<PathBuf> {
    let mut path = base.to_path_buf();
    for segment in relative.split('/').filter(|s| !s.is_empty() && *s != ".") {
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => path.push(part),
            _ => return None,
        }
    }
    Some(path)
}

/// Decide whether `key` names a single object, a directory prefix, or nothing
pub fn classify_target(key: &str, entries: &[ObjectEntry]) -> TargetKind {
    let child_prefix = format!("{key}/");
    let exact = entries.iter().any(|e| e.key == key);
    let has_children = entries.iter().any(|e| e.key.starts_with(&child_prefix));

    if exact && !has_children {
        TargetKind::SingleObject
    } else if !entries.is_empty() {
        TargetKind::Directory
    } else {
        TargetKind::NotFound
    }
}

/// Default local directory for a prefix download: the prefix's last segment
pub fn default_download_dir(prefix: &str) -> PathBuf {
    let name = crate::transfer::key_file_name(prefix);
    if name.is_empty() {
        PathBuf::from("download")
    } else {
        PathBuf::from(name)
    }
}
