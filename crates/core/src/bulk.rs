//! Bulk operations
//!
//! Directory-scoped upload, download and delete. Each batch expands into
//! single-object requests through the walker, runs them one at a time through
//! the gateway, and collects every result. One failing item never stops the
//! batch.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::gateway::StorageGateway;
use crate::storage::StorageClass;
use crate::transfer::{
    DeleteResult, DownloadRequest, DownloadResult, TransferOutcome, UploadRequest, UploadResult,
};
use crate::walker;

/// Most objects a remote prefix expands to
pub const EXPANSION_LIMIT: usize = 10_000;

/// Overall verdict of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Every attempted item succeeded
    Complete,
    /// At least one item succeeded and at least one failed
    Partial,
    /// Items were attempted and none succeeded
    Failed,
}

/// Counts over a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub attempted: usize,
    pub successful: usize,
    pub failed: usize,
    /// Successful deletes whose target was already gone
    pub already_absent: usize,
}

impl BatchSummary {
    pub fn status(&self) -> BatchStatus {
        if self.successful == 0 && self.attempted > 0 {
            BatchStatus::Failed
        } else if self.failed > 0 {
            BatchStatus::Partial
        } else {
            BatchStatus::Complete
        }
    }

    /// Whether the caller should treat the batch as failed
    pub fn is_failure(&self) -> bool {
        self.status() == BatchStatus::Failed
    }
}

/// Results of a batch, in execution order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport<R> {
    pub results: Vec<R>,
}

impl<R: TransferOutcome> BatchReport<R> {
    fn single(result: R) -> Self {
        Self {
            results: vec![result],
        }
    }

    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            attempted: self.results.len(),
            ..Default::default()
        };
        for result in &self.results {
            if result.is_success() {
                summary.successful += 1;
                if !result.existed_before() {
                    summary.already_absent += 1;
                }
            } else {
                summary.failed += 1;
            }
        }
        summary
    }

    /// Failed results with their messages
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.results
            .iter()
            .filter_map(|r| r.error_message().map(|msg| (r.key(), msg)))
    }
}

/// Progress hooks invoked while a batch runs
pub trait BatchObserver<R> {
    /// Called once the batch has been expanded, before the first item
    fn started(&self, _total: usize) {}

    /// Called after each item completes
    fn finished(&self, _result: &R) {}
}

impl<R> BatchObserver<R> for () {}

/// Upload every file under `root`, mapping relative paths under `prefix`
pub async fn upload_directory(
    gateway: &StorageGateway,
    root: &Path,
    prefix: Option<&str>,
    recursive: bool,
    storage_class: Option<StorageClass>,
    observer: &dyn BatchObserver<UploadResult>,
) -> BatchReport<UploadResult> {
    let root_key = root.display().to_string();
    let items = match walker::plan_upload(root, prefix, recursive) {
        Ok(items) => items,
        Err(e) => return BatchReport::single(UploadResult::failure(root_key, e.to_string())),
    };

    if items.is_empty() {
        return BatchReport::single(UploadResult::failure(root_key, "No files found to upload"));
    }

    let requests = items
        .into_iter()
        .map(|item| UploadRequest::new(item.local_path, item.key).with_storage_class(storage_class))
        .collect();
    run_uploads(gateway, requests, observer).await
}

/// Upload a list of files, each under its own file name
pub async fn upload_batch(
    gateway: &StorageGateway,
    paths: &[PathBuf],
    storage_class: Option<StorageClass>,
    observer: &dyn BatchObserver<UploadResult>,
) -> BatchReport<UploadResult> {
    if paths.is_empty() {
        return BatchReport::single(UploadResult::failure("", "No files found to upload"));
    }

    let requests = paths
        .iter()
        .map(|path| {
            let key = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            UploadRequest::new(path, key).with_storage_class(storage_class)
        })
        .collect();
    run_uploads(gateway, requests, observer).await
}

async fn run_uploads(
    gateway: &StorageGateway,
    requests: Vec<UploadRequest>,
    observer: &dyn BatchObserver<UploadResult>,
) -> BatchReport<UploadResult> {
    observer.started(requests.len());
    let mut results = Vec::with_capacity(requests.len());

    for request in &requests {
        let result = if request.key.is_empty() {
            UploadResult::failure(
                "",
                format!("Path is not a file: {}", request.file_path.display()),
            )
        } else {
            gateway.upload_object(request).await
        };
        observer.finished(&result);
        results.push(result);
    }

    BatchReport { results }
}

/// Download every object under `prefix` into `local_dir`, keeping the
/// structure below the prefix
pub async fn download_directory(
    gateway: &StorageGateway,
    prefix: &str,
    local_dir: &Path,
    overwrite: bool,
    observer: &dyn BatchObserver<DownloadResult>,
) -> BatchReport<DownloadResult> {
    let entries = match gateway.list_objects(prefix, EXPANSION_LIMIT).await {
        Ok(entries) => entries,
        Err(e) => {
            return BatchReport::single(DownloadResult::failure(
                prefix,
                format!("Directory download failed: {e}"),
            ));
        }
    };

    if entries.is_empty() {
        return BatchReport::single(DownloadResult::failure(
            prefix,
            "No files found with this prefix",
        ));
    }

    let items = walker::plan_remote(prefix, &entries);
    observer.started(items.len());
    let mut results = Vec::with_capacity(items.len());

    for item in items {
        let result = match walker::local_path_for(local_dir, &item.relative_path) {
            Some(local_path) => match DownloadRequest::new(item.key.as_str(), Some(local_path), overwrite) {
                Ok(request) => gateway.download_object(&request).await,
                Err(e) => DownloadResult::failure(item.key.as_str(), e.to_string()),
            },
            None => DownloadResult::failure(
                item.key.as_str(),
                format!("Refusing to write outside {}", local_dir.display()),
            ),
        };
        observer.finished(&result);
        results.push(result);
    }

    BatchReport { results }
}

/// Delete every object under `prefix`
///
/// An empty expansion is a successful no-op reported as a single result for
/// the prefix with `existed_before_delete` false.
pub async fn delete_directory(
    gateway: &StorageGateway,
    prefix: &str,
    observer: &dyn BatchObserver<DeleteResult>,
) -> BatchReport<DeleteResult> {
    let entries = match gateway.list_objects(prefix, EXPANSION_LIMIT).await {
        Ok(entries) => entries,
        Err(e) => {
            return BatchReport::single(DeleteResult::failure(
                prefix,
                format!("Directory delete failed: {e}"),
            ));
        }
    };

    let items = walker::plan_remote(prefix, &entries);
    if items.is_empty() {
        return BatchReport::single(DeleteResult::success(prefix, false));
    }

    observer.started(items.len());
    let mut results = Vec::with_capacity(items.len());

    for item in items {
        let result = gateway.delete_object(&item.key).await;
        observer.finished(&result);
        results.push(result);
    }

    BatchReport { results }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::memory::MemoryStore;
    use crate::traits::{ListResult, MockObjectStore, ObjectEntry};
    use std::cell::RefCell;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Recorder {
        total: RefCell<Option<usize>>,
        seen: RefCell<Vec<String>>,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                total: RefCell::new(None),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl<R: TransferOutcome> BatchObserver<R> for Recorder {
        fn started(&self, total: usize) {
            *self.total.borrow_mut() = Some(total);
        }

        fn finished(&self, result: &R) {
            self.seen.borrow_mut().push(result.key().to_string());
        }
    }

    fn setup(store: MemoryStore) -> (StorageGateway, Arc<MemoryStore>) {
        let store = Arc::new(store);
        (StorageGateway::new(store.clone(), "bucket"), store)
    }

    #[test]
    fn test_summary_status() {
        let report = BatchReport {
            results: vec![
                UploadResult::failure("a", "x"),
                UploadResult::failure("b", "y"),
                UploadResult::failure("c", "z"),
            ],
        };
        assert_eq!(report.summary().status(), BatchStatus::Failed);
        assert_eq!(report.failures().count(), 3);

        let report: BatchReport<UploadResult> = BatchReport { results: vec![] };
        assert_eq!(report.summary().status(), BatchStatus::Complete);
        assert!(!report.summary().is_failure());
    }

    #[tokio::test]
    async fn test_upload_batch_partial_success() {
        let dir = TempDir::new().unwrap();
        let ok1 = dir.path().join("ok1.txt");
        let ok2 = dir.path().join("ok2.txt");
        std::fs::write(&ok1, "1").unwrap();
        std::fs::write(&ok2, "2").unwrap();
        let missing = dir.path().join("missing.txt");

        let (gw, store) = setup(MemoryStore::new());
        let report = upload_batch(&gw, &[ok1, missing, ok2], None, &()).await;

        let summary = report.summary();
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.status(), BatchStatus::Partial);
        assert!(!summary.is_failure());
        assert_eq!(store.keys(), vec!["ok1.txt", "ok2.txt"]);
    }

    #[tokio::test]
    async fn test_upload_batch_all_fail() {
        let (gw, _) = setup(MemoryStore::new());
        let paths = [PathBuf::from("/nope/a"), PathBuf::from("/nope/b")];
        let summary = upload_batch(&gw, &paths, None, &()).await.summary();
        assert_eq!(summary.successful, 0);
        assert_eq!(summary.failed, 2);
        assert!(summary.is_failure());
    }

    #[tokio::test]
    async fn test_upload_directory_maps_keys_under_prefix() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("b.txt"), "bb").unwrap();

        let (gw, store) = setup(MemoryStore::new());
        let recorder = Recorder::new();
        let report = upload_directory(
            &gw,
            dir.path(),
            Some("P/"),
            true,
            Some(StorageClass::Glacier),
            &recorder,
        )
        .await;

        assert_eq!(report.summary().successful, 2);
        assert_eq!(store.keys(), vec!["P/a.txt", "P/sub/b.txt"]);
        assert_eq!(store.entry("P/sub/b.txt").unwrap().storage_class, "GLACIER");
        assert_eq!(*recorder.total.borrow(), Some(2));
        assert_eq!(*recorder.seen.borrow(), vec!["P/a.txt", "P/sub/b.txt"]);
    }

    #[tokio::test]
    async fn test_upload_directory_empty() {
        let dir = TempDir::new().unwrap();
        let (gw, _) = setup(MemoryStore::new());
        let report = upload_directory(&gw, dir.path(), None, true, None, &()).await;

        assert_eq!(report.results.len(), 1);
        assert_eq!(
            report.results[0].error_message(),
            Some("No files found to upload")
        );
        assert!(report.summary().is_failure());
    }

    #[tokio::test]
    async fn test_download_directory_skips_placeholder() {
        let dir = TempDir::new().unwrap();
        let (gw, _) = setup(
            MemoryStore::new()
                .with_object("docs/", b"")
                .with_object("docs/a.txt", b"a")
                .with_object("docs/sub/b.txt", b"b"),
        );

        let report = download_directory(&gw, "docs", dir.path(), false, &()).await;
        assert_eq!(report.summary().successful, 2);
        assert_eq!(report.summary().failed, 0);
        assert!(dir.path().join("a.txt").is_file());
        assert!(dir.path().join("sub").join("b.txt").is_file());
    }

    #[tokio::test]
    async fn test_download_directory_no_match() {
        let dir = TempDir::new().unwrap();
        let (gw, _) = setup(MemoryStore::new());
        let report = download_directory(&gw, "docs/", dir.path(), false, &()).await;
        assert_eq!(
            report.results[0].error_message(),
            Some("No files found with this prefix")
        );
        assert!(report.summary().is_failure());
    }

    #[tokio::test]
    async fn test_download_directory_collision_is_per_item() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "local").unwrap();
        let (gw, _) = setup(
            MemoryStore::new()
                .with_object("docs/a.txt", b"remote")
                .with_object("docs/b.txt", b"remote"),
        );

        let report = download_directory(&gw, "docs/", dir.path(), false, &()).await;
        let summary = report.summary();
        assert_eq!(summary.successful, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(std::fs::read_to_string(dir.path().join("a.txt")).unwrap(), "local");
    }

    #[tokio::test]
    async fn test_download_directory_refuses_escaping_keys() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out");
        let (gw, _) = setup(MemoryStore::new().with_object("docs/../evil.txt", b"x"));

        let report = download_directory(&gw, "docs", &target, false, &()).await;
        assert!(report.summary().is_failure());
        assert!(!dir.path().join("evil.txt").exists());
    }

    #[tokio::test]
    async fn test_download_directory_listing_error() {
        let mut mock = MockObjectStore::new();
        mock.expect_list_page()
            .returning(|_, _, _| Err(Error::Connectivity("timeout".into())));
        let gw = StorageGateway::new(Arc::new(mock), "bucket");

        let dir = TempDir::new().unwrap();
        let report = download_directory(&gw, "docs", dir.path(), false, &()).await;
        assert_eq!(report.results.len(), 1);
        assert!(
            report.results[0]
                .error_message()
                .unwrap()
                .starts_with("Directory download failed")
        );
    }

    #[tokio::test]
    async fn test_delete_directory_no_match_is_success() {
        let (gw, _) = setup(MemoryStore::new());
        let report = delete_directory(&gw, "ghost/", &()).await;

        assert_eq!(report.results, vec![DeleteResult::success("ghost/", false)]);
        let summary = report.summary();
        assert!(!summary.is_failure());
        assert_eq!(summary.already_absent, 1);
    }

    #[tokio::test]
    async fn test_delete_directory_removes_children() {
        let (gw, store) = setup(
            MemoryStore::new()
                .with_object("docs/a.txt", b"a")
                .with_object("docs/sub/b.txt", b"b")
                .with_object("docs-old/c.txt", b"c"),
        );

        let report = delete_directory(&gw, "docs", &()).await;
        let summary = report.summary();
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.already_absent, 0);
        assert_eq!(store.keys(), vec!["docs-old/c.txt"]);
    }

    #[tokio::test]
    async fn test_delete_directory_counts_already_absent() {
        // Listing reports an object that vanishes before the head request
        let mut mock = MockObjectStore::new();
        mock.expect_list_page().returning(|_, _, _| {
            Ok(ListResult {
                items: vec![ObjectEntry::new("d/a", 1), ObjectEntry::new("d/b", 1)],
                ..Default::default()
            })
        });
        mock.expect_head_object().returning(|key| {
            Ok((key == "d/a").then(|| ObjectEntry::new(key, 1)))
        });
        mock.expect_delete_object().times(2).returning(|_| Ok(()));

        let gw = StorageGateway::new(Arc::new(mock), "bucket");
        let summary = delete_directory(&gw, "d/", &()).await.summary();
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.already_absent, 1);
    }
}
