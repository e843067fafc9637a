//! Download commands
//!
//! `download file` accepts either an object key or a prefix; which one is
//! decided by listing the bucket under the given key.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use syncer_core::walker::{self, TargetKind};
use syncer_core::{DownloadRequest, DownloadResult, StorageGateway, bulk};

use super::common::{self, ConfigPathArg};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar, format_size};

/// Listing cap used to tell a single object from a prefix
const DETECTION_LIMIT: usize = 1000;

/// Download subcommands
#[derive(Subcommand, Debug)]
pub enum DownloadCommands {
    /// Download a file or directory from S3
    File(FileArgs),
}

/// Arguments for `download file`
#[derive(Args, Debug)]
pub struct FileArgs {
    /// S3 key (file or directory prefix) to download
    pub key: String,

    /// Local output path (file or directory)
    #[arg(short, long, visible_alias = "output-dir")]
    pub output_path: Option<PathBuf>,

    /// Overwrite existing files
    #[arg(long, visible_alias = "force")]
    pub overwrite: bool,

    #[command(flatten)]
    pub config: ConfigPathArg,
}

/// Execute a download subcommand
pub async fn execute(cmd: DownloadCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let DownloadCommands::File(args) = cmd;
    let gateway = match common::open_gateway(&args.config, &formatter).await {
        Ok(gateway) => gateway,
        Err(code) => return code,
    };

    download(&args, &gateway, &formatter).await
}

pub(crate) async fn download(args: &FileArgs, gateway: &StorageGateway, formatter: &Formatter) -> ExitCode {
    let request = match DownloadRequest::new(args.key.as_str(), args.output_path.clone(), args.overwrite) {
        Ok(request) => request,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::Failure;
        }
    };

    let entries = match gateway.list_objects(request.key(), DETECTION_LIMIT).await {
        Ok(entries) => entries,
        Err(e) => {
            formatter.error(&format!("Failed to list objects: {e}"));
            return ExitCode::Failure;
        }
    };

    match walker::classify_target(request.key(), &entries) {
        TargetKind::SingleObject => download_single(&request, gateway, formatter).await,
        TargetKind::Directory => {
            let local_dir = args
                .output_path
                .clone()
                .unwrap_or_else(|| walker::default_download_dir(request.key()));

            formatter.println(&format!(
                "Downloading directory {} to {}",
                gateway.object_url(request.key()),
                local_dir.display()
            ));

            let progress = ProgressBar::new(formatter.config(), 0);
            let report = bulk::download_directory(
                gateway,
                request.key(),
                &local_dir,
                request.overwrite(),
                &progress,
            )
            .await;
            progress.finish_and_clear();

            common::report_batch(formatter, &report, "Downloaded")
        }
        TargetKind::NotFound => {
            formatter.error(&format!(
                "No files found matching: {}",
                gateway.object_url(request.key())
            ));
            ExitCode::Failure
        }
    }
}

async fn download_single(request: &DownloadRequest, gateway: &StorageGateway, formatter: &Formatter) -> ExitCode {
    formatter.println(&format!("Downloading {}", gateway.object_url(request.key())));

    let result = gateway.download_object(request).await;

    if formatter.is_json() {
        formatter.json(&result);
    }

    match result {
        DownloadResult::Success {
            local_path,
            size_bytes,
            ..
        } => {
            formatter.success("Download successful!");
            formatter.println(&format!("  File: {}", local_path.display()));
            formatter.println(&format!("  Size: {}", format_size(size_bytes)));
            ExitCode::Success
        }
        DownloadResult::Failure { message, .. } => {
            formatter.error(&format!("Download failed: {message}"));
            ExitCode::Failure
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use syncer_core::memory::MemoryStore;
    use tempfile::TempDir;

    fn quiet() -> Formatter {
        Formatter::new(OutputConfig {
            quiet: true,
            no_progress: true,
            ..Default::default()
        })
    }

    fn args(key: &str, output: PathBuf, overwrite: bool) -> FileArgs {
        FileArgs {
            key: key.into(),
            output_path: Some(output),
            overwrite,
            config: ConfigPathArg::default(),
        }
    }

    fn gateway(store: MemoryStore) -> StorageGateway {
        StorageGateway::new(Arc::new(store), "bucket")
    }

    #[tokio::test]
    async fn test_download_single_object() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("a.txt");
        let gw = gateway(MemoryStore::new().with_object("docs/a.txt", b"hello"));

        let code = download(&args("docs/a.txt", out.clone(), false), &gw, &quiet()).await;
        assert_eq!(code, ExitCode::Success);
        assert_eq!(std::fs::read_to_string(out).unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_download_collision_needs_overwrite() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("a.txt");
        std::fs::write(&out, "mine").unwrap();
        let gw = gateway(MemoryStore::new().with_object("a.txt", b"theirs"));

        let code = download(&args("a.txt", out.clone(), false), &gw, &quiet()).await;
        assert_eq!(code, ExitCode::Failure);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "mine");

        let code = download(&args("a.txt", out.clone(), true), &gw, &quiet()).await;
        assert_eq!(code, ExitCode::Success);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "theirs");
    }

    #[tokio::test]
    async fn test_download_directory_prefix() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("photos");
        let gw = gateway(
            MemoryStore::new()
                .with_object("photos/", b"")
                .with_object("photos/2024/a.jpg", b"a")
                .with_object("photos/b.jpg", b"b"),
        );

        let code = download(&args("photos", out.clone(), false), &gw, &quiet()).await;
        assert_eq!(code, ExitCode::Success);
        assert!(out.join("2024").join("a.jpg").is_file());
        assert!(out.join("b.jpg").is_file());
    }

    #[tokio::test]
    async fn test_download_not_found() {
        let dir = TempDir::new().unwrap();
        let gw = gateway(MemoryStore::new());
        let code = download(&args("ghost", dir.path().join("x"), false), &gw, &quiet()).await;
        assert_eq!(code, ExitCode::Failure);
    }

    #[tokio::test]
    async fn test_download_blank_key() {
        let dir = TempDir::new().unwrap();
        let gw = gateway(MemoryStore::new());
        let code = download(&args("   ", dir.path().join("x"), false), &gw, &quiet()).await;
        assert_eq!(code, ExitCode::Failure);
    }
}
