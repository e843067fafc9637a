//! Upload commands
//!
//! Upload a single file, a directory tree, or a list of files.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use syncer_core::{StorageClass, StorageGateway, UploadRequest, UploadResult, bulk};

use super::common::{self, ConfigPathArg};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar, format_size};

/// Upload subcommands
#[derive(Subcommand, Debug)]
pub enum UploadCommands {
    /// Upload a single file to S3
    File(FileArgs),

    /// Upload all files in a directory to S3
    Directory(DirectoryArgs),

    /// Upload the files listed in a text file, one path per line
    Batch(BatchArgs),
}

/// Arguments for `upload file`
#[derive(Args, Debug)]
pub struct FileArgs {
    /// Path to file to upload
    pub path: PathBuf,

    /// S3 key (defaults to the file name)
    #[arg(long)]
    pub s3_key: Option<String>,

    /// S3 storage class (default: STANDARD)
    #[arg(long)]
    pub storage_class: Option<StorageClass>,

    #[command(flatten)]
    pub config: ConfigPathArg,
}

/// Arguments for `upload directory`
#[derive(Args, Debug)]
pub struct DirectoryArgs {
    /// Directory to upload
    pub path: PathBuf,

    /// S3 prefix for uploaded files
    #[arg(long)]
    pub prefix: Option<String>,

    /// S3 storage class (default: STANDARD)
    #[arg(long)]
    pub storage_class: Option<StorageClass>,

    /// Include subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    #[command(flatten)]
    pub config: ConfigPathArg,
}

/// Arguments for `upload batch`
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Text file containing the paths to upload
    pub file_list: PathBuf,

    /// S3 storage class (default: STANDARD)
    #[arg(long)]
    pub storage_class: Option<StorageClass>,

    #[command(flatten)]
    pub config: ConfigPathArg,
}

/// Execute an upload subcommand
pub async fn execute(cmd: UploadCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let config = match &cmd {
        UploadCommands::File(args) => &args.config,
        UploadCommands::Directory(args) => &args.config,
        UploadCommands::Batch(args) => &args.config,
    };
    let gateway = match common::open_gateway(config, &formatter).await {
        Ok(gateway) => gateway,
        Err(code) => return code,
    };

    match cmd {
        UploadCommands::File(args) => upload_file(&args, &gateway, &formatter).await,
        UploadCommands::Directory(args) => upload_directory(&args, &gateway, &formatter).await,
        UploadCommands::Batch(args) => upload_batch(&args, &gateway, &formatter).await,
    }
}

pub(crate) async fn upload_file(args: &FileArgs, gateway: &StorageGateway, formatter: &Formatter) -> ExitCode {
    if !args.path.exists() {
        formatter.error(&format!("File not found: {}", args.path.display()));
        return ExitCode::Failure;
    }
    if !args.path.is_file() {
        formatter.error(&format!("Path is not a file: {}", args.path.display()));
        return ExitCode::Failure;
    }

    let key = match &args.s3_key {
        Some(key) if !key.trim().is_empty() => key.clone(),
        _ => file_name(&args.path),
    };

    formatter.println(&format!(
        "Uploading {} to {}",
        args.path.display(),
        gateway.object_url(&key)
    ));

    let request = UploadRequest::new(&args.path, key).with_storage_class(args.storage_class);
    let result = gateway.upload_object(&request).await;

    if formatter.is_json() {
        formatter.json(&result);
    }

    match result {
        UploadResult::Success {
            url,
            storage_class,
            size_bytes,
            ..
        } => {
            formatter.success("Upload successful!");
            formatter.println(&format!("  S3 URL:        {url}"));
            formatter.println(&format!("  Storage Class: {storage_class}"));
            formatter.println(&format!("  Size:          {}", format_size(size_bytes)));
            ExitCode::Success
        }
        UploadResult::Failure { message, .. } => {
            formatter.error(&format!("Upload failed: {message}"));
            ExitCode::Failure
        }
    }
}

pub(crate) async fn upload_directory(
    args: &DirectoryArgs,
    gateway: &StorageGateway,
    formatter: &Formatter,
) -> ExitCode {
    if !args.path.exists() {
        formatter.error(&format!("Directory not found: {}", args.path.display()));
        return ExitCode::Failure;
    }
    if !args.path.is_dir() {
        formatter.error(&format!("Path is not a directory: {}", args.path.display()));
        return ExitCode::Failure;
    }

    formatter.println(&format!(
        "Uploading {} to {}",
        args.path.display(),
        gateway.object_url(args.prefix.as_deref().unwrap_or_default())
    ));

    let progress = ProgressBar::new(formatter.config(), 0);
    let report = bulk::upload_directory(
        gateway,
        &args.path,
        args.prefix.as_deref(),
        args.recursive,
        args.storage_class,
        &progress,
    )
    .await;
    progress.finish_and_clear();

    common::report_batch(formatter, &report, "Uploaded")
}

pub(crate) async fn upload_batch(args: &BatchArgs, gateway: &StorageGateway, formatter: &Formatter) -> ExitCode {
    let content = match std::fs::read_to_string(&args.file_list) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            formatter.error(&format!("File list not found: {}", args.file_list.display()));
            return ExitCode::Failure;
        }
        Err(e) => {
            formatter.error(&format!("Error reading file list: {e}"));
            return ExitCode::Failure;
        }
    };

    let paths = parse_file_list(&content);
    if paths.is_empty() {
        formatter.error("No files found in the list.");
        return ExitCode::Failure;
    }

    formatter.println(&format!("Found {} files to upload", paths.len()));

    let progress = ProgressBar::new(formatter.config(), paths.len() as u64);
    let report = bulk::upload_batch(gateway, &paths, args.storage_class, &progress).await;
    progress.finish_and_clear();

    common::report_batch(formatter, &report, "Uploaded")
}

/// One path per non-blank line, surrounding whitespace ignored
fn parse_file_list(content: &str) -> Vec<PathBuf> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
