//! Delete commands

use clap::{Args, Subcommand};
use syncer_core::walker::{self, TargetKind};
use syncer_core::{DeleteRequest, DeleteResult, StorageGateway, bulk};

use super::common::{self, ConfigPathArg};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Listing cap used to tell a single object from a prefix
const DETECTION_LIMIT: usize = 1000;

/// Delete subcommands
#[derive(Subcommand, Debug)]
pub enum DeleteCommands {
    /// Delete a file or directory from S3
    File(FileArgs),
}

/// Arguments for `delete file`
#[derive(Args, Debug)]
pub struct FileArgs {
    /// S3 key (file or directory prefix) to delete
    pub key: String,

    /// Succeed even when nothing matches the key
    #[arg(short, long)]
    pub force: bool,

    #[command(flatten)]
    pub config: ConfigPathArg,
}

/// Execute a delete subcommand
pub async fn execute(cmd: DeleteCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let DeleteCommands::File(args) = cmd;
    let gateway = match common::open_gateway(&args.config, &formatter).await {
        Ok(gateway) => gateway,
        Err(code) => return code,
    };

    delete(&args, &gateway, &formatter).await
}

pub(crate) async fn delete(args: &FileArgs, gateway: &StorageGateway, formatter: &Formatter) -> ExitCode {
    let request = match DeleteRequest::new(args.key.as_str(), args.force) {
        Ok(request) => request,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::Failure;
        }
    };
    let key = request.key();

    let entries = match gateway.list_objects(key, DETECTION_LIMIT).await {
        Ok(entries) => entries,
        Err(e) => {
            formatter.error(&format!("Failed to list objects: {e}"));
            return ExitCode::Failure;
        }
    };

    match walker::classify_target(key, &entries) {
        TargetKind::SingleObject => {
            formatter.println(&format!("Deleting {}", gateway.object_url(key)));
            let result = gateway.delete_object(key).await;

            if formatter.is_json() {
                formatter.json(&result);
            }

            match result {
                DeleteResult::Success {
                    existed_before_delete: true,
                    ..
                } => {
                    formatter.success("File deleted successfully!");
                    ExitCode::Success
                }
                DeleteResult::Success { .. } => {
                    formatter.success("Delete operation completed (file was already deleted).");
                    ExitCode::Success
                }
                DeleteResult::Failure { message, .. } => {
                    formatter.error(&format!("Delete failed: {message}"));
                    ExitCode::Failure
                }
            }
        }
        TargetKind::Directory => {
            formatter.println(&format!("Deleting directory {}", gateway.object_url(key)));

            let progress = ProgressBar::new(formatter.config(), 0);
            let report = bulk::delete_directory(gateway, key, &progress).await;
            progress.finish_and_clear();

            let code = common::report_batch(formatter, &report, "Deleted");
            let absent = report.summary().already_absent;
            if absent > 0 {
                formatter.println(&format!("{absent} file(s) were already absent"));
            }
            code
        }
        TargetKind::NotFound if request.force() => {
            if formatter.is_json() {
                formatter.json(&DeleteResult::success(key, false));
            }
            formatter.success(&format!(
                "Delete operation completed (no files found matching: {key})"
            ));
            ExitCode::Success
        }
        TargetKind::NotFound => {
            formatter.error(&format!("No files found matching: {}", gateway.object_url(key)));
            formatter.println("Use --force to suppress this error for non-existent files");
            ExitCode::Failure
        }
    }
}
