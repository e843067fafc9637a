//! List commands
//!
//! List objects, summarize storage classes, and search keys.

use clap::{Args, Subcommand};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use serde::Serialize;
use syncer_core::listing::{SCAN_LIMIT, SearchPattern, StorageSummary};
use syncer_core::{ObjectEntry, StorageGateway};

use super::common::{self, ConfigPathArg};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar, format_size, format_timestamp};

/// List subcommands
#[derive(Subcommand, Debug)]
pub enum ListCommands {
    /// List files in the bucket
    Files(FilesArgs),

    /// Show a per-storage-class summary
    StorageSummary(SummaryArgs),

    /// Search for files by name pattern
    Search(SearchArgs),
}

/// Arguments for `list files`
#[derive(Args, Debug)]
pub struct FilesArgs {
    /// Prefix to filter files
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// Maximum number of files to show
    #[arg(long = "max", default_value_t = 100)]
    pub max: usize,

    /// Show size, modification time and storage class in a table
    #[arg(long)]
    pub details: bool,

    #[command(flatten)]
    pub config: ConfigPathArg,
}

/// Arguments for `list storage-summary`
#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Prefix to filter files
    #[arg(long, default_value = "")]
    pub prefix: String,

    #[command(flatten)]
    pub config: ConfigPathArg,
}

/// Arguments for `list search`
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Substring to look for in keys (case-insensitive), or a glob such as `*.jpg`
    pub pattern: String,

    /// Only search under this prefix
    #[arg(long, default_value = "")]
    pub prefix: String,

    #[command(flatten)]
    pub config: ConfigPathArg,
}

#[derive(Serialize)]
struct ListOutput<'a> {
    bucket: &'a str,
    prefix: &'a str,
    count: usize,
    files: &'a [ObjectEntry],
}

/// Execute a list subcommand
pub async fn execute(cmd: ListCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let config = match &cmd {
        ListCommands::Files(args) => &args.config,
        ListCommands::StorageSummary(args) => &args.config,
        ListCommands::Search(args) => &args.config,
    };
    let gateway = match common::open_gateway(config, &formatter).await {
        Ok(gateway) => gateway,
        Err(code) => return code,
    };

    match cmd {
        ListCommands::Files(args) => list_files(&args, &gateway, &formatter).await,
        ListCommands::StorageSummary(args) => storage_summary(&args, &gateway, &formatter).await,
        ListCommands::Search(args) => search(&args, &gateway, &formatter).await,
    }
}

async fn fetch(
    gateway: &StorageGateway,
    prefix: &str,
    limit: usize,
    formatter: &Formatter,
) -> Result<Vec<ObjectEntry>, ExitCode> {
    let spinner = ProgressBar::spinner(
        formatter.config(),
        &format!("Listing {}", gateway.object_url(prefix)),
    );
    let result = gateway.list_objects(prefix, limit).await;
    spinner.finish_and_clear();

    result.map_err(|e| {
        formatter.error(&format!("Failed to list objects: {e}"));
        ExitCode::Failure
    })
}

pub(crate) async fn list_files(args: &FilesArgs, gateway: &StorageGateway, formatter: &Formatter) -> ExitCode {
    let entries = match fetch(gateway, &args.prefix, args.max, formatter).await {
        Ok(entries) => entries,
        Err(code) => return code,
    };

    if formatter.is_json() {
        formatter.json(&ListOutput {
            bucket: gateway.bucket(),
            prefix: &args.prefix,
            count: entries.len(),
            files: &entries,
        });
        return ExitCode::Success;
    }

    if entries.is_empty() {
        formatter.println("No files found.");
        return ExitCode::Success;
    }

    formatter.println(&format!("Found {} files:", entries.len()));

    if args.details {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Key", "Size", "Modified", "Storage Class"]);
        for entry in &entries {
            table.add_row(vec![
                entry.key.clone(),
                entry.size_human(),
                format_timestamp(entry.last_modified.as_ref()),
                entry.storage_class.clone(),
            ]);
        }
        formatter.println(&table.to_string());
    } else {
        for entry in &entries {
            formatter.println(&format!(
                "{} {}",
                entry.key,
                formatter.dim(&format!("({})", entry.size_human()))
            ));
        }
    }

    ExitCode::Success
}

pub(crate) async fn storage_summary(
    args: &SummaryArgs,
    gateway: &StorageGateway,
    formatter: &Formatter,
) -> ExitCode {
    let entries = match fetch(gateway, &args.prefix, SCAN_LIMIT, formatter).await {
        Ok(entries) => entries,
        Err(code) => return code,
    };
    let summary = StorageSummary::from_entries(&entries);

    if formatter.is_json() {
        formatter.json(&summary);
        return ExitCode::Success;
    }

    if summary.is_empty() {
        formatter.println("No files found.");
        return ExitCode::Success;
    }

    formatter.println(&format!("Storage summary for {}", gateway.object_url(&args.prefix)));
    formatter.println(&format!("Total files: {}", summary.total_count));
    formatter.println(&format!("Total size:  {}", format_size(summary.total_bytes)));
    formatter.println("");
    formatter.println("Storage Class Breakdown:");
    for (class, usage) in &summary.classes {
        formatter.println(&format!(
            "  {class:<20} {:>6} files  {:>12}  ({:.1}%)",
            usage.count,
            format_size(usage.size_bytes),
            usage.percent
        ));
    }

    ExitCode::Success
}

pub(crate) async fn search(args: &SearchArgs, gateway: &StorageGateway, formatter: &Formatter) -> ExitCode {
    let pattern = match SearchPattern::parse(&args.pattern) {
        Ok(pattern) => pattern,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::Failure;
        }
    };

    let entries = match fetch(gateway, &args.prefix, SCAN_LIMIT, formatter).await {
        Ok(entries) => entries,
        Err(code) => return code,
    };
    let matches = pattern.filter(entries);

    if formatter.is_json() {
        formatter.json(&ListOutput {
            bucket: gateway.bucket(),
            prefix: &args.prefix,
            count: matches.len(),
            files: &matches,
        });
        return ExitCode::Success;
    }

    if matches.is_empty() {
        formatter.println(&format!("No files found matching '{}'.", args.pattern));
        return ExitCode::Success;
    }

    formatter.println(&format!("Found {} matching files:", matches.len()));
    for entry in &matches {
        let class = if entry.is_standard() {
            String::new()
        } else {
            format!(" [{}]", entry.storage_class)
        };
        formatter.println(&format!(
            "{} ({}){class} - {}",
            entry.key,
            entry.size_human(),
            format_timestamp(entry.last_modified.as_ref())
        ));
    }

    ExitCode::Success
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use syncer_core::memory::MemoryStore;

    fn quiet() -> Formatter {
        Formatter::new(OutputConfig {
            quiet: true,
            no_progress: true,
            ..Default::default()
        })
    }

    fn gateway() -> StorageGateway {
        let store = MemoryStore::new()
            .with_object("docs/a.txt", b"aaa")
            .with_object("photos/beach.JPG", b"jpg");
        StorageGateway::new(Arc::new(store), "bucket")
    }

    #[tokio::test]
    async fn test_list_files_empty_prefix_succeeds() {
        let args = FilesArgs {
            prefix: "missing/".into(),
            max: 100,
            details: true,
            config: ConfigPathArg::default(),
        };
        assert_eq!(list_files(&args, &gateway(), &quiet()).await, ExitCode::Success);
    }

    #[tokio::test]
    async fn test_storage_summary_succeeds() {
        let args = SummaryArgs {
            prefix: String::new(),
            config: ConfigPathArg::default(),
        };
        assert_eq!(storage_summary(&args, &gateway(), &quiet()).await, ExitCode::Success);
    }

    #[tokio::test]
    async fn test_search_invalid_glob_fails() {
        let args = SearchArgs {
            pattern: "[oops".into(),
            prefix: String::new(),
            config: ConfigPathArg::default(),
        };
        assert_eq!(search(&args, &gateway(), &quiet()).await, ExitCode::Failure);
    }

    #[tokio::test]
    async fn test_search_no_match_is_not_an_error() {
        let args = SearchArgs {
            pattern: "nothing-like-this".into(),
            prefix: String::new(),
            config: ConfigPathArg::default(),
        };
        assert_eq!(search(&args, &gateway(), &quiet()).await, ExitCode::Success);
    }
}
