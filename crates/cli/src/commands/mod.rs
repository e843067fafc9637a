//! CLI command definitions and execution
//!
//! Commands are grouped by resource (`config`, `upload`, `download`,
//! `delete`, `list`). Each group loads its own configuration and builds its
//! own gateway, so nothing is shared between invocations.

use clap::{Parser, Subcommand};

use crate::exit_code::ExitCode;
use crate::output::OutputConfig;

mod about;
mod common;
mod completions;
mod config;
mod delete;
mod download;
mod list;
mod upload;

/// syncer - personal S3 storage client
///
/// Upload, download, delete, list and search objects in one configured
/// S3-compatible bucket.
#[derive(Parser, Debug)]
#[command(name = "syncer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress bar
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage S3 credentials
    #[command(subcommand)]
    Config(config::ConfigCommands),

    /// Upload files to S3
    #[command(subcommand)]
    Upload(upload::UploadCommands),

    /// Download files from S3
    #[command(subcommand)]
    Download(download::DownloadCommands),

    /// Delete files from S3
    #[command(subcommand)]
    Delete(delete::DeleteCommands),

    /// List and search files in S3
    #[command(subcommand)]
    List(list::ListCommands),

    /// Show version information
    Version,

    /// Health check
    Health,

    /// Show project information
    Info,

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        no_progress: cli.no_progress,
        quiet: cli.quiet,
    };

    if output_config.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    match cli.command {
        Commands::Config(cmd) => config::execute(cmd, output_config).await,
        Commands::Upload(cmd) => upload::execute(cmd, output_config).await,
        Commands::Download(cmd) => download::execute(cmd, output_config).await,
        Commands::Delete(cmd) => delete::execute(cmd, output_config).await,
        Commands::List(cmd) => list::execute(cmd, output_config).await,
        Commands::Version => about::version(output_config),
        Commands::Health => about::health(output_config),
        Commands::Info => about::info(output_config),
        Commands::Completions(args) => completions::execute(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_download_aliases() {
        let cli = Cli::try_parse_from([
            "syncer",
            "download",
            "file",
            "docs/",
            "--output-dir",
            "/tmp/out",
            "--force",
        ])
        .unwrap();

        match cli.command {
            Commands::Download(download::DownloadCommands::File(args)) => {
                assert_eq!(args.key, "docs/");
                assert!(args.overwrite);
                assert_eq!(args.output_path.unwrap().to_str(), Some("/tmp/out"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_storage_class() {
        let cli = Cli::try_parse_from([
            "syncer",
            "upload",
            "file",
            "a.txt",
            "--storage-class",
            "glacier_ir",
        ])
        .unwrap();

        match cli.command {
            Commands::Upload(upload::UploadCommands::File(args)) => {
                assert_eq!(args.storage_class, Some(syncer_core::StorageClass::GlacierIr));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let err = Cli::try_parse_from([
            "syncer",
            "upload",
            "file",
            "a.txt",
            "--storage-class",
            "FAST",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("STANDARD_IA"));
    }

    #[test]
    fn test_parse_config_setup_no_test() {
        let cli = Cli::try_parse_from(["syncer", "config", "setup", "--no-test", "--bucket", "b"])
            .unwrap();
        match cli.command {
            Commands::Config(config::ConfigCommands::Setup(args)) => {
                assert!(args.no_test);
                assert_eq!(args.bucket.as_deref(), Some("b"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_json_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["syncer", "list", "files", "--json", "--max", "5"]).unwrap();
        assert!(cli.json);
    }
}
