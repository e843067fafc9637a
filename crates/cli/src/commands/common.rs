//! Helpers shared by the command implementations

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use syncer_core::{
    BatchReport, BatchStatus, BatchSummary, ConfigStore, StorageConfig, StorageGateway,
    TransferOutcome,
};

use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Message printed whenever a command needs credentials that were never set up
pub const NO_CONFIG: &str = "No configuration found. Run 'config setup' first.";

/// `--config-path` option accepted by every command that touches the bucket
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigPathArg {
    /// Config file path (default: ~/.cloud_storage_syncer/config.json)
    #[arg(long, env = "SYNCER_CONFIG_PATH")]
    pub config_path: Option<PathBuf>,
}

impl ConfigPathArg {
    /// Resolve the configuration store, reporting failures
    pub fn store(&self, formatter: &Formatter) -> Result<ConfigStore, ExitCode> {
        ConfigStore::resolve(self.config_path.clone()).map_err(|e| {
            formatter.error(&e.to_string());
            ExitCode::Failure
        })
    }

    /// Load a valid configuration or explain how to create one
    pub fn load(&self, formatter: &Formatter) -> Result<StorageConfig, ExitCode> {
        let store = self.store(formatter)?;
        match store.load() {
            Ok(Some(config)) => Ok(config),
            Ok(None) => {
                formatter.error(NO_CONFIG);
                Err(ExitCode::Failure)
            }
            Err(e) => {
                formatter.error(&format!("Failed to load configuration: {e}"));
                Err(ExitCode::Failure)
            }
        }
    }
}

/// Build the gateway for a loaded configuration
pub async fn connect(config: &StorageConfig, formatter: &Formatter) -> Result<StorageGateway, ExitCode> {
    syncer_s3::connect(config).await.map_err(|e| {
        formatter.error(&format!("Failed to create S3 client: {e}"));
        ExitCode::Failure
    })
}

/// Load the configuration and connect in one step
pub async fn open_gateway(arg: &ConfigPathArg, formatter: &Formatter) -> Result<StorageGateway, ExitCode> {
    let config = arg.load(formatter)?;
    tracing::debug!(bucket = %config.bucket, region = %config.region, "Loaded configuration");
    connect(&config, formatter).await
}

#[derive(Serialize)]
struct BatchOutput<'a, R> {
    status: BatchStatus,
    #[serde(flatten)]
    summary: BatchSummary,
    results: &'a [R],
}

/// Print a batch outcome and pick the exit code
///
/// `action` is the past-tense verb used in the human summary ("Uploaded").
pub fn report_batch<R>(formatter: &Formatter, report: &BatchReport<R>, action: &str) -> ExitCode
where
    R: TransferOutcome + Serialize,
{
    let summary = report.summary();

    if formatter.is_json() {
        formatter.json(&BatchOutput {
            status: summary.status(),
            summary,
            results: &report.results,
        });
        return ExitCode::from_summary(&summary);
    }

    match summary.status() {
        BatchStatus::Complete => {
            formatter.success(&format!("{action} {} file(s)", summary.successful));
        }
        BatchStatus::Partial => {
            formatter.warning(&format!(
                "Completed with errors: {} succeeded, {} failed",
                summary.successful, summary.failed
            ));
        }
        BatchStatus::Failed => {}
    }

    for (key, message) in report.failures() {
        if key.is_empty() {
            formatter.error(message);
        } else {
            formatter.error(&format!("{key}: {message}"));
        }
    }

    ExitCode::from_summary(&summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputConfig;
    use syncer_core::{DeleteResult, UploadResult};
    use tempfile::TempDir;

    fn quiet() -> Formatter {
        Formatter::new(OutputConfig {
            quiet: true,
            ..Default::default()
        })
    }

    #[test]
    fn test_load_missing_config() {
        let dir = TempDir::new().unwrap();
        let arg = ConfigPathArg {
            config_path: Some(dir.path().join("config.json")),
        };
        assert_eq!(arg.load(&quiet()).unwrap_err(), ExitCode::Failure);
    }

    #[test]
    fn test_load_saved_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let config = StorageConfig::new("ak", "sk", "bucket", "us-east-1");
        ConfigStore::with_path(path.clone()).save(&config).unwrap();

        let arg = ConfigPathArg {
            config_path: Some(path),
        };
        assert_eq!(arg.load(&quiet()).unwrap(), config);
    }

    #[test]
    fn test_report_batch_exit_codes() {
        let formatter = quiet();

        let partial = BatchReport {
            results: vec![
                UploadResult::failure("missing.txt", "File does not exist: missing.txt"),
                UploadResult::failure("gone.txt", "File does not exist: gone.txt"),
            ],
        };
        assert_eq!(report_batch(&formatter, &partial, "Uploaded"), ExitCode::Failure);

        let absent = BatchReport {
            results: vec![DeleteResult::success("ghost/", false)],
        };
        assert_eq!(report_batch(&formatter, &absent, "Deleted"), ExitCode::Success);
    }
}
