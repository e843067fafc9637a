//! Configuration commands
//!
//! Create, inspect, test and remove the stored S3 credentials.

use clap::{Args, Subcommand};
use dialoguer::{Input, Password};
use serde::Serialize;
use syncer_core::config::DEFAULT_REGION;
use syncer_core::StorageConfig;

use super::common::{self, ConfigPathArg, NO_CONFIG};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Set up S3 configuration
    Setup(SetupArgs),

    /// Show current configuration
    Show(ConfigPathArg),

    /// Test S3 connection
    Test(ConfigPathArg),

    /// Remove configuration file
    Remove(ConfigPathArg),
}

/// Arguments for the `config setup` command
///
/// Any credential left out on the command line is prompted for.
#[derive(Args, Debug)]
pub struct SetupArgs {
    /// AWS access key ID
    #[arg(long)]
    pub access_key: Option<String>,

    /// AWS secret access key
    #[arg(long)]
    pub secret_key: Option<String>,

    /// S3 bucket name
    #[arg(long)]
    pub bucket: Option<String>,

    /// AWS region
    #[arg(long)]
    pub region: Option<String>,

    /// Custom endpoint for S3-compatible services
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Test connection after setup (default)
    #[arg(long, overrides_with = "no_test")]
    pub test: bool,

    /// Save without testing the connection
    #[arg(long, overrides_with = "test")]
    pub no_test: bool,

    #[command(flatten)]
    pub config: ConfigPathArg,
}

impl SetupArgs {
    fn should_test(&self) -> bool {
        !self.no_test
    }
}

#[derive(Serialize)]
struct ConfigOutput {
    access_key: String,
    bucket: String,
    region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    endpoint: Option<String>,
    config_path: String,
}

/// Execute a config subcommand
pub async fn execute(cmd: ConfigCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    match cmd {
        ConfigCommands::Setup(args) => setup(args, &formatter).await,
        ConfigCommands::Show(args) => show(&args, &formatter),
        ConfigCommands::Test(args) => test(&args, &formatter).await,
        ConfigCommands::Remove(args) => remove(&args, &formatter),
    }
}

fn prompt_secret(label: &str) -> Result<String, dialoguer::Error> {
    Password::new().with_prompt(label).interact()
}

fn prompt_text(label: &str, default: Option<&str>) -> Result<String, dialoguer::Error> {
    let mut input = Input::<String>::new().with_prompt(label);
    if let Some(default) = default {
        input = input.default(default.to_string());
    }
    input.interact_text()
}

fn fill_missing(args: &SetupArgs) -> Result<StorageConfig, dialoguer::Error> {
    let access_key = match &args.access_key {
        Some(value) => value.clone(),
        None => prompt_secret("AWS Access Key ID")?,
    };
    let secret_key = match &args.secret_key {
        Some(value) => value.clone(),
        None => prompt_secret("AWS Secret Access Key")?,
    };
    let bucket = match &args.bucket {
        Some(value) => value.clone(),
        None => prompt_text("S3 Bucket name", None)?,
    };
    let region = match &args.region {
        Some(value) => value.clone(),
        None => prompt_text("AWS Region", Some(DEFAULT_REGION))?,
    };

    let mut config = StorageConfig::new(access_key, secret_key, bucket, region);
    config.endpoint = args.endpoint.clone();
    Ok(config)
}

async fn setup(args: SetupArgs, formatter: &Formatter) -> ExitCode {
    let store = match args.config.store(formatter) {
        Ok(store) => store,
        Err(code) => return code,
    };

    let config = match fill_missing(&args) {
        Ok(config) => config,
        Err(e) => {
            formatter.error(&format!("Failed to read input: {e}"));
            return ExitCode::Failure;
        }
    };

    if let Err(e) = config.validate() {
        formatter.error(&format!("Invalid configuration provided: {e}"));
        return ExitCode::Failure;
    }

    if args.should_test() {
        formatter.println("Testing S3 connection...");
        let gateway = match common::connect(&config, formatter).await {
            Ok(gateway) => gateway,
            Err(code) => return code,
        };
        if !gateway.test_connection().await {
            formatter.error("Failed to connect to S3. Please check your credentials and bucket.");
            return ExitCode::Failure;
        }
        formatter.success("S3 connection successful!");
    }

    match store.save(&config) {
        Ok(()) => {
            formatter.success(&format!(
                "Configuration saved to {}",
                store.config_path().display()
            ));
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to save configuration: {e}"));
            ExitCode::Failure
        }
    }
}

fn show(args: &ConfigPathArg, formatter: &Formatter) -> ExitCode {
    let store = match args.store(formatter) {
        Ok(store) => store,
        Err(code) => return code,
    };
    let config = match store.load() {
        Ok(Some(config)) => config,
        Ok(None) => {
            formatter.error(NO_CONFIG);
            return ExitCode::Failure;
        }
        Err(e) => {
            formatter.error(&format!("Failed to load configuration: {e}"));
            return ExitCode::Failure;
        }
    };

    let output = ConfigOutput {
        access_key: config.masked_access_key(),
        bucket: config.bucket.clone(),
        region: config.region.clone(),
        endpoint: config.endpoint.clone(),
        config_path: store.config_path().display().to_string(),
    };

    if formatter.is_json() {
        formatter.json(&output);
    } else {
        formatter.println("Current S3 Configuration:");
        formatter.println(&format!("  Access Key:  {}", output.access_key));
        formatter.println(&format!("  Bucket:      {}", output.bucket));
        formatter.println(&format!("  Region:      {}", output.region));
        if let Some(endpoint) = &output.endpoint {
            formatter.println(&format!("  Endpoint:    {endpoint}"));
        }
        formatter.println(&format!("  Config file: {}", output.config_path));
    }

    ExitCode::Success
}

async fn test(args: &ConfigPathArg, formatter: &Formatter) -> ExitCode {
    let config = match args.load(formatter) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let gateway = match common::connect(&config, formatter).await {
        Ok(gateway) => gateway,
        Err(code) => return code,
    };

    formatter.println("Testing S3 connection...");
    let connected = gateway.test_connection().await;

    if formatter.is_json() {
        formatter.json(&serde_json::json!({
            "bucket": config.bucket,
            "connected": connected,
        }));
    }

    if connected {
        formatter.success("S3 connection successful!");
        ExitCode::Success
    } else {
        formatter.error("Failed to connect to S3. Please check your configuration.");
        ExitCode::Failure
    }
}

fn remove(args: &ConfigPathArg, formatter: &Formatter) -> ExitCode {
    let store = match args.store(formatter) {
        Ok(store) => store,
        Err(code) => return code,
    };

    match store.remove() {
        Ok(true) => {
            formatter.success("Configuration removed successfully.");
            ExitCode::Success
        }
        Ok(false) => {
            formatter.error("No configuration file found.");
            ExitCode::Failure
        }
        Err(e) => {
            formatter.error(&format!("Failed to remove configuration: {e}"));
            ExitCode::Failure
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use syncer_core::ConfigStore;
    use tempfile::TempDir;

    fn quiet() -> Formatter {
        Formatter::new(OutputConfig {
            quiet: true,
            ..Default::default()
        })
    }

    fn setup_args(path: &Path, bucket: &str) -> SetupArgs {
        SetupArgs {
            access_key: Some("AKIAEXAMPLE".into()),
            secret_key: Some("secret".into()),
            bucket: Some(bucket.into()),
            region: Some("eu-west-1".into()),
            endpoint: None,
            test: false,
            no_test: true,
            config: ConfigPathArg {
                config_path: Some(path.to_path_buf()),
            },
        }
    }

    #[test]
    fn test_should_test_defaults_to_true() {
        let dir = TempDir::new().unwrap();
        let mut args = setup_args(dir.path(), "b");
        args.no_test = false;
        assert!(args.should_test());
    }

    #[tokio::test]
    async fn test_setup_without_connection_test_saves() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let code = setup(setup_args(&path, "my-bucket"), &quiet()).await;
        assert_eq!(code, ExitCode::Success);

        let saved = ConfigStore::with_path(path).load().unwrap().unwrap();
        assert_eq!(saved.bucket, "my-bucket");
        assert_eq!(saved.region, "eu-west-1");
    }

    #[tokio::test]
    async fn test_setup_rejects_blank_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let code = setup(setup_args(&path, "   "), &quiet()).await;
        assert_eq!(code, ExitCode::Failure);
        assert!(!path.exists());
    }

    #[test]
    fn test_show_and_remove_lifecycle() {
        let dir = TempDir::new().unwrap();
        let arg = ConfigPathArg {
            config_path: Some(dir.path().join("config.json")),
        };
        let formatter = quiet();

        assert_eq!(show(&arg, &formatter), ExitCode::Failure);
        assert_eq!(remove(&arg, &formatter), ExitCode::Failure);

        ConfigStore::with_path(dir.path().join("config.json"))
            .save(&StorageConfig::new("ak", "sk", "b", "r"))
            .unwrap();

        assert_eq!(show(&arg, &formatter), ExitCode::Success);
        assert_eq!(remove(&arg, &formatter), ExitCode::Success);
        assert_eq!(remove(&arg, &formatter), ExitCode::Failure);
    }
}
