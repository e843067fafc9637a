//! version, health and info commands

use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

const NAME: &str = "cloud-syncer";
const VERSION: &str = env!("CARGO_PKG_VERSION");
const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
const REPOSITORY: &str = env!("CARGO_PKG_REPOSITORY");

#[derive(Serialize)]
struct VersionOutput {
    name: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct InfoOutput {
    name: &'static str,
    version: &'static str,
    description: &'static str,
    repository: &'static str,
}

/// Show version information
pub fn version(output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    if formatter.is_json() {
        formatter.json(&VersionOutput {
            name: NAME,
            version: VERSION,
        });
    } else {
        formatter.println(&format!("{NAME} version {VERSION}"));
    }
    ExitCode::Success
}

/// Health check; needs no configuration or network
pub fn health(output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    if formatter.is_json() {
        formatter.json(&serde_json::json!({ "status": "healthy" }));
    } else {
        formatter.success(&format!("{NAME} is healthy!"));
    }
    ExitCode::Success
}

/// Show project information
pub fn info(output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let info = InfoOutput {
        name: NAME,
        version: VERSION,
        description: DESCRIPTION,
        repository: REPOSITORY,
    };

    if formatter.is_json() {
        formatter.json(&info);
    } else {
        formatter.println(&format!("Project:     {}", info.name));
        formatter.println(&format!("Version:     {}", info.version));
        formatter.println(&format!("Description: {}", info.description));
        formatter.println(&format!("Repository:  {}", info.repository));
    }
    ExitCode::Success
}
