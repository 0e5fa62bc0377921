//! Probe command - reports the office-suite converter discovery result

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::infrastructure::conversion::office::{DEFAULT_BINARY_PATHS, PATH_CANDIDATES};
use crate::infrastructure::conversion::{locate_with, probe_version};
use crate::infrastructure::logging::init_logging;

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Explicit converter path to try first (defaults to conversion.local.binary_path)
    #[arg(long, value_name = "PATH")]
    pub binary: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ProbeReport {
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    binary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub async fn run(args: ProbeArgs) -> anyhow::Result<()> {
    let config = super::load_config();
    init_logging(&config.logging);

    let explicit = args.binary.or(config.conversion.local.binary_path);
    let report = match locate_with(explicit.as_deref(), DEFAULT_BINARY_PATHS, PATH_CANDIDATES).await
    {
        Ok(binary) => ProbeReport {
            found: true,
            version: probe_version(&binary).await,
            binary: Some(binary.display().to_string()),
            error: None,
        },
        Err(e) => ProbeReport {
            found: false,
            binary: None,
            version: None,
            error: Some(e.to_string()),
        },
    };

    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.found {
        anyhow::bail!("no office-suite converter found");
    }

    Ok(())
}
