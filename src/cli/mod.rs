//! CLI module for the document ingestion backend
//!
//! Subcommands:
//! - `serve`: run the HTTP API (default deployment mode)
//! - `extract`: run content extraction on a local file
//! - `probe-converter`: report which office-suite converter would be used

pub mod extract;
pub mod probe;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

/// Document ingestion backend - extracts uploads and serves canonical PDFs
#[derive(Parser)]
#[command(name = "doc-ingest")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Extract text or table rows from a local file and print them as JSON
    Extract(extract::ExtractArgs),

    /// Locate the local office-suite converter
    ProbeConverter(probe::ProbeArgs),
}

/// Load `.env` and the layered configuration, falling back to defaults
pub(crate) fn load_config() -> AppConfig {
    dotenvy::dotenv().ok();

    match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration, using defaults: {}", e);
            AppConfig::default()
        }
    }
}
