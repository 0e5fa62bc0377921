//! Local office-suite PDF converter

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

use super::retry::{wait_for_file, RetryPolicy};
use crate::domain::conversion::{ConversionError, ConverterKind, PdfConverter};

/// Well-known install locations, checked in order
pub const DEFAULT_BINARY_PATHS: &[&str] = &[
    "/usr/bin/soffice",
    "/usr/bin/libreoffice",
    "/usr/local/bin/soffice",
    "/usr/lib/libreoffice/program/soffice",
    "/opt/libreoffice/program/soffice",
    "/snap/bin/libreoffice",
    "/Applications/LibreOffice.app/Contents/MacOS/soffice",
    r"C:\Program Files\LibreOffice\program\soffice.exe",
    r"C:\Program Files (x86)\LibreOffice\program\soffice.exe",
];

/// Executable names probed on PATH
pub const PATH_CANDIDATES: &[&str] = &["soffice", "libreoffice"];

/// Product names a genuine converter reports from `--version`
const PRODUCT_MARKERS: &[&str] = &["LibreOffice", "OpenOffice"];

const VERSION_PROBE_TIMEOUT: Duration = Duration::from_secs(15);

/// Run `binary --version` and check it identifies as an office suite
pub async fn probe_version(binary: &Path) -> Option<String> {
    let output = tokio::time::timeout(
        VERSION_PROBE_TIMEOUT,
        Command::new(binary)
            .arg("--version")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output(),
    )
    .await
    .ok()?
    .ok()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    PRODUCT_MARKERS
        .iter()
        .any(|marker| stdout.contains(marker))
        .then(|| stdout.trim().to_string())
}

/// Find a converter executable.
///
/// Order: the explicitly configured path, then `defaults`, then each of
/// `candidates` whose `--version` output names a known office suite.
pub async fn locate_with(
    explicit: Option<&Path>,
    defaults: &[&str],
    candidates: &[&str],
) -> Result<PathBuf, ConversionError> {
    if let Some(path) = explicit {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            debug!(path = %path.display(), "Using configured converter binary");
            return Ok(path.to_path_buf());
        }
        warn!(path = %path.display(), "Configured converter binary does not exist, searching defaults");
    }

    for default in defaults {
        let path = Path::new(default);
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            debug!(path = %path.display(), "Found converter at default location");
            return Ok(path.to_path_buf());
        }
    }

    for candidate in candidates {
        let path = Path::new(candidate);
        if let Some(version) = probe_version(path).await {
            debug!(binary = %candidate, version = %version, "Found converter on PATH");
            return Ok(path.to_path_buf());
        }
    }

    Err(ConversionError::converter_not_found(
        "install LibreOffice or set conversion.local.binary_path",
    ))
}

/// Converts files to PDF with a headless LibreOffice/OpenOffice process
#[derive(Debug, Clone)]
pub struct OfficeConverter {
    binary: PathBuf,
    retry: RetryPolicy,
}

impl OfficeConverter {
    pub fn new(binary: impl Into<PathBuf>, retry: RetryPolicy) -> Self {
        Self {
            binary: binary.into(),
            retry,
        }
    }

    /// Locate the binary using the default search order
    pub async fn locate(explicit: Option<&Path>, retry: RetryPolicy) -> Result<Self, ConversionError> {
        let binary = locate_with(explicit, DEFAULT_BINARY_PATHS, PATH_CANDIDATES).await?;
        Ok(Self::new(binary, retry))
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

#[async_trait]
impl PdfConverter for OfficeConverter {
    fn kind(&self) -> ConverterKind {
        ConverterKind::Local
    }

    #[instrument(skip_all, fields(input = %input.display()))]
    async fn convert_to_pdf(&self, input: &Path, output: &Path) -> Result<PathBuf, ConversionError> {
        let out_dir = output
            .parent()
            .ok_or_else(|| ConversionError::io(format!("'{}' has no parent directory", output.display())))?;
        let stem = input
            .file_stem()
            .ok_or_else(|| ConversionError::io(format!("'{}' has no file name", input.display())))?;
        let produced = out_dir.join(format!("{}.pdf", stem.to_string_lossy()));

        let result = Command::new(&self.binary)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(out_dir)
            .arg(input)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                ConversionError::process(format!("failed to start '{}': {}", self.binary.display(), e))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(ConversionError::process(format!(
                "'{}' exited with {}: {}",
                self.binary.display(),
                result.status,
                stderr.trim()
            )));
        }

        wait_for_file(&produced, &self.retry).await?;

        if produced != output {
            tokio::fs::rename(&produced, output).await?;
        }

        info!(output = %output.display(), "Local conversion finished");
        Ok(output.to_path_buf())
    }
}
