//! PDF converter capability

use std::fmt::{self, Debug};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::ConversionError;

/// Which conversion backend a deployment uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConverterKind {
    /// Third-party conversion API
    Cloud,
    /// Locally installed office suite
    Local,
}

impl fmt::Display for ConverterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cloud => write!(f, "cloud"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// Converts a document on disk into a PDF on disk
#[async_trait]
pub trait PdfConverter: Send + Sync + Debug {
    fn kind(&self) -> ConverterKind;

    /// Convert `input` and leave the finished PDF at `output`.
    ///
    /// Resolves only once the PDF exists on disk.
    async fn convert_to_pdf(&self, input: &Path, output: &Path) -> Result<PathBuf, ConversionError>;
}
