//! Conversion-specific errors

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while converting a file to PDF through a conversion backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The conversion service did not return where to upload the file
    #[error("conversion service returned no upload target")]
    MissingUploadTarget,

    /// The conversion job finished without an exported file URL
    #[error("conversion job produced no export URL")]
    MissingExportUrl,

    /// The conversion service refused work because the account is out of credits
    #[error("conversion quota exhausted: {message}")]
    QuotaExceeded { message: String },

    /// The conversion service is throttling requests
    #[error("conversion service rate limit reached: {message}")]
    RateLimited { message: String },

    /// The conversion job itself reported a failure
    #[error("conversion job failed: {message}")]
    JobFailed { message: String },

    /// Unexpected HTTP failure talking to the conversion service
    #[error("conversion service request failed ({status}): {message}")]
    Http { status: u16, message: String },

    /// No office-suite executable could be located
    #[error("no office-suite converter found: {message}")]
    ConverterNotFound { message: String },

    /// The office-suite process exited unsuccessfully or could not start
    #[error("converter process failed: {message}")]
    Process { message: String },

    /// The converted PDF never appeared on disk
    #[error("timed out after {waited:?} waiting for {path}")]
    Timeout { path: PathBuf, waited: Duration },

    /// Local file handling failed
    #[error("conversion I/O error: {message}")]
    Io { message: String },
}

impl ConversionError {
    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self::QuotaExceeded {
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    pub fn job_failed(message: impl Into<String>) -> Self {
        Self::JobFailed {
            message: message.into(),
        }
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    pub fn converter_not_found(message: impl Into<String>) -> Self {
        Self::ConverterNotFound {
            message: message.into(),
        }
    }

    pub fn process(message: impl Into<String>) -> Self {
        Self::Process {
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ConversionError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}
