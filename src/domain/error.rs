use thiserror::Error;

use super::conversion::ConversionError;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid ID format: {message}")]
    InvalidId { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("Extraction error: {message}")]
    Extraction { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Conversion error: {0}")]
    Conversion(ConversionError),

    #[error("Conversion unavailable: {message}")]
    ConversionUnavailable { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::InvalidId {
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction {
            message: message.into(),
        }
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    pub fn conversion_unavailable(message: impl Into<String>) -> Self {
        Self::ConversionUnavailable {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the error came from the conversion service refusing work for billing reasons
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::Conversion(ConversionError::QuotaExceeded { .. }))
    }

    /// Whether the error came from the conversion service throttling requests
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Conversion(ConversionError::RateLimited { .. }))
    }
}

impl From<ConversionError> for DomainError {
    fn from(err: ConversionError) -> Self {
        Self::Conversion(err)
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}
