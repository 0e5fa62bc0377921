//! API error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::domain::{ConversionError, DomainError};

/// Message returned when processing an upload fails server-side
pub const PROCESSING_FAILED_MESSAGE: &str = "Error processing file";

/// Error categories exposed to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    NotFoundError,
    PaymentRequiredError,
    RateLimitError,
    ServerError,
    ServiceUnavailableError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestError => write!(f, "invalid_request_error"),
            Self::NotFoundError => write!(f, "not_found_error"),
            Self::PaymentRequiredError => write!(f, "payment_required_error"),
            Self::RateLimitError => write!(f, "rate_limit_error"),
            Self::ServerError => write!(f, "server_error"),
            Self::ServiceUnavailableError => write!(f, "service_unavailable_error"),
        }
    }
}

/// Error body: `{"message", "type", "error"?, "code"?}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
    /// Underlying failure detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error_type: ApiErrorType, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                message: message.into(),
                error_type,
                error: None,
                code: None,
            },
        }
    }

    /// Attach the underlying failure detail
    pub fn with_error(mut self, detail: impl Into<String>) -> Self {
        self.response.error = Some(detail.into());
        self
    }

    /// Add error code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.response.code = Some(code.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorType::InvalidRequestError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiErrorType::NotFoundError, message)
    }

    /// Conversion service billing limit
    pub fn payment_required(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::PAYMENT_REQUIRED,
            ApiErrorType::PaymentRequiredError,
            message,
        )
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, ApiErrorType::RateLimitError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ApiErrorType::ServerError, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorType::ServiceUnavailableError,
            message,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::InvalidId { message } => {
                Self::bad_request(message).with_code("invalid_id")
            }
            DomainError::Conversion(ConversionError::QuotaExceeded { message }) => {
                Self::payment_required("Conversion quota exceeded")
                    .with_error(message)
                    .with_code("quota_exceeded")
            }
            DomainError::Conversion(ConversionError::RateLimited { message }) => {
                Self::too_many_requests("Conversion rate limit reached")
                    .with_error(message)
                    .with_code("rate_limited")
            }
            DomainError::ConversionUnavailable { message } => {
                Self::unavailable(message).with_code("conversion_unavailable")
            }
            _ => {
                error!(error = %err, "Request failed");

                let api_error = Self::internal(PROCESSING_FAILED_MESSAGE).with_error(err.to_string());
                match &err {
                    DomainError::Conversion(ConversionError::Timeout { .. }) => {
                        api_error.with_code("conversion_timeout")
                    }
                    _ => api_error,
                }
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.response.error_type, self.response.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_api_error_creation() {
        let err = ApiError::bad_request("No file uploaded");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error_type, ApiErrorType::InvalidRequestError);
        assert_eq!(err.response.message, "No file uploaded");
    }

    #[test]
    fn test_error_serialization_omits_empty_fields() {
        let err = ApiError::not_found("Document not found");
        let json = serde_json::to_value(&err.response).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"message": "Document not found", "type": "not_found_error"})
        );
    }

    #[test]
    fn test_domain_error_status_mapping() {
        let cases: Vec<(DomainError, StatusCode)> = vec![
            (DomainError::not_found("x"), StatusCode::NOT_FOUND),
            (DomainError::validation("x"), StatusCode::BAD_REQUEST),
            (DomainError::invalid_id("x"), StatusCode::BAD_REQUEST),
            (
                ConversionError::quota_exceeded("x").into(),
                StatusCode::PAYMENT_REQUIRED,
            ),
            (
                ConversionError::rate_limited("x").into(),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                DomainError::conversion_unavailable("x"),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (DomainError::extraction("x"), StatusCode::INTERNAL_SERVER_ERROR),
            (DomainError::render("x"), StatusCode::INTERNAL_SERVER_ERROR),
            (DomainError::configuration("x"), StatusCode::INTERNAL_SERVER_ERROR),
            (
                ConversionError::job_failed("x").into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (domain_err, expected) in cases {
            let label = domain_err.to_string();
            let api_err: ApiError = domain_err.into();
            assert_eq!(api_err.status, expected, "{}", label);
        }
    }

    #[test]
    fn test_processing_failure_carries_detail() {
        let api_err: ApiError = DomainError::extraction("corrupt archive").into();

        assert_eq!(api_err.response.message, PROCESSING_FAILED_MESSAGE);
        assert!(api_err.response.error.unwrap().contains("corrupt archive"));
    }

    #[test]
    fn test_timeout_code() {
        let api_err: ApiError = DomainError::from(ConversionError::Timeout {
            path: PathBuf::from("/tmp/out.pdf"),
            waited: Duration::from_secs(10),
        })
        .into();

        assert_eq!(api_err.response.code.as_deref(), Some("conversion_timeout"));
    }

    #[test]
    fn test_quota_code() {
        let api_err: ApiError = DomainError::from(ConversionError::quota_exceeded("credits")).into();

        assert_eq!(api_err.response.code.as_deref(), Some("quota_exceeded"));
        assert_eq!(api_err.response.error.as_deref(), Some("credits"));
    }
}
