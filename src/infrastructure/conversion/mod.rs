//! PDF conversion backends

pub mod cloudconvert;
pub mod office;
mod retry;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::{ConversionBackend, ConversionConfig, LocalConversionConfig};
use crate::domain::conversion::PdfConverter;
use crate::domain::DomainError;

pub use cloudconvert::{mask_api_key, CloudConvertClient};
pub use office::{locate_with, probe_version, OfficeConverter};
pub use retry::{wait_for_file, RetryPolicy};

/// Upper bound for a single poll delay when backoff is configured
const MAX_POLL_DELAY: Duration = Duration::from_secs(10);

/// Retry policy for waiting on locally converted files
pub fn local_retry_policy(config: &LocalConversionConfig) -> RetryPolicy {
    RetryPolicy::fixed(config.poll_attempts.max(1), config.poll_delay())
        .with_backoff(config.backoff_factor, MAX_POLL_DELAY)
}

/// Build the configured conversion backend, if any
pub async fn create_converter(
    config: &ConversionConfig,
) -> Result<Option<Arc<dyn PdfConverter>>, DomainError> {
    match config.backend {
        ConversionBackend::None => {
            info!("No PDF conversion backend configured");
            Ok(None)
        }
        ConversionBackend::Cloud => {
            let api_key = config
                .cloud
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| {
                    DomainError::configuration(
                        "Cloud conversion requires an API key (CLOUDCONVERT_API_KEY)",
                    )
                })?;

            info!(
                api_key = %mask_api_key(&api_key),
                base_url = %config.cloud.base_url,
                "Using cloud PDF conversion"
            );

            let client = CloudConvertClient::new(
                api_key,
                config.cloud.base_url.clone(),
                config.cloud.sync_base_url.clone(),
            )?;
            Ok(Some(Arc::new(client)))
        }
        ConversionBackend::Local => {
            let converter = OfficeConverter::locate(
                config.local.binary_path.as_deref(),
                local_retry_policy(&config.local),
            )
            .await?;

            info!(binary = %converter.binary().display(), "Using local PDF conversion");
            Ok(Some(Arc::new(converter)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CloudConversionConfig;
    use crate::domain::conversion::ConverterKind;

    #[tokio::test]
    async fn test_no_backend() {
        let converter = create_converter(&ConversionConfig::default()).await.unwrap();
        assert!(converter.is_none());
    }

    #[tokio::test]
    async fn test_cloud_backend_requires_api_key() {
        let config = ConversionConfig {
            backend: ConversionBackend::Cloud,
            ..ConversionConfig::default()
        };

        let err = create_converter(&config).await.unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_cloud_backend() {
        let config = ConversionConfig {
            backend: ConversionBackend::Cloud,
            cloud: CloudConversionConfig {
                api_key: Some("abcd1234efgh5678".to_string()),
                ..CloudConversionConfig::default()
            },
            ..ConversionConfig::default()
        };

        let converter = create_converter(&config).await.unwrap().unwrap();
        assert_eq!(converter.kind(), ConverterKind::Cloud);
    }

    #[test]
    fn test_local_retry_policy() {
        let policy = local_retry_policy(&LocalConversionConfig {
            poll_attempts: 0,
            poll_delay_ms: 250,
            backoff_factor: 2.0,
            binary_path: None,
        });

        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.delay_after(0), Duration::from_millis(250));
        assert_eq!(policy.delay_after(1), Duration::from_millis(500));
    }
}
