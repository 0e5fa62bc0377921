use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::infrastructure::conversion::cloudconvert::{DEFAULT_BASE_URL, DEFAULT_SYNC_BASE_URL};
use crate::infrastructure::observability::ObservabilityConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub conversion: ConversionConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Browser origins allowed to call the API
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

/// Where uploads and canonical PDFs live, and upload limits
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,
    #[serde(default = "default_max_files_per_request")]
    pub max_files_per_request: usize,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConversionBackend {
    /// Presentations are extracted directly
    #[default]
    None,
    Cloud,
    Local,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConversionConfig {
    #[serde(default)]
    pub backend: ConversionBackend,
    #[serde(default)]
    pub cloud: CloudConversionConfig,
    #[serde(default)]
    pub local: LocalConversionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudConversionConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_cloud_base_url")]
    pub base_url: String,
    #[serde(default = "default_cloud_sync_base_url")]
    pub sync_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalConversionConfig {
    /// Explicit path to soffice; searched for when unset
    #[serde(default)]
    pub binary_path: Option<PathBuf>,
    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,
    #[serde(default = "default_poll_delay_ms")]
    pub poll_delay_ms: u64,
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_files_per_request() -> usize {
    50
}

fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

fn default_cloud_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_cloud_sync_base_url() -> String {
    DEFAULT_SYNC_BASE_URL.to_string()
}

fn default_poll_attempts() -> u32 {
    20
}

fn default_poll_delay_ms() -> u64 {
    500
}

fn default_backoff_factor() -> f64 {
    1.0
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uploads_dir: default_uploads_dir(),
            max_files_per_request: default_max_files_per_request(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl StorageConfig {
    /// Directory holding generated canonical PDFs
    pub fn pdf_dir(&self) -> PathBuf {
        self.uploads_dir.join("pdfs")
    }
}

impl Default for CloudConversionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_cloud_base_url(),
            sync_base_url: default_cloud_sync_base_url(),
        }
    }
}

impl Default for LocalConversionConfig {
    fn default() -> Self {
        Self {
            binary_path: None,
            poll_attempts: default_poll_attempts(),
            poll_delay_ms: default_poll_delay_ms(),
            backoff_factor: default_backoff_factor(),
        }
    }
}

impl LocalConversionConfig {
    pub fn poll_delay(&self) -> Duration {
        Duration::from_millis(self.poll_delay_ms)
    }
}

impl AppConfig {
    /// Load layered configuration: config files, then `APP__*` variables,
    /// then the plain `PORT`, `CLOUDCONVERT_API_KEY` and `SOFFICE_PATH`
    /// variables used by existing deployments.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", non_empty_env("PORT"))?
            .set_override_option("conversion.cloud.api_key", non_empty_env("CLOUDCONVERT_API_KEY"))?
            .set_override_option("conversion.local.binary_path", non_empty_env("SOFFICE_PATH"))?
            .build()?;

        config.try_deserialize()
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.cors.allowed_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.storage.uploads_dir, PathBuf::from("uploads"));
        assert_eq!(config.storage.pdf_dir(), PathBuf::from("uploads/pdfs"));
        assert_eq!(config.storage.max_files_per_request, 50);
        assert_eq!(config.conversion.backend, ConversionBackend::None);
        assert_eq!(config.conversion.cloud.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.conversion.local.poll_attempts, 20);
        assert_eq!(config.conversion.local.poll_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_deserialize_partial_sections() {
        let config: AppConfig = config::Config::builder()
            .set_override("conversion.backend", "local")
            .unwrap()
            .set_override("conversion.local.poll_attempts", 3)
            .unwrap()
            .set_override("storage.uploads_dir", "/srv/uploads")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.conversion.backend, ConversionBackend::Local);
        assert_eq!(config.conversion.local.poll_attempts, 3);
        assert_eq!(config.conversion.local.poll_delay_ms, 500);
        assert_eq!(config.storage.pdf_dir(), PathBuf::from("/srv/uploads/pdfs"));
        assert_eq!(config.server.port, 5000);
    }
}
