//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, CloudConversionConfig, ConversionBackend, ConversionConfig, CorsConfig,
    LocalConversionConfig, LogFormat, LoggingConfig, ServerConfig, StorageConfig,
};
