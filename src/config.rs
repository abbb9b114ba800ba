use std::path::PathBuf;

use thiserror::Error;

/// Directory created under the system temp dir when no base path is configured.
pub const DEFAULT_BASE_DIR_NAME: &str = "FileStorage";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_format: LogFormat,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Google Cloud Logging structured output
    Gcp,
    Json,
    #[default]
    Text,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory all keys resolve beneath
    pub base_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
        }
    }
}

fn default_base_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_BASE_DIR_NAME)
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_path = lookup("FILE_STORAGE_BASE_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_base_path);

        let log_format = match lookup("LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "gcp" => LogFormat::Gcp,
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let config = Config {
            log_format,
            storage: StorageConfig { base_path },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.base_path.as_os_str().as_encoded_bytes().contains(&0) {
            return Err(ConfigError::ValidationError(
                "FILE_STORAGE_BASE_PATH cannot contain a NUL byte".to_string(),
            ));
        }

        if self.storage.base_path.is_relative() {
            tracing::warn!(
                "FILE_STORAGE_BASE_PATH {} is relative and will resolve against the working directory.",
                self.storage.base_path.display()
            );
        }

        Ok(())
    }
}
