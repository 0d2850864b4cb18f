use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory when no `--config` is given
pub const CONFIG_FILE_NAME: &str = "taucoder.toml";

/// Configuration loaded from taucoder.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub encoder: EncoderOptions,
    #[serde(default)]
    pub polling: PollingConfig,
}

/// Remote service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the taucoder API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Timeout in seconds for a single HTTP request
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://taucoder.com/api/v1".to_string()
}

fn default_timeout() -> u64 {
    300
}

/// Processing options sent as the `options` part of job-create
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderOptions {
    #[serde(default = "default_encoder_version")]
    pub encoder_version: String,
    /// Output quality, 0-100
    #[serde(default = "default_quality")]
    pub quality: u8,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            encoder_version: default_encoder_version(),
            quality: default_quality(),
        }
    }
}

fn default_encoder_version() -> String {
    "latest".to_string()
}

fn default_quality() -> u8 {
    50
}

/// Status polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Seconds to wait before each status request
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval(),
        }
    }
}

fn default_interval() -> u64 {
    5
}

/// CLI flags that take precedence over file values
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub encoder_version: Option<String>,
    pub quality: Option<u8>,
    pub poll_interval: Option<u64>,
}

impl Config {
    /// Load config from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e))?;
        toml::from_str(&contents).map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))
    }

    /// Try to load config from taucoder.toml in the given directory
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Merge CLI overrides into the config
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(url) = overrides.base_url {
            self.api.base_url = url;
        }
        if let Some(version) = overrides.encoder_version {
            self.encoder.encoder_version = version;
        }
        if let Some(quality) = overrides.quality {
            self.encoder.quality = quality;
        }
        if let Some(interval) = overrides.poll_interval {
            self.polling.interval_seconds = interval;
        }
        self
    }

    /// Reject values the service would refuse anyway
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.base_url must not be empty".to_string()));
        }
        if self.encoder.quality > 100 {
            return Err(ConfigError::Invalid(format!(
                "encoder.quality must be between 0 and 100, got {}",
                self.encoder.quality
            )));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(PathBuf, std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    ParseError(PathBuf, toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
