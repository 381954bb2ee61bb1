//! Configuration management for Imagemill.
//!
//! Configuration is loaded from the platform config directory (falling
//! back to `~/.imagemill/config.toml`) with sensible defaults; CLI flags
//! override config values.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ConfigError;
use crate::format::OutputFormat;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Worker pool settings
    pub processing: ProcessingConfig,

    /// Default output encoding
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Worker pool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of parallel workers; 0 = one per available CPU core
    pub parallel_workers: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self { parallel_workers: 0 }
    }
}

/// Default output encoding, used when the CLI does not specify one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format name ("jpeg", "webp", "png")
    pub format: String,

    /// Compression quality 0-100; absent = per-format default
    pub quality: Option<u8>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "jpeg".to_string(),
            quality: None,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level ("trace", "debug", "info", "warn", "error")
    pub level: String,

    /// Log format ("pretty" or "json")
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories, falling back to
    /// `~/.imagemill/config.toml` if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("io", "imagemill", "imagemill")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".imagemill").join("config.toml")
            })
    }

    /// The default output format as a typed value.
    pub fn output_format(&self) -> Result<OutputFormat, ConfigError> {
        OutputFormat::from_str(&self.output.format)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(quality) = self.output.quality {
            if quality > 100 {
                return Err(ConfigError::ValidationError(format!(
                    "output.quality must be 0-100, got {quality}"
                )));
            }
        }
        self.output_format()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.processing.parallel_workers, 0);
        assert_eq!(config.output.format, "jpeg");
        assert_eq!(config.output.quality, None);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_to_toml() {
        let toml = Config::default().to_toml().unwrap();
        assert!(toml.contains("[processing]"));
        assert!(toml.contains("[output]"));
        assert!(toml.contains("[logging]"));
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let config = Config::default();
        let parsed: Config = toml::from_str(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed.output.format, config.output.format);
        assert_eq!(parsed.processing.parallel_workers, 0);
    }

    #[test]
    fn test_load_from_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[processing]\nparallel_workers = 8\n\n[output]\nformat = \"webp\"\nquality = 70\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.processing.parallel_workers, 8);
        assert_eq!(config.output_format().unwrap(), OutputFormat::WebP);
        assert_eq!(config.output.quality, Some(70));
        // Unspecified sections keep defaults
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validation_rejects_bad_quality() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[output]\nquality = 150\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validation_rejects_bad_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[output]\nformat = \"bmp\"\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
