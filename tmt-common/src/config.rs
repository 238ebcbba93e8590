//! Configuration loading and config file resolution
//!
//! Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `TMT_CONFIG` environment variable
//! 3. Per-user config file (`<config dir>/tomatomato/config.toml`)
//! 4. System config file (`/etc/tomatomato/config.toml`, Linux only)
//! 5. Compiled defaults (fallback)
//!
//! A missing implicit config file is not an error: a warning is logged and
//! compiled defaults are used. An explicitly named file must exist and parse.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "TMT_CONFIG";

/// Default HTTP port of the health assessment service
pub const DEFAULT_PORT: u16 = 5760;

/// TOML configuration file contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// HTTP port
    pub port: u16,
    /// Largest accepted request body (leaf image plus form fields)
    pub max_upload_bytes: usize,
    pub models: ModelsConfig,
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: 20 * 1024 * 1024,
            models: ModelsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Model artifact locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Base URL of the TensorFlow Serving REST endpoint hosting the leaf classifier
    pub disease_endpoint: String,
    /// Model name on the serving endpoint
    pub disease_model: String,
    /// Timeout for a single prediction request
    pub request_timeout_secs: u64,
    /// JSON export of the soil/environment random forest
    pub suitability_model: PathBuf,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            disease_endpoint: "http://127.0.0.1:8501".to_string(),
            disease_model: "cnn_crop_disease".to_string(),
            request_timeout_secs: 30,
            suitability_model: PathBuf::from("models/rf_crop_suitability.json"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing level when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Read and parse a TOML config file
pub fn load_config_file(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

/// Where a config file path came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named on the command line or via `TMT_CONFIG`; must exist
    Explicit(PathBuf),
    /// Found at a platform default location
    Discovered(PathBuf),
    /// Nothing found, use compiled defaults
    Defaults,
}

/// Resolves and loads the service configuration
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Config file path given on the command line
    pub fn with_cli_path(mut self, path: Option<PathBuf>) -> Self {
        self.cli_path = path;
        self
    }

    /// Determine which config file applies
    pub fn resolve_path(&self) -> ConfigSource {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_path {
            return ConfigSource::Explicit(path.clone());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return ConfigSource::Explicit(PathBuf::from(path));
            }
        }

        // Priority 3/4: Platform config locations
        for candidate in default_config_paths() {
            if candidate.exists() {
                return ConfigSource::Discovered(candidate);
            }
        }

        ConfigSource::Defaults
    }

    /// Load configuration following the resolution priority
    ///
    /// # Errors
    /// `Error::Config` when an explicit or discovered file cannot be read or parsed
    pub fn load(&self) -> Result<TomlConfig> {
        match self.resolve_path() {
            ConfigSource::Explicit(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                info!("Loading config from {}", path.display());
                load_config_file(&path)
            }
            ConfigSource::Discovered(path) => {
                info!("Loading config from {}", path.display());
                load_config_file(&path)
            }
            ConfigSource::Defaults => {
                warn!("No config file found, using compiled defaults");
                Ok(TomlConfig::default())
            }
        }
    }
}

/// Platform config file locations, most specific first
fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("tomatomato").join("config.toml"));
    }

    if cfg!(target_os = "linux") {
        paths.push(PathBuf::from("/etc/tomatomato/config.toml"));
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.models.request_timeout_secs, 30);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: TomlConfig = toml::from_str(
            r#"
port = 9000

[models]
disease_model = "leafnet"
"#,
        )
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.models.disease_model, "leafnet");
        assert_eq!(config.models.disease_endpoint, "http://127.0.0.1:8501");
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_cli_path_wins() {
        let resolver = ConfigResolver::new().with_cli_path(Some(PathBuf::from("/tmp/cli.toml")));
        assert_eq!(
            resolver.resolve_path(),
            ConfigSource::Explicit(PathBuf::from("/tmp/cli.toml"))
        );
    }
}
