//! Configuration loading and config file resolution
//!
//! Configuration is layered, highest priority first:
//! 1. Command-line argument
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default
//!
//! This module owns tiers 3 and 4. Tiers 1 and 2 are parsed by each binary
//! (clap `env` fallbacks) and layered on top of the [`TomlConfig`] loaded here.
//! A missing or malformed TOML file never aborts startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::analysis::DEFAULT_AGREEMENT_THRESHOLD;
use crate::session::SubmissionPolicy;
use crate::{Error, Result};

/// Compiled fallback values
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub bind_address: String,
    pub port: u16,
    pub log_level: String,
    pub event_capacity: usize,
    pub agreement_threshold: f64,
}

impl CompiledDefaults {
    pub fn new() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 5731,
            log_level: "info".to_string(),
            event_capacity: 100,
            agreement_threshold: DEFAULT_AGREEMENT_THRESHOLD,
        }
    }
}

impl Default for CompiledDefaults {
    fn default() -> Self {
        Self::new()
    }
}

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// tracing filter directive, e.g. "info" or "aiev_hv=debug"
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    CompiledDefaults::new().log_level
}

/// Review section of the TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Require feedback on every item before submission
    #[serde(default)]
    pub require_all_items: bool,

    /// Agreement rate (percent) at or above which the positive recommendations apply
    #[serde(default = "default_agreement_threshold")]
    pub agreement_threshold: f64,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            require_all_items: false,
            agreement_threshold: default_agreement_threshold(),
        }
    }
}

fn default_agreement_threshold() -> f64 {
    DEFAULT_AGREEMENT_THRESHOLD
}

impl ReviewConfig {
    pub fn submission_policy(&self) -> SubmissionPolicy {
        if self.require_all_items {
            SubmissionPolicy::Strict
        } else {
            SubmissionPolicy::Lenient
        }
    }
}

/// Contents of `<config_dir>/aiev/<module>.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_capacity: Option<usize>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub review: ReviewConfig,
}

impl TomlConfig {
    /// Reject values that would make the service misbehave
    pub fn validate(&self) -> Result<()> {
        let threshold = self.review.agreement_threshold;
        if !(0.0..=100.0).contains(&threshold) {
            return Err(Error::Config(format!(
                "review.agreement_threshold must be within 0-100, got {}",
                threshold
            )));
        }
        if self.event_capacity == Some(0) {
            return Err(Error::Config("event_capacity must be greater than 0".to_string()));
        }
        if self.logging.level.trim().is_empty() {
            return Err(Error::Config("logging.level must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Locates and loads a module's TOML config file
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    module_name: String,
}

impl ConfigResolver {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
        }
    }

    /// Default config file path for this module, if the platform has a config dir
    pub fn config_file_path(&self) -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("aiev").join(format!("{}.toml", self.module_name)))
    }

    /// Load the config file, degrading to defaults
    ///
    /// `explicit` (from `--config`) takes precedence over the default path.
    /// Missing, unreadable, malformed or invalid files are logged and
    /// replaced by [`TomlConfig::default`].
    pub fn load(&self, explicit: Option<&Path>) -> TomlConfig {
        let path = match explicit.map(Path::to_path_buf).or_else(|| self.config_file_path()) {
            Some(path) => path,
            None => {
                warn!("No config directory on this platform, using defaults");
                return TomlConfig::default();
            }
        };

        if !path.exists() {
            info!("Config file not found at {}, using defaults", path.display());
            return TomlConfig::default();
        }

        match load_toml_config(&path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                TomlConfig::default()
            }
        }
    }
}

/// Read, parse and validate a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
    config.validate()?;
    Ok(config)
}

/// Write a TOML config file atomically (temp file + rename)
///
/// Creates the parent directory when missing.
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, content)?;
    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e.into());
    }

    Ok(())
}
