//! Configuration loading from TOML files and environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::detector::{Timeout, DEFAULT_UNIT_MS};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timeout: TimeoutConfig,
    #[serde(default)]
    pub idle: IdleConfig,
    #[serde(default)]
    pub active: ActiveConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Timeout shared by both detectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Number of units in one timeout.
    #[serde(default = "default_period_count")]
    pub period_count: u32,
    /// Length of one unit in milliseconds.
    #[serde(default = "default_unit_ms")]
    pub unit_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            period_count: default_period_count(),
            unit_ms: default_unit_ms(),
        }
    }
}

impl TimeoutConfig {
    pub fn timeout(&self) -> Timeout {
        Timeout::new(self.period_count, self.unit_ms)
    }
}

/// Idle detector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdleConfig {
    /// Fire again after every further timeout of silence.
    #[serde(default)]
    pub repeat: bool,
    /// Watch the default document events.
    #[serde(default = "default_true")]
    pub watch_default_surface: bool,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            repeat: false,
            watch_default_surface: true,
        }
    }
}

/// Active detector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveConfig {
    /// Fire on the interaction itself rather than at the period boundary.
    #[serde(default)]
    pub immediate: bool,
    /// Watch the default document events.
    #[serde(default = "default_true")]
    pub watch_default_surface: bool,
}

impl Default for ActiveConfig {
    fn default() -> Self {
        Self {
            immediate: false,
            watch_default_surface: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Data directory for transition logs.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    /// Returns the logs directory path.
    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

// Default value functions
fn default_period_count() -> u32 {
    5
}

fn default_unit_ms() -> u64 {
    DEFAULT_UNIT_MS
}

fn default_true() -> bool {
    true
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".idlewatch"))
        .unwrap_or_else(|| PathBuf::from(".idlewatch"))
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse config file")
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_toml(&content)
    }

    /// Load configuration with environment variable overrides.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = config_path {
            Self::from_file(path)?
        } else {
            // Try default config locations
            let default_paths = [
                PathBuf::from("config/default.toml"),
                dirs::config_dir()
                    .map(|d| d.join("idlewatch/config.toml"))
                    .unwrap_or_default(),
            ];

            let mut loaded = None;
            for path in &default_paths {
                if path.is_file() {
                    loaded = Some(Self::from_file(path)?);
                    break;
                }
            }
            loaded.unwrap_or_default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.logging.data_dir = expand_tilde(&config.logging.data_dir);

        Ok(config)
    }

    /// Apply `IDLEWATCH_*` overrides looked up through `var`.
    ///
    /// Values that fail to parse are ignored.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("IDLEWATCH_PERIOD_COUNT").and_then(|v| v.parse().ok()) {
            self.timeout.period_count = v;
        }
        if let Some(v) = var("IDLEWATCH_UNIT_MS").and_then(|v| v.parse().ok()) {
            self.timeout.unit_ms = v;
        }
        if let Some(v) = var("IDLEWATCH_REPEAT").and_then(|v| v.parse().ok()) {
            self.idle.repeat = v;
        }
        if let Some(v) = var("IDLEWATCH_IMMEDIATE").and_then(|v| v.parse().ok()) {
            self.active.immediate = v;
        }
        if let Some(val) = var("IDLEWATCH_DATA_DIR") {
            self.logging.data_dir = PathBuf::from(val);
        }
        if let Some(val) = var("IDLEWATCH_LOG_LEVEL") {
            self.logging.level = val;
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.timeout.unit_ms == 0 {
            anyhow::bail!("Timeout unit must be greater than 0 ms");
        }
        if self.logging.level.trim().is_empty() {
            anyhow::bail!("Log level cannot be empty");
        }
        Ok(())
    }
}

/// Expand ~ to home directory.
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}
