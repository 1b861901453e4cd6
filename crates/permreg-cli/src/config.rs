//! CLI configuration.
//!
//! Defaults are overridden by environment variables, which are in turn
//! overridden by command-line flags.

use std::path::PathBuf;
use std::str::FromStr;

/// Default snapshot path, relative to the working directory.
pub const DEFAULT_STATE_PATH: &str = "permreg-state.json";

/// How log lines are rendered on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidLogFormat(s.to_string())),
        }
    }
}

/// Resolved CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Path of the registry snapshot file.
    pub state_path: PathBuf,
    /// Log rendering.
    pub log_format: LogFormat,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            log_format: LogFormat::Text,
        }
    }
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PERMREG_STATE` (default: `permreg-state.json`)
    /// - `PERMREG_LOG_FORMAT`, `text` or `json` (default: `text`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = lookup("PERMREG_STATE") {
            if path.trim().is_empty() {
                return Err(ConfigError::EmptyStatePath);
            }
            config.state_path = PathBuf::from(path);
        }
        if let Some(format) = lookup("PERMREG_LOG_FORMAT") {
            config.log_format = format.parse()?;
        }
        Ok(config)
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, state: Option<PathBuf>, log_format: Option<LogFormat>) -> Self {
        if let Some(state) = state {
            self.state_path = state;
        }
        if let Some(format) = log_format {
            self.log_format = format;
        }
        self
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PERMREG_STATE must not be empty")]
    EmptyStatePath,
    #[error("invalid PERMREG_LOG_FORMAT {0:?}: expected \"text\" or \"json\"")]
    InvalidLogFormat(String),
}
