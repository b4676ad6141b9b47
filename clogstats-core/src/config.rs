//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/clogstats/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/clogstats/` (~/.config/clogstats/)
//! - State/Logs: `$XDG_STATE_HOME/clogstats/` (~/.local/state/clogstats/)
//!
//! The WeeChat log directory is resolved separately, see [`Config::log_dir`].

use crate::analytics::NoiseFilters;
use crate::error::{Error, Result};
use crate::ingest::ParseMode;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Where to find logs and how to read them
    #[serde(default)]
    pub logs: LogsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Replacement for the built-in bot table (network → nicks)
    ///
    /// An empty table disables bot filtering.
    #[serde(default)]
    pub noise_filters: Option<HashMap<String, Vec<String>>>,
}

/// Log source configuration
#[derive(Debug, Deserialize, Default)]
pub struct LogsConfig {
    /// Override for the WeeChat log directory
    pub dir: Option<PathBuf>,

    /// Fail a whole source on its first malformed line instead of skipping it
    #[serde(default)]
    pub strict: bool,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Resolve the WeeChat log directory.
    ///
    /// First match wins: `cli_override`, `[logs] dir`, `$WEECHAT_HOME/logs`,
    /// `~/.weechat/logs`.
    pub fn log_dir(&self, cli_override: Option<&Path>) -> PathBuf {
        cli_override
            .map(Path::to_path_buf)
            .or_else(|| self.logs.dir.clone())
            .unwrap_or_else(Self::default_log_dir)
    }

    /// `$WEECHAT_HOME/logs`, or `~/.weechat/logs`
    pub fn default_log_dir() -> PathBuf {
        std::env::var_os("WEECHAT_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| home_dir().join(".weechat"))
            .join("logs")
    }

    /// Bot filters to apply: the configured table, or the built-in one.
    pub fn noise_filters(&self) -> NoiseFilters {
        match &self.noise_filters {
            Some(map) => NoiseFilters::from_map(map.iter().map(|(k, v)| (k.clone(), v.iter()))),
            None => NoiseFilters::default(),
        }
    }

    pub fn parse_mode(&self) -> ParseMode {
        if self.logs.strict {
            ParseMode::Strict
        } else {
            ParseMode::Lenient
        }
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/clogstats/config.toml` (~/.config/clogstats/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("clogstats").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/clogstats/` (~/.local/state/clogstats/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("clogstats")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/clogstats/clogstats.log` (~/.local/state/clogstats/clogstats.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("clogstats.log")
    }
}
