//! Configuration management for GroupStats
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `GROUPSTATS__`-prefixed environment variables (`GROUPSTATS__VIEW__PAGE_SIZE=25`).

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::attribution::AttributionPolicy;
use crate::error::{Error, Result};

/// Environment variable prefix for settings overrides
pub const ENV_PREFIX: &str = "GROUPSTATS";

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Attribution configuration
    pub attribution: AttributionConfig,

    /// Table view configuration
    pub view: ViewConfig,

    /// CSV export configuration
    pub export: ExportConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from defaults, an optional file and the environment.
    ///
    /// With no explicit `path`, `config.toml` in the platform config directory
    /// is used when it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        match path {
            Some(path) => {
                debug!(path = %path.display(), "Loading settings file");
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                if let Some(path) = default_config_path().filter(|p| p.exists()) {
                    debug!(path = %path.display(), "Loading default settings file");
                    builder = builder.add_source(config::File::from(path).required(false));
                }
            }
        }

        let settings: Self = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.view.page_size == 0 {
            return Err(Error::config("view.page_size must be at least 1"));
        }
        if self.view.max_window_days == 0 {
            return Err(Error::config("view.max_window_days must be at least 1"));
        }
        if self.view.default_window_days > self.view.max_window_days {
            return Err(Error::config(format!(
                "view.default_window_days ({}) exceeds view.max_window_days ({})",
                self.view.default_window_days, self.view.max_window_days
            )));
        }
        Ok(())
    }
}

/// Platform config file location (`~/.config/groupstats/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "groupstats", "groupstats")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Attribution configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributionConfig {
    /// How a multi-group member's usage is distributed
    pub policy: AttributionPolicy,
}

/// Table view configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Rows per table page
    pub page_size: usize,
    /// Length of the window shown when none is given, ending today
    pub default_window_days: u32,
    /// Longest window a caller may query
    pub max_window_days: u32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            default_window_days: 30,
            max_window_days: 365,
        }
    }
}

/// CSV export configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// File name prefix, followed by the window dates
    pub filename_prefix: String,
    /// Prefix the file with a UTF-8 byte-order mark
    pub include_bom: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            filename_prefix: "GroupStatistics".to_string(),
            include_bom: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (json or pretty)
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
