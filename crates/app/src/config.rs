//! Application configuration
//!
//! Read from `config.toml` in the platform config directory, or from an
//! explicit `--config` path. Every key is optional.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use tagdesk_net::DEFAULT_BASE_URL;

const CONFIG_FILE: &str = "config.toml";
const DEFAULT_CONSOLE_LEVEL: &str = "info";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not determine data directory")]
    NoDataDir,
}

/// Keys as written in `config.toml`
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    api_base_url: Option<String>,
    sessions_dir: Option<PathBuf>,
    logs_dir: Option<PathBuf>,
    console_level: Option<String>,
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub sessions_dir: PathBuf,
    pub logs_dir: PathBuf,
    /// `EnvFilter` directive for the console, overridden by `RUST_LOG`
    pub console_level: String,
}

impl AppConfig {
    /// Defaults rooted at `data_dir`
    pub fn with_data_dir(data_dir: &Path) -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            sessions_dir: data_dir.join("sessions"),
            logs_dir: data_dir.join("logs"),
            console_level: DEFAULT_CONSOLE_LEVEL.to_string(),
        }
    }

    /// Load from `path`, or from the platform config file when `None`
    ///
    /// A missing platform config file yields the defaults; a missing
    /// explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let dirs = ProjectDirs::from("dev", "tagdesk", "tagdesk").ok_or(ConfigError::NoDataDir)?;
        let data_dir = dirs.data_dir();

        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (dirs.config_dir().join(CONFIG_FILE), false),
        };

        if !required && !path.exists() {
            return Ok(Self::with_data_dir(data_dir));
        }

        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Self::parse(&text, data_dir)
    }

    /// Parse config text, filling absent keys from the defaults under `data_dir`
    pub fn parse(text: &str, data_dir: &Path) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text)?;
        let defaults = Self::with_data_dir(data_dir);

        Ok(Self {
            api_base_url: file.api_base_url.unwrap_or(defaults.api_base_url),
            sessions_dir: file.sessions_dir.unwrap_or(defaults.sessions_dir),
            logs_dir: file.logs_dir.unwrap_or(defaults.logs_dir),
            console_level: file.console_level.unwrap_or(defaults.console_level),
        })
    }
}
