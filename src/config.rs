//! Settings for the client: backend endpoints, storage locations, timeouts.
//!
//! Values are layered: built-in defaults, then `config.toml` in the config
//! directory, then environment overrides for the two backend URLs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::backend::BackendEndpoints;
use crate::error::{NailedItError, Result};

pub const DEFAULT_PRIMARY_URL: &str = "http://localhost:8000";
pub const DEFAULT_SECONDARY_URL: &str = "https://nailedit-backend-9rey.onrender.com";

pub const PRIMARY_URL_ENV: &str = "NAILEDIT_API_URL";
pub const SECONDARY_URL_ENV: &str = "NAILEDIT_SECONDARY_API_URL";

const CONFIG_FILE_NAME: &str = "config.toml";
const PREFERENCES_FILE_NAME: &str = "preferences.json";
const SESSION_FILE_NAME: &str = "last_analysis.json";
const DEFAULT_SAMPLES_DIR: &str = "option-imgs";

/// On-disk configuration. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub primary_url: Option<String>,
    pub secondary_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub samples_dir: Option<PathBuf>,
}

impl ConfigFile {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| NailedItError::Config(format!("Invalid {}: {}", CONFIG_FILE_NAME, e)))
    }

    /// Read the config file if it exists. A missing file yields the defaults.
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        info!("Loaded config from {:?}", path);
        Self::from_toml(&content)
    }
}

/// Platform directories used by the client.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Holds `config.toml` and `preferences.json`. `None` when the platform
    /// has no config directory; preferences then live only in memory.
    pub config_dir: Option<PathBuf>,
    /// Holds the session-scoped analysis blob.
    pub cache_dir: PathBuf,
}

impl AppPaths {
    pub fn detect() -> Self {
        Self {
            config_dir: dirs::config_dir().map(|d| d.join("nailedit")),
            cache_dir: dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("nailedit"),
        }
    }

    /// Both directories rooted under `root`.
    pub fn in_dir(root: &Path) -> Self {
        Self {
            config_dir: Some(root.join("config")),
            cache_dir: root.join("cache"),
        }
    }

    pub fn config_file(&self) -> Option<PathBuf> {
        self.config_dir.as_ref().map(|d| d.join(CONFIG_FILE_NAME))
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub endpoints: BackendEndpoints,
    /// `None` means requests may wait indefinitely.
    pub request_timeout: Option<Duration>,
    pub preferences_path: Option<PathBuf>,
    pub session_path: PathBuf,
    pub samples_dir: PathBuf,
}

impl Settings {
    /// Load settings from the detected platform directories and the process
    /// environment.
    pub fn load() -> Result<Self> {
        let paths = AppPaths::detect();
        let file = match paths.config_file() {
            Some(path) => ConfigFile::read(&path)?,
            None => ConfigFile::default(),
        };
        Self::resolve(&paths, file, |key| std::env::var(key).ok())
    }

    /// Combine defaults, a parsed config file and an environment lookup.
    pub fn resolve<F>(paths: &AppPaths, file: ConfigFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let primary = env(PRIMARY_URL_ENV)
            .filter(|v| !v.trim().is_empty())
            .or(file.primary_url)
            .unwrap_or_else(|| DEFAULT_PRIMARY_URL.to_string());
        let secondary = env(SECONDARY_URL_ENV)
            .filter(|v| !v.trim().is_empty())
            .or(file.secondary_url)
            .unwrap_or_else(|| DEFAULT_SECONDARY_URL.to_string());

        let endpoints = BackendEndpoints::new(
            &validate_endpoint(&primary)?,
            &validate_endpoint(&secondary)?,
        );

        Ok(Self {
            endpoints,
            request_timeout: file.request_timeout_secs.map(Duration::from_secs),
            preferences_path: paths
                .config_dir
                .as_ref()
                .map(|d| d.join(PREFERENCES_FILE_NAME)),
            session_path: paths.cache_dir.join(SESSION_FILE_NAME),
            samples_dir: file
                .samples_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SAMPLES_DIR)),
        })
    }
}

/// Check that `raw` is an absolute http(s) URL.
fn validate_endpoint(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed)
        .map_err(|e| NailedItError::Config(format!("Invalid backend URL '{}': {}", trimmed, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(NailedItError::Config(format!(
            "Unsupported scheme '{}' in backend URL '{}'",
            other, trimmed
        ))),
    }
}
