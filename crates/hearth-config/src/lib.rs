//! Settings persistence for hearth.
//!
//! One TOML file under the platform config dir holds the hub base URL
//! and the long-lived access token; `HEARTH_URL` / `HEARTH_TOKEN`
//! environment variables override the file for scripting and CI. The
//! token is plain text at rest (mirroring the hub's own long-lived
//! token model) and travels as a [`SecretString`] once loaded.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const ENV_PREFIX: &str = "HEARTH_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a config directory for this platform")]
    NoConfigDir,

    #[error("failed to read settings: {0}")]
    Extract(#[from] Box<figment::Error>),

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Persisted connection settings for one hub.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Hub base URL, e.g. `http://homeassistant.local:8123`.
    #[serde(default)]
    pub url: String,

    /// Long-lived access token.
    #[serde(default)]
    pub token: String,
}

impl Settings {
    /// Both fields present — the engine can be pointed at a hub.
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.token.is_empty()
    }

    /// The access token wrapped for downstream use.
    pub fn token_secret(&self) -> SecretString {
        SecretString::from(self.token.clone())
    }
}

/// Path of the settings file: `<platform config dir>/hearth/config.toml`.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    ProjectDirs::from("rs", "hearth", "hearth")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .ok_or(ConfigError::NoConfigDir)
}

/// Load settings from the default path, with env overrides applied.
/// A missing file yields default (unconfigured) settings.
pub fn load_settings() -> Result<Settings, ConfigError> {
    load_settings_from(&config_path()?)
}

/// Load settings from an explicit file, with env overrides applied.
pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()
        .map_err(|e| ConfigError::Extract(Box::new(e)))
}

/// Write settings to the default path, creating parent dirs as needed.
/// Returns the path written.
pub fn save_settings(settings: &Settings) -> Result<PathBuf, ConfigError> {
    let path = config_path()?;
    save_settings_to(&path, settings)?;
    Ok(path)
}

/// Write settings to an explicit file, creating parent dirs as needed.
pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    let rendered = toml::to_string_pretty(settings)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, rendered).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}
