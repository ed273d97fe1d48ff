//! Settings for the cloudenv control-plane provider
//!
//! Settings come from an optional YAML file plus environment variables.
//! Environment variables win over file values.
//!
//! ```yaml
//! api_url: https://control-plane.example.com/api/v1/graphql
//! api_token: "..."
//! request_timeout_secs: 60
//! timeouts:
//!   deletion_secs: 3600
//!   mfa_confirmation_secs: 900
//!   spec_revision_secs: 3600
//!   poll_interval_secs: 30
//! ```

pub mod error;

pub use error::*;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_PATH_ENV: &str = "CLOUDENV_CONFIG_PATH";
pub const API_URL_ENV: &str = "CLOUDENV_API_URL";
pub const API_TOKEN_ENV: &str = "CLOUDENV_API_TOKEN";

const CANDIDATES: [&str; 3] = ["cloudenv.local.yaml", "cloudenv.yaml", ".cloudenv.yaml"];

/// Provider settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// GraphQL endpoint of the control plane
    pub api_url: Option<String>,

    /// Bearer token used for every request
    pub api_token: Option<String>,

    /// Per-request HTTP timeout
    pub request_timeout_secs: u64,

    pub timeouts: TimeoutSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: None,
            api_token: None,
            request_timeout_secs: 60,
            timeouts: TimeoutSettings::default(),
        }
    }
}

/// Wait budgets, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    pub deletion_secs: u64,
    pub mfa_confirmation_secs: u64,
    pub spec_revision_secs: u64,
    pub poll_interval_secs: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            deletion_secs: 60 * 60,
            mfa_confirmation_secs: 15 * 60,
            spec_revision_secs: 60 * 60,
            poll_interval_secs: 30,
        }
    }
}

impl TimeoutSettings {
    pub fn deletion(&self) -> Duration {
        Duration::from_secs(self.deletion_secs)
    }

    pub fn mfa_confirmation(&self) -> Duration {
        Duration::from_secs(self.mfa_confirmation_secs)
    }

    pub fn spec_revision(&self) -> Duration {
        Duration::from_secs(self.spec_revision_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Settings {
    /// Discover, parse, override from the environment and validate.
    pub fn load() -> Result<Self> {
        let mut settings = match find_settings_file()? {
            Some(path) => Self::from_file(&path)?,
            None => {
                tracing::debug!("No settings file found, using defaults");
                Self::default()
            }
        };

        settings.apply_env_overrides();
        settings.validate()?;
        Ok(settings)
    }

    /// Parse a YAML settings file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        // An empty document is a valid, empty settings file.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Replace file values with `CLOUDENV_API_URL` / `CLOUDENV_API_TOKEN`.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            self.api_url = Some(url);
        }
        if let Ok(token) = std::env::var(API_TOKEN_ENV) {
            self.api_token = Some(token);
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.api_url()?;
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::InvalidSetting {
                field: "api_url",
                message: format!("expected an http(s) URL, got '{}'", url),
            });
        }
        self.api_token()?;

        let t = &self.timeouts;
        for (field, value) in [
            ("timeouts.deletion_secs", t.deletion_secs),
            ("timeouts.mfa_confirmation_secs", t.mfa_confirmation_secs),
            ("timeouts.spec_revision_secs", t.spec_revision_secs),
            ("timeouts.poll_interval_secs", t.poll_interval_secs),
            ("request_timeout_secs", self.request_timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidSetting {
                    field,
                    message: "must be greater than zero".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn api_url(&self) -> Result<&str> {
        non_empty(self.api_url.as_deref())
            .ok_or(ConfigError::MissingSetting("api_url", API_URL_ENV))
    }

    pub fn api_token(&self) -> Result<&str> {
        non_empty(self.api_token.as_deref())
            .ok_or(ConfigError::MissingSetting("api_token", API_TOKEN_ENV))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Locate the settings file
///
/// Search order:
/// 1. `CLOUDENV_CONFIG_PATH` (must exist when set)
/// 2. current directory: cloudenv.local.yaml, cloudenv.yaml, .cloudenv.yaml
/// 3. `./.cloudenv/` with the same names
/// 4. `<config dir>/cloudenv/config.yaml`
pub fn find_settings_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        return Err(ConfigError::SettingsFileNotFound(path));
    }

    let current_dir = std::env::current_dir()?;

    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    let local_dir = current_dir.join(".cloudenv");
    if local_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = local_dir.join(filename);
            if path.exists() {
                return Ok(Some(path));
            }
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join("cloudenv").join("config.yaml");
        if global.exists() {
            return Ok(Some(global));
        }
    }

    Ok(None)
}
