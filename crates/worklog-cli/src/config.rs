//! Persistent CLI configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use worklog_core::config::ApiConfig;
use worklog_core::util::trimmed_non_empty;

use crate::error::CliError;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_VERSION: u32 = 1;

pub const DEFAULT_USER_ID: &str = "local";

pub const ENV_API_URL: &str = "WORKLOG_API_URL";
pub const ENV_API_TOKEN: &str = "WORKLOG_API_TOKEN";
pub const ENV_USER_ID: &str = "WORKLOG_USER_ID";
pub const ENV_DB_PATH: &str = "WORKLOG_DB_PATH";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

const fn default_config_version() -> u32 {
    CONFIG_VERSION
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("worklog")
        .join(CONFIG_FILE_NAME)
}

impl CliConfig {
    pub fn load() -> Result<Self, CliError> {
        Self::load_from_path(&default_config_path())
    }

    pub fn load_from_path(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            return Ok(Self::default().normalized());
        }

        let raw = std::fs::read_to_string(path).map_err(|error| {
            CliError::Config(format!(
                "Failed to read config at {}: {}",
                path.display(),
                error
            ))
        })?;
        let config = serde_json::from_str::<Self>(&raw).map_err(|error| {
            CliError::Config(format!(
                "Failed to parse config at {}: {}",
                path.display(),
                error
            ))
        })?;
        Ok(config.normalized())
    }

    pub fn save(&self) -> Result<PathBuf, CliError> {
        let path = default_config_path();
        self.save_to_path(&path)?;
        Ok(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), CliError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                CliError::Config(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    error
                ))
            })?;
        }

        let serialized = serde_json::to_string_pretty(&self.clone().normalized())?;
        std::fs::write(path, serialized).map_err(|error| {
            CliError::Config(format!(
                "Failed to write config at {}: {}",
                path.display(),
                error
            ))
        })
    }

    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.version == 0 {
            self.version = CONFIG_VERSION;
        }
        self.api_base_url = trimmed_non_empty(self.api_base_url)
            .map(|url| url.trim_end_matches('/').to_string());
        self.api_token = trimmed_non_empty(self.api_token);
        self.user_id = trimmed_non_empty(self.user_id);
        self
    }

    /// Apply `WORKLOG_*` environment variables on top of the file values
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    #[must_use]
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = trimmed_non_empty(lookup(ENV_API_URL)) {
            self.api_base_url = Some(url);
        }
        if let Some(token) = trimmed_non_empty(lookup(ENV_API_TOKEN)) {
            self.api_token = Some(token);
        }
        if let Some(user_id) = trimmed_non_empty(lookup(ENV_USER_ID)) {
            self.user_id = Some(user_id);
        }
        self.normalized()
    }

    /// Remote API settings, or `None` for local-only mode
    pub fn api_config(&self) -> Result<Option<ApiConfig>, CliError> {
        let Some(url) = trimmed_non_empty(self.api_base_url.clone()) else {
            return Ok(None);
        };
        let config = ApiConfig::new(url)
            .map_err(|error| CliError::Config(format!("api_base_url: {error}")))?
            .with_auth_token(self.api_token.clone());
        Ok(Some(config))
    }

    pub fn user_id(&self) -> String {
        trimmed_non_empty(self.user_id.clone()).unwrap_or_else(|| DEFAULT_USER_ID.to_string())
    }
}
