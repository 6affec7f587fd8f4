use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::openai::ClientError;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";
pub const CONFIG_PATH_ENV: &str = "OAICHAT_CONFIG";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Connection settings for [`crate::openai::OpenAIClient`].
#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub default_model: Option<String>,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: None,
        }
    }

    /// Uses `api_key` when given, else `OPENAI_API_KEY`. `OPENAI_BASE_URL` overrides the endpoint.
    pub fn from_env(api_key: Option<&str>) -> Result<Self, ClientError> {
        Self::resolve(api_key, None, |name| env::var(name).ok())
    }

    /// Resolves key and endpoint with an injectable variable lookup.
    ///
    /// The endpoint is the first non-blank of `OPENAI_BASE_URL`, `fallback_base_url`
    /// and the public API URL.
    pub fn resolve(
        api_key: Option<&str>,
        fallback_base_url: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ClientError> {
        let api_key = api_key
            .map(str::to_string)
            .or_else(|| lookup(API_KEY_ENV))
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(ClientError::MissingApiKey)?;

        let base_url = non_blank(lookup(BASE_URL_ENV))
            .or_else(|| non_blank(fallback_base_url.map(str::to_string)))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            api_key,
            base_url,
            default_model: None,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

/// CLI defaults stored under `[profiles.<name>]`.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct ProfileConfig {
    pub model: Option<String>,
    pub system: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub base_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    profiles: Option<HashMap<String, ProfileConfig>>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot resolve config path: set OAICHAT_CONFIG or HOME/XDG_CONFIG_HOME.")]
    NoConfigPath,
    #[error("Failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Config file '{}' does not contain a [profiles] section.", path.display())]
    MissingProfiles { path: PathBuf },
    #[error("Profile '{name}' not found in config file '{}'.", path.display())]
    ProfileNotFound { name: String, path: PathBuf },
}

pub fn load_profile(name: &str) -> Result<ProfileConfig, ConfigError> {
    let path = config_path(|name| env::var(name).ok())?;
    load_profile_from(&path, name)
}

pub fn load_profile_from(path: &Path, name: &str) -> Result<ProfileConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config: ConfigFile = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let profiles = config.profiles.ok_or_else(|| ConfigError::MissingProfiles {
        path: path.to_path_buf(),
    })?;

    profiles
        .get(name)
        .cloned()
        .ok_or_else(|| ConfigError::ProfileNotFound {
            name: name.to_string(),
            path: path.to_path_buf(),
        })
}

fn config_path(lookup: impl Fn(&str) -> Option<String>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = lookup(CONFIG_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    if let Some(xdg) = lookup("XDG_CONFIG_HOME") {
        let trimmed = xdg.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed).join("oaichat").join("config.toml"));
        }
    }

    let home = lookup("HOME").ok_or(ConfigError::NoConfigPath)?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("oaichat")
        .join("config.toml"))
}
