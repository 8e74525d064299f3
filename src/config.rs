use crate::error::{Result, StacError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const DEFAULT_STAC_URL: &str = "https://discover.digitalglobe.com/v2/stac";
pub const DEFAULT_AUTH_URL: &str = "https://geobigdata.io/auth/v1/oauth/token";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const ENV_STAC_URL: &str = "STAC_SERVICE_URL";
pub const ENV_AUTH_URL: &str = "STAC_AUTH_URL";
pub const ENV_USERNAME: &str = "STAC_USERNAME";
pub const ENV_PASSWORD: &str = "STAC_PASSWORD";
pub const ENV_TOKEN: &str = "STAC_TOKEN";

/// Endpoints and transport settings for a catalog client.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub stac_url: String,
    pub auth_url: String,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            stac_url: DEFAULT_STAC_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| StacError::Config(e.to_string()))?;
        Ok(config)
    }

    pub fn write<P: AsRef<Path>>(self: &Self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| StacError::Config(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Defaults overridden by `STAC_SERVICE_URL` and `STAC_AUTH_URL`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_STAC_URL).filter(|v| !v.is_empty()) {
            self.stac_url = url;
        }
        if let Some(url) = lookup(ENV_AUTH_URL).filter(|v| !v.is_empty()) {
            self.auth_url = url;
        }
    }

    pub fn stac_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.stac_url)?)
    }

    pub fn auth_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.auth_url)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
