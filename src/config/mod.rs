use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use serde_with::{DurationSecondsWithFrac, serde_as};

use crate::environment::Environment;
use crate::error::{DarajaError, Result};

pub mod consts;

use consts::DEFAULT_TIMEOUT_SECS;

/// Client configuration. Immutable once handed to [`crate::Daraja`].
///
/// `timeout_secs` accepts fractional seconds in TOML (`timeout_secs = 0.5`).
#[serde_as]
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub app_key: String,
    pub app_secret: String,
    #[serde(default)]
    pub environment: Environment,
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    #[serde(default = "default_timeout", rename = "timeout_secs")]
    pub timeout: Duration,
    /// Overrides the environment's base URL (proxies, local test servers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ClientConfig {
    pub fn new(
        app_key: impl Into<String>,
        app_secret: impl Into<String>,
        environment: Environment,
    ) -> Self {
        Self {
            app_key: app_key.into(),
            app_secret: app_secret.into(),
            environment,
            timeout: default_timeout(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL every endpoint path is joined onto.
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("app_key", &self.app_key)
            .field("app_secret", &"***")
            .field("environment", &self.environment)
            .field("timeout", &self.timeout)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// One source of configuration values where every field is optional.
///
/// Layers are stacked with [`ConfigLayer::or`] (command line over file) and
/// resolved once with [`ConfigLayer::into_client_config`], so a config file
/// may carry only some settings and leave the credentials to the environment.
#[serde_as]
#[derive(Clone, Default, Deserialize)]
pub struct ConfigLayer {
    pub app_key: Option<String>,
    pub app_secret: Option<String>,
    pub environment: Option<Environment>,
    #[serde_as(as = "Option<DurationSecondsWithFrac<f64>>")]
    #[serde(rename = "timeout_secs")]
    pub timeout: Option<Duration>,
    pub base_url: Option<String>,
}

impl ConfigLayer {
    /// Keep every value set on `self`, filling the rest from `fallback`.
    pub fn or(self, fallback: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            app_key: self.app_key.or(fallback.app_key),
            app_secret: self.app_secret.or(fallback.app_secret),
            environment: self.environment.or(fallback.environment),
            timeout: self.timeout.or(fallback.timeout),
            base_url: self.base_url.or(fallback.base_url),
        }
    }

    /// Apply defaults and require the credentials.
    pub fn into_client_config(self) -> Result<ClientConfig> {
        let app_key = self
            .app_key
            .ok_or_else(|| DarajaError::Config("app_key is not set".into()))?;
        let app_secret = self
            .app_secret
            .ok_or_else(|| DarajaError::Config("app_secret is not set".into()))?;

        let mut config =
            ClientConfig::new(app_key, app_secret, self.environment.unwrap_or_default());
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        config.base_url = self.base_url;
        Ok(config)
    }
}

/// Load a complete client configuration from a TOML file.
pub fn load_config_from_path<P: AsRef<Path>>(path: P) -> Result<ClientConfig> {
    parse_toml(path.as_ref())
}

/// Load a possibly partial configuration layer from a TOML file.
pub fn load_config_layer_from_path<P: AsRef<Path>>(path: P) -> Result<ConfigLayer> {
    parse_toml(path.as_ref())
}

fn parse_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let s = fs::read_to_string(path)
        .map_err(|e| DarajaError::Config(format!("reading {}: {e}", path.display())))?;
    toml::from_str(&s).map_err(|e| DarajaError::Config(format!("parsing {}: {e}", path.display())))
}

fn default_timeout() -> Duration {
    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
}
