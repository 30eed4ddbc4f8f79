use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;
use tick_mcp_client::{
    CredentialProvider, Endpoints, OAuthApp, OAuthTokens, Region, TickTickClient, http_client,
};
use tick_mcp_core::parse_timezone;

use crate::service::ServiceSettings;

const CONFIG_DIR: &str = "tick-mcp";
const CONFIG_FILE: &str = "config.toml";
const TOKEN_FILE: &str = "tokens.json";

/// Default OAuth redirect registered for the application.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8000/callback";

/// Invalid configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown timezone: {0}")]
    Timezone(String),
    #[error("max_concurrency must be at least 1")]
    Concurrency,
    #[error("request_timeout_secs must be at least 1")]
    Timeout,
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Settings loaded from `config.toml`, with environment overrides applied on top.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub region: Region,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    /// Static token, e.g. from `TICKTICK_ACCESS_TOKEN`. Takes precedence over the token file.
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// IANA zone used for date filters and bare dates.
    pub timezone: String,
    pub request_timeout_secs: u64,
    /// Upper bound on concurrent provider calls per tool invocation.
    pub max_concurrency: usize,
    pub token_path: Option<PathBuf>,
    pub api_base_url: Option<String>,
    pub oauth_base_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            region: Region::default(),
            client_id: None,
            client_secret: None,
            redirect_uri: DEFAULT_REDIRECT_URI.to_owned(),
            access_token: None,
            refresh_token: None,
            timezone: "UTC".to_owned(),
            request_timeout_secs: 30,
            max_concurrency: 4,
            token_path: None,
            api_base_url: None,
            oauth_base_url: None,
        }
    }
}

impl AppConfig {
    /// Load `explicit` or the default config file, then apply process environment overrides.
    ///
    /// A missing default file is not an error; a missing explicit file is.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or a value is invalid.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file without environment overrides.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Apply `TICKTICK_*` overrides read through `lookup`. Blank values are ignored.
    ///
    /// # Errors
    /// Returns an error if an override cannot be parsed.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(region) = get("TICKTICK_REGION") {
            self.region = region.parse().map_err(|reason| ConfigError::Invalid {
                field: "TICKTICK_REGION",
                reason,
            })?;
        }
        let strings = [
            ("TICKTICK_CLIENT_ID", &mut self.client_id),
            ("TICKTICK_CLIENT_SECRET", &mut self.client_secret),
            ("TICKTICK_ACCESS_TOKEN", &mut self.access_token),
            ("TICKTICK_REFRESH_TOKEN", &mut self.refresh_token),
            ("TICKTICK_API_BASE_URL", &mut self.api_base_url),
            ("TICKTICK_OAUTH_BASE_URL", &mut self.oauth_base_url),
        ];
        for (key, slot) in strings {
            if let Some(value) = get(key) {
                *slot = Some(value);
            }
        }
        if let Some(uri) = get("TICKTICK_REDIRECT_URI") {
            self.redirect_uri = uri;
        }
        if let Some(zone) = get("TICKTICK_TIMEZONE") {
            self.timezone = zone;
        }
        Ok(())
    }

    /// Check value ranges and that the timezone and URLs resolve.
    ///
    /// # Errors
    /// Returns the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tz()?;
        if self.max_concurrency == 0 {
            return Err(ConfigError::Concurrency);
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Timeout);
        }
        self.endpoints()?;
        Ok(())
    }

    /// Configured timezone.
    ///
    /// # Errors
    /// Fails for names that are not IANA zones.
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        parse_timezone(&self.timezone).map_err(|_| ConfigError::Timezone(self.timezone.clone()))
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Timezone and fan-out limit for [`crate::TaskService`].
    ///
    /// # Errors
    /// Fails for an unknown timezone.
    pub fn service_settings(&self) -> Result<ServiceSettings, ConfigError> {
        Ok(ServiceSettings {
            timezone: self.tz()?,
            max_concurrency: self.max_concurrency.max(1),
        })
    }

    /// Region endpoints with base URL overrides applied.
    ///
    /// # Errors
    /// Fails when an override is not a valid URL.
    pub fn endpoints(&self) -> Result<Endpoints, ConfigError> {
        let api = self
            .api_base_url
            .as_deref()
            .unwrap_or_else(|| self.region.api_base_url());
        let oauth = self
            .oauth_base_url
            .as_deref()
            .unwrap_or_else(|| self.region.oauth_base_url());
        Endpoints::new(api, oauth).map_err(|err| ConfigError::Invalid {
            field: "base url",
            reason: err.to_string(),
        })
    }

    /// Where OAuth tokens are stored.
    #[must_use]
    pub fn token_path(&self) -> Option<PathBuf> {
        self.token_path
            .clone()
            .or_else(|| dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(TOKEN_FILE)))
    }

    #[must_use]
    pub fn oauth_app(&self) -> OAuthApp {
        OAuthApp {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            redirect_uri: self.redirect_uri.clone(),
        }
    }

    /// Token from configuration or environment, if any.
    #[must_use]
    pub fn fixed_tokens(&self) -> Option<OAuthTokens> {
        self.access_token
            .clone()
            .map(|token| OAuthTokens::fixed(token, self.refresh_token.clone()))
    }

    /// Build the provider client described by this configuration.
    ///
    /// # Errors
    /// Fails when endpoints are invalid or the HTTP client cannot be created.
    pub fn client(&self) -> Result<TickTickClient> {
        let endpoints = self.endpoints()?;
        let http = http_client(self.request_timeout()).context("failed to build HTTP client")?;
        let credentials = CredentialProvider::new(
            http.clone(),
            endpoints.clone(),
            self.oauth_app(),
            self.fixed_tokens(),
            self.token_path(),
        );
        Ok(TickTickClient::new(http, endpoints, Arc::new(credentials)))
    }
}

/// `<config dir>/tick-mcp/config.toml`
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}
