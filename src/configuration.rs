use std::{env, time};

use config::{Config, ConfigError, Environment, File};
use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::ConnectOptions;
use tracing::log::LevelFilter;
use url::ParseError;

use crate::webhook_client::WebhookClient;

/// Settings
#[derive(Clone, serde::Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub webhook: WebhookSettings,
}

/// Read the settings for the current environment
pub fn get_config() -> Result<Settings, ConfigError> {
    Settings::get_config()
}

impl Settings {
    /// Get settings from configuration files
    pub fn get_config() -> Result<Self, ConfigError> {
        let path = env::current_dir().expect("Failed to determine the current directory");
        let config_dir = path.join("config");

        // Detect the running environment (default: `dev`)
        let env: Env = env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "dev".into())
            .try_into()
            .map_err(ConfigError::Message)?;

        // Read the configuration from files and environment variables
        Config::builder()
            // Base configuration file
            .add_source(File::from(config_dir.join("base.yaml")).required(true))
            // Environment-specific configuration file
            .add_source(File::from(config_dir.join(env.as_str())).required(true))
            // Environment variables (e.g., `COMINGSOON__WEBHOOK__URL=https://...`
            // would set Settings.webhook.url)
            .add_source(Environment::with_prefix("COMINGSOON").separator("__"))
            .build()?
            .try_deserialize()
    }
}

/// Application settings
#[derive(Clone, serde::Deserialize)]
pub struct ApplicationSettings {
    pub app_host: String,
    pub app_port: u16,
}

/// Database settings
#[derive(Clone, serde::Deserialize)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: SecretString,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub require_ssl: bool,
    pub store_timeout_millis: u64,
}

impl DatabaseSettings {
    /// Generate options and flags that can be used to configure a database connection
    pub fn db_options(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };
        PgConnectOptions::new()
            .username(&self.username)
            .password(self.password.expose_secret())
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .ssl_mode(ssl_mode)
            .log_statements(LevelFilter::Trace)
    }

    /// Upper bound for a single write to the subscription store
    pub const fn store_timeout(&self) -> time::Duration {
        time::Duration::from_millis(self.store_timeout_millis)
    }
}

/// Automation webhook settings
#[derive(Clone, serde::Deserialize)]
pub struct WebhookSettings {
    /// Pre-signed trigger URL, it embeds its own access credential
    pub url: SecretString,
    pub timeout_millis: u64,
}

impl WebhookSettings {
    /// Build the webhook client
    pub fn client(&self) -> Result<WebhookClient, WebhookConfigError> {
        let url = self.url()?;
        WebhookClient::new(url, self.timeout()).map_err(WebhookConfigError::Client)
    }

    /// Parse the trigger URL
    pub fn url(&self) -> Result<Url, WebhookConfigError> {
        Url::parse(self.url.expose_secret()).map_err(WebhookConfigError::InvalidUrl)
    }

    /// Get configured timeout
    pub const fn timeout(&self) -> time::Duration {
        time::Duration::from_millis(self.timeout_millis)
    }
}

/// Webhook configuration error
#[derive(Debug, thiserror::Error)]
pub enum WebhookConfigError {
    // The URL itself is never echoed, it carries a credential
    #[error("The webhook URL is not a valid URL")]
    InvalidUrl(#[source] ParseError),
    #[error("Failed to build the webhook HTTP client")]
    Client(#[source] reqwest::Error),
}

/// Available runtime environments
#[derive(Debug, PartialEq, Eq)]
pub enum Env {
    Development,
    Production,
}

impl Env {
    /// Represent environment as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "dev",
            Self::Production => "prd",
        }
    }
}

impl TryFrom<String> for Env {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "dev" => Ok(Self::Development),
            "prd" => Ok(Self::Production),
            other => Err(format!(
                "`{other}` is not a supported environment. Use either `dev` or `prd`"
            )),
        }
    }
}
