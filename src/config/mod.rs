use std::path::Path;

use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;

use crate::error::{RegistryError, Result};

const DEFAULT_PORT: u16 = 5432;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

/// Connection parameters for the client database
///
/// Read from `DB_*` environment variables (optionally seeded from a `.env`
/// file) or built from literals with [`Config::new`].
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Database name
    pub name: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Full connection URL; takes precedence over the individual fields
    pub url: Option<String>,
}

impl Config {
    /// Build configuration from literal values
    pub fn new(host: &str, database: &str, user: &str, password: &str) -> Self {
        Self {
            host: Some(host.to_owned()),
            port: DEFAULT_PORT,
            name: Some(database.to_owned()),
            user: Some(user.to_owned()),
            password: Some(password.to_owned()),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            url: None,
        }
    }

    /// Build configuration from a connection URL
    pub fn from_url(url: &str) -> Self {
        Self {
            host: None,
            port: DEFAULT_PORT,
            name: None,
            user: None,
            password: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            url: Some(url.to_owned()),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Load configuration from environment variables
    ///
    /// `DB_URL` wins over the individual `DB_*` fields; `DATABASE_URL` is
    /// used when `DB_URL` is unset.
    pub fn load() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Deserialize configuration from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Vec<(String, String)> = vars.into_iter().collect();
        let database_url = vars
            .iter()
            .find(|(key, _)| key == "DATABASE_URL")
            .map(|(_, value)| value.clone());

        let mut config = envy::prefixed("DB_")
            .from_iter::<_, Config>(vars)
            .map_err(|err| RegistryError::Config(err.to_string()))?;

        if config.url.is_none() {
            config.url = database_url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that every required parameter is present and non-empty
    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(RegistryError::Config(
                "max_connections must be at least 1".to_owned(),
            ));
        }

        if let Some(url) = &self.url {
            if url.trim().is_empty() {
                return Err(RegistryError::Config("database url is empty".to_owned()));
            }
            return Ok(());
        }

        for (field, value) in [
            ("DB_HOST", &self.host),
            ("DB_NAME", &self.name),
            ("DB_USER", &self.user),
            ("DB_PASSWORD", &self.password),
        ] {
            match value {
                Some(v) if !v.trim().is_empty() => {}
                _ => {
                    return Err(RegistryError::Config(format!(
                        "{field} must be set and non-empty"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Translate into driver connect options
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        self.validate()?;

        if let Some(url) = &self.url {
            return url
                .parse::<PgConnectOptions>()
                .map_err(|err| RegistryError::Config(format!("invalid database url: {err}")));
        }

        let mut options = PgConnectOptions::new().port(self.port);
        if let Some(host) = &self.host {
            options = options.host(host);
        }
        if let Some(name) = &self.name {
            options = options.database(name);
        }
        if let Some(user) = &self.user {
            options = options.username(user);
        }
        if let Some(password) = &self.password {
            options = options.password(password);
        }

        Ok(options)
    }
}

/// Load `.env` (or the given file) and then the configuration
pub fn init(env_file: Option<&Path>) -> Result<Config> {
    match env_file {
        Some(path) => {
            dotenvy::from_path(path).map_err(|err| {
                RegistryError::Config(format!("failed to read {}: {err}", path.display()))
            })?;
        }
        None => {
            // Missing .env is fine
            dotenvy::dotenv().ok();
        }
    }

    Config::load()
}
