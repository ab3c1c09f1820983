//! Configuration resolution for appstats.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Config file (JSON, passed explicitly)
//! 3. Environment variables
//! 4. CLI arguments (highest priority, applied by the binary)

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use url::Url;

use crate::error::{Error, Result};

/// Complete appstats configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 12345)),
            log_level: "info".to_string(),
        }
    }
}

/// Postgres connection settings.
///
/// When `url` is set it is used verbatim and the individual parts are ignored.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
    /// Upper bound on concurrently open connections.
    pub max_connections: u32,
    pub url: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            dbname: "analytics".to_string(),
            max_connections: 100,
            url: None,
        }
    }
}

// Hand-written so the password never reaches the logs.
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("dbname", &self.dbname)
            .field("max_connections", &self.max_connections)
            .field("url", &self.url.as_deref().map(redact_url))
            .finish()
    }
}

impl DatabaseConfig {
    /// Connection URL for the pool. TLS negotiation is always disabled.
    ///
    /// Credentials and the database name are percent-encoded.
    pub fn connection_url(&self) -> Result<String> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }
        let invalid = |what: &str| Error::Config(format!("Invalid database {what}"));

        let mut url = Url::parse("postgres://localhost/")
            .map_err(|e| Error::Config(format!("Invalid database URL: {e}")))?;
        url.set_host(Some(&self.host))
            .map_err(|e| Error::Config(format!("Invalid database host {:?}: {e}", self.host)))?;
        url.set_port(Some(self.port)).map_err(|()| invalid("port"))?;
        url.set_username(&self.user).map_err(|()| invalid("user"))?;
        if !self.password.is_empty() {
            url.set_password(Some(&self.password))
                .map_err(|()| invalid("password"))?;
        }
        url.path_segments_mut()
            .map_err(|()| invalid("name"))?
            .pop_if_empty()
            .push(&self.dbname);
        url.set_query(Some("sslmode=disable"));
        Ok(url.into())
    }

    /// Connection URL with the password masked, for logging.
    pub fn redacted_url(&self) -> String {
        self.connection_url()
            .map_or_else(|e| format!("<{e}>"), |url| redact_url(&url))
    }
}

/// Load configuration with hierarchical resolution.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => load_config_file(path)?,
        None => Config::default(),
    };

    apply_env_overrides(&mut config)?;

    Ok(config)
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn apply_env_overrides(config: &mut Config) -> Result<()> {
    apply_overrides(config, |key| std::env::var(key).ok())
}

/// Apply `APPSTATS_*` overrides read through `lookup`.
fn apply_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
    if let Some(val) = lookup("APPSTATS_ADDR") {
        config.server.addr = parse_value("APPSTATS_ADDR", &val)?;
    }
    if let Some(val) = lookup("APPSTATS_LOG_LEVEL") {
        config.server.log_level = val;
    }
    if let Some(val) = lookup("APPSTATS_DB_HOST") {
        config.database.host = val;
    }
    if let Some(val) = lookup("APPSTATS_DB_PORT") {
        config.database.port = parse_value("APPSTATS_DB_PORT", &val)?;
    }
    if let Some(val) = lookup("APPSTATS_DB_USER") {
        config.database.user = val;
    }
    if let Some(val) = lookup("APPSTATS_DB_PASSWORD") {
        config.database.password = val;
    }
    if let Some(val) = lookup("APPSTATS_DB_NAME") {
        config.database.dbname = val;
    }
    if let Some(val) = lookup("APPSTATS_DB_MAX_CONNECTIONS") {
        config.database.max_connections = parse_value("APPSTATS_DB_MAX_CONNECTIONS", &val)?;
    }
    if let Some(val) = lookup("APPSTATS_DATABASE_URL") {
        config.database.url = Some(val);
    }
    Ok(())
}

fn parse_value<T: std::str::FromStr>(key: &str, val: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    val.parse()
        .map_err(|e| Error::Config(format!("Invalid value for {key} ({val:?}): {e}")))
}

/// Mask the password of `raw`. Userinfo ends at the last `@`, as the
/// database drivers parse it.
fn redact_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return "<unparseable database URL>".to_string();
    };
    if url.password().is_none() {
        return raw.to_string();
    }
    if url.set_password(Some("***")).is_err() {
        return "<unparseable database URL>".to_string();
    }
    url.into()
}
