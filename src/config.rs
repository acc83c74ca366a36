use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_LEAGUE_DELAY_SECS: u64 = 20;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("DATABASE_URL environment variable is not set")]
    MissingDatabaseUrl,

    #[error("unsupported DATABASE_URL '{0}': only sqlite paths are supported")]
    UnsupportedDatabaseUrl(String),

    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

/// Where the store lives, resolved from `DATABASE_URL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    Memory,
    File(PathBuf),
}

/// Process configuration, resolved once at startup and passed down by value.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseLocation,
    pub league_delay: Duration,
    pub request_timeout: Duration,
    pub host: String,
    pub port: u16,
    /// Frontend origin allowed to call the API from a browser.
    pub cors_origin: String,
}

impl AppConfig {
    /// Loads `.env.local` and `.env` if present, then reads the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingDatabaseUrl)?;
        let database = parse_database_url(&raw_url)?;

        let league_delay = secs_var(&lookup, "FBREF_LEAGUE_DELAY_SECS", DEFAULT_LEAGUE_DELAY_SECS)?;
        let request_timeout = secs_var(
            &lookup,
            "FBREF_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;
        let host = lookup("HOST")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                key: "PORT",
                value: raw.clone(),
            })?,
            None => DEFAULT_PORT,
        };

        let cors_origin = lookup("FBREF_CORS_ORIGIN")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());

        Ok(Self {
            database,
            league_delay,
            request_timeout,
            host,
            port,
            cors_origin,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn parse_database_url(raw: &str) -> Result<DatabaseLocation, ConfigError> {
    let trimmed = raw.trim();
    let path = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    if path.contains("://") {
        return Err(ConfigError::UnsupportedDatabaseUrl(trimmed.to_string()));
    }
    if path.is_empty() {
        return Err(ConfigError::MissingDatabaseUrl);
    }
    if path == ":memory:" {
        return Ok(DatabaseLocation::Memory);
    }
    Ok(DatabaseLocation::File(PathBuf::from(path)))
}

fn secs_var(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: u64,
) -> Result<Duration, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(Duration::from_secs(default));
    };
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::InvalidValue { key, value: raw })
}
