//! Configuration module for the Folio backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Admin password for the editor gate (gate is open when unset)
    pub admin_password: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Directory that uploaded cover images are written to
    pub media_path: PathBuf,
    /// Public URL prefix the media directory is served under
    pub media_url: String,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Lifetime of an admin session token
    pub session_ttl: Duration,
    /// Period of the background draft autosave
    pub autosave_interval: Duration,
}

/// A configuration variable held a value that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid value {:?} for {}", self.value, self.key)
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let admin_password = lookup("FOLIO_ADMIN_PASSWORD").filter(|p| !p.is_empty());

        let db_path = get("FOLIO_DB_PATH", "./data/folio.sqlite").into();
        let media_path = get("FOLIO_MEDIA_PATH", "./data/media").into();
        let media_url = get("FOLIO_MEDIA_URL", "/media")
            .trim_end_matches('/')
            .to_string();

        let bind_raw = get("FOLIO_BIND_ADDR", "127.0.0.1:8080");
        let bind_addr: SocketAddr = bind_raw.parse().map_err(|_| ConfigError {
            key: "FOLIO_BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        let log_level = get("FOLIO_LOG_LEVEL", "info");

        let session_ttl = Duration::from_secs(parse_number(
            "FOLIO_SESSION_TTL_SECS",
            &get("FOLIO_SESSION_TTL_SECS", "43200"),
        )?);
        let autosave_interval = Duration::from_millis(parse_number(
            "FOLIO_AUTOSAVE_INTERVAL_MS",
            &get("FOLIO_AUTOSAVE_INTERVAL_MS", "1500"),
        )?);

        Ok(Self {
            admin_password,
            db_path,
            media_path,
            media_url,
            bind_addr,
            log_level,
            session_ttl,
            autosave_interval,
        })
    }
}

fn parse_number(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError {
            key,
            value: raw.to_string(),
        }),
    }
}
