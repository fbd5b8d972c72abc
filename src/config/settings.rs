//! Application settings loaded from `config.toml`.
//!
//! Every field has a default so a missing file is not an error. Secrets never
//! live in the file: `JWT_SECRET` and `DATABASE_URL` come from the environment.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Top-level settings, mirroring the sections of `config.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP listener settings
    pub server: ServerSettings,
    /// Token issuing settings
    pub auth: AuthSettings,
}

/// `[server]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Interface to bind
    pub host: String,
    /// Port to bind, overridden by `PORT`
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl ServerSettings {
    /// `host:port` string for the listener.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `[auth]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Lifetime of issued tokens, in hours
    pub token_ttl_hours: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            token_ttl_hours: 24 * 7,
        }
    }
}

/// Parses settings from a TOML string.
///
/// # Errors
/// Returns `Error::Config` if the TOML is malformed or a field has the wrong type.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    debug!("Loading settings from {}", path.display());
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;
    parse_settings(&contents)
}

/// Loads settings from `SUBTRACK_CONFIG` (default `./config.toml`), falling back to
/// defaults when the file does not exist, then applies the `PORT` override.
///
/// # Errors
/// Returns an error if the file exists but is invalid, or `PORT` is not a number.
pub fn load_default_settings() -> Result<Settings> {
    let path = std::env::var("SUBTRACK_CONFIG").unwrap_or_else(|_| "config.toml".to_string());

    let mut settings = if Path::new(&path).exists() {
        load_settings(&path)?
    } else {
        info!("No config file at {path}, using defaults");
        Settings::default()
    };

    if let Ok(port) = std::env::var("PORT") {
        settings.server.port = port.parse().map_err(|e| Error::Config {
            message: format!("Invalid PORT '{port}': {e}"),
        })?;
    }

    Ok(settings)
}
