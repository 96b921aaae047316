//! Server configuration.
//!
//! Layered sources: a TOML file (if present) overridden by environment
//! variables, e.g. `AGENDA__SERVER__PORT=9090` or
//! `AGENDA__AUTH__SIGNING_SECRET=...`.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use agenda_auth::AuthConfig;

/// Root application configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Listener settings.
    pub server: ServerConfig,

    /// Logging settings.
    pub logging: LoggingConfig,

    /// Authentication engine settings.
    pub auth: AuthConfig,
}

/// Listener settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,

    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive ("info", "agenda_auth=debug", ...).
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// The socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns an error if host/port do not form a valid socket address.
    pub fn addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }

    /// Validates the whole configuration.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        self.addr().map_err(|e| format!("invalid listen address: {e}"))?;
        self.auth.validate().map_err(|e| e.to_string())?;
        Ok(())
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    /// Loads configuration from an optional TOML file plus `AGENDA__*`
    /// environment overrides, then validates it.
    ///
    /// # Errors
    ///
    /// Returns a description of the load, parse, or validation failure.
    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();

        let pathbuf = PathBuf::from(path.unwrap_or("agenda.toml"));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        }

        builder = builder.add_source(
            Environment::with_prefix("AGENDA")
                .try_parsing(true)
                .separator("__"),
        );

        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}
