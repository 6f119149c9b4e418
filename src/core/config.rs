//! Server Configuration
//!
//! Configuration is read from environment variables:
//! - SERVER_NAME: Name of the server (default: "mcp-http-server")
//! - SERVER_VERSION: Version string (default: the crate version)
//! - MCP_TRANSPORT_MODE: "http", "stdio", or "both" (default: "http")
//! - HOST: Bind address for HTTP mode (default: "0.0.0.0")
//! - PORT: Port number for HTTP mode (default: 3000)
//! - WORKER_THREADS: HTTP worker count (default: CPU count, capped at 16)
//! - LOG_FORMAT: "text" or "json" (default: "text")

use std::str::FromStr;

pub const DEFAULT_SERVER_NAME: &str = "mcp-http-server";
pub const DEFAULT_SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
const MAX_DEFAULT_WORKERS: usize = 16;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid transport mode '{0}': must be 'stdio', 'http', or 'both'")]
    InvalidTransport(String),

    #[error("invalid log format '{0}': must be 'text' or 'json'")]
    InvalidLogFormat(String),
}

/// Non-fatal problem found while loading configuration. Reported after
/// logging is set up, since configuration is read before that.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigWarning {
    #[error("invalid PORT '{0}', using {1}")]
    InvalidPort(String, u16),

    #[error("invalid WORKER_THREADS '{0}', using {1}")]
    InvalidWorkers(String, usize),
}

/// Which transports the process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    Http,
    Stdio,
    Both,
}

impl FromStr for TransportMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(TransportMode::Http),
            "stdio" => Ok(TransportMode::Stdio),
            "both" => Ok(TransportMode::Both),
            _ => Err(ConfigError::InvalidTransport(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::InvalidLogFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Server name reported by `initialize` and `GET /`
    pub server_name: String,
    /// Server version reported by `initialize`
    pub server_version: String,
    pub transport: TransportMode,
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_name: DEFAULT_SERVER_NAME.to_string(),
            server_version: DEFAULT_SERVER_VERSION.to_string(),
            transport: TransportMode::Http,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            workers: default_workers(),
            log_format: LogFormat::Text,
        }
    }
}

fn default_workers() -> usize {
    num_cpus::get().clamp(1, MAX_DEFAULT_WORKERS)
}

impl ServerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<(Self, Vec<ConfigWarning>), ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Unparsable numeric values fall back to their defaults and are returned
    /// as warnings; an unknown transport mode or log format is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<(Self, Vec<ConfigWarning>), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let mut warnings = Vec::new();

        let transport = match lookup("MCP_TRANSPORT_MODE") {
            Some(value) => value.parse()?,
            None => defaults.transport,
        };
        let log_format = match lookup("LOG_FORMAT") {
            Some(value) => value.parse()?,
            None => defaults.log_format,
        };

        let port = match lookup("PORT") {
            Some(value) => match value.trim().parse::<u16>() {
                Ok(port) => port,
                Err(_) => {
                    warnings.push(ConfigWarning::InvalidPort(value, DEFAULT_PORT));
                    DEFAULT_PORT
                }
            },
            None => defaults.port,
        };

        let workers = match lookup("WORKER_THREADS") {
            Some(value) => match value.trim().parse::<usize>() {
                Ok(workers) if workers > 0 => workers,
                _ => {
                    warnings.push(ConfigWarning::InvalidWorkers(value, defaults.workers));
                    defaults.workers
                }
            },
            None => defaults.workers,
        };

        let config = Self {
            server_name: lookup("SERVER_NAME").unwrap_or(defaults.server_name),
            server_version: lookup("SERVER_VERSION").unwrap_or(defaults.server_version),
            transport,
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            workers,
            log_format,
        };
        Ok((config, warnings))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
