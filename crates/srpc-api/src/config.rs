//! Server configuration.
//!
//! Defaults suit local development. Override via environment variables or
//! explicit construction.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Default upper bound on request bodies (2 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Configuration for the HTTP surface around a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Name reported in the documentation tree.
    pub app_name: String,
    pub host: IpAddr,
    pub port: u16,
    /// Path of the documentation endpoint. `None` disables it.
    pub docs_path: Option<String>,
    /// Maximum request body size in bytes.
    pub body_limit: usize,
    /// Whether the binary mounts `/metrics`.
    pub metrics_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            app_name: "srpc".to_string(),
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            docs_path: Some("/docs.json".to_string()),
            body_limit: DEFAULT_BODY_LIMIT,
            metrics_enabled: true,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `SRPC_APP_NAME` (default: `srpc`)
    /// - `SRPC_HOST` (default: `0.0.0.0`)
    /// - `SRPC_PORT` (default: 8080)
    /// - `SRPC_DOCS_PATH` (default: `/docs.json`; empty disables the route)
    /// - `SRPC_BODY_LIMIT` (default: 2097152)
    /// - `SRPC_METRICS_ENABLED` (default: true)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`ServerConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let docs_path = match lookup("SRPC_DOCS_PATH") {
            None => defaults.docs_path,
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => {
                let raw = raw.trim().to_string();
                if !raw.starts_with('/') {
                    return Err(ConfigError::InvalidDocsPath(raw));
                }
                Some(raw)
            }
        };

        Ok(Self {
            app_name: lookup("SRPC_APP_NAME")
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(defaults.app_name),
            host: parse_var(&lookup, "SRPC_HOST")?.unwrap_or(defaults.host),
            port: parse_var(&lookup, "SRPC_PORT")?.unwrap_or(defaults.port),
            docs_path,
            body_limit: parse_var(&lookup, "SRPC_BODY_LIMIT")?.unwrap_or(defaults.body_limit),
            metrics_enabled: parse_var(&lookup, "SRPC_METRICS_ENABLED")?
                .unwrap_or(defaults.metrics_enabled),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, var: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(var)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidValue(var.to_string(), e.to_string()))
        })
        .transpose()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
    #[error("documentation path must start with '/': {0}")]
    InvalidDocsPath(String),
}
