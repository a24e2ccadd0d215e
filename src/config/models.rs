// src/config/models.rs
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use url::Url;

/// Where the polled service lives and which ambient surfaces to run.
///
/// Polling itself (path, interval, element, messages) is fixed in
/// [`crate::poller`] and is deliberately not part of this file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Origin that `/health` is resolved against.
    pub base_url: Url,

    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Also serve the health endpoint from this process.
    #[serde(default)]
    pub server: Option<ServerConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
            path: default_metrics_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub address: String,
    pub port: u16,
}

impl ServerConfig {
    /// `address` must be a literal IPv4 or IPv6 address, not a host name.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .address
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddress(self.address.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, e.g. `status_poller=debug,hyper=info`.
    #[serde(default)]
    pub filter: Option<String>,
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("base_url must use http or https, got {0}")]
    UnsupportedScheme(String),

    #[error("base_url {0} cannot be used as a base for /health")]
    CannotBeABase(Url),

    #[error("metrics path must start with '/', got {0:?}")]
    InvalidMetricsPath(String),

    #[error("server address must be an IP address, got {0:?}")]
    InvalidBindAddress(String),

    #[error("metrics and server cannot share port {0}")]
    PortConflict(u16),
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.base_url.scheme() {
            "http" | "https" => {}
            other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
        }

        if self.base_url.cannot_be_a_base() {
            return Err(ConfigError::CannotBeABase(self.base_url.clone()));
        }

        if let Some(server) = &self.server {
            server.socket_addr()?;
        }

        if self.metrics.enabled {
            if !self.metrics.path.starts_with('/') {
                return Err(ConfigError::InvalidMetricsPath(self.metrics.path.clone()));
            }
            if let Some(server) = &self.server {
                if server.port == self.metrics.port {
                    return Err(ConfigError::PortConflict(server.port));
                }
            }
        }

        Ok(())
    }
}
