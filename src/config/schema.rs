//! Configuration schema definitions.
//!
//! [`SeikanConfig`] is the layered, file-shaped form: every field has a
//! default and the endpoints may still be missing. [`ForwardingConfig`] is
//! the validated, immutable form the forwarder runs with.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Root configuration for the forwarder.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SeikanConfig {
    /// Listener configuration (bind address, limits).
    pub listener: ListenerConfig,

    /// Destination every client is relayed to.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:9000").
    pub bind_address: Option<SocketAddr>,

    /// Maximum concurrently relayed sessions (backpressure).
    pub max_connections: usize,

    /// Kernel accept queue length.
    pub backlog: u32,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: None,
            max_connections: 10,
            backlog: 4,
        }
    }
}

/// Upstream (destination) configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Destination address (e.g., "127.0.0.1:9100").
    pub address: Option<SocketAddr>,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Idle timeout in milliseconds for connect, read and write.
    /// `None` or `0` disables it.
    pub idle_ms: Option<u64>,
}

impl TimeoutConfig {
    pub fn idle(&self) -> Option<Duration> {
        self.idle_ms.filter(|ms| *ms > 0).map(Duration::from_millis)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log line format.
    pub log_format: LogFormat,

    /// Serve Prometheus metrics.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Validated forwarding parameters, immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardingConfig {
    pub listen: SocketAddr,
    pub destination: SocketAddr,
    /// `None` means no timeout.
    pub idle_timeout: Option<Duration>,
    pub max_connections: usize,
    pub backlog: u32,
}

impl ForwardingConfig {
    /// Parameters with the defaults for everything but the endpoints.
    pub fn new(listen: SocketAddr, destination: SocketAddr) -> Self {
        let listener = ListenerConfig::default();
        Self {
            listen,
            destination,
            idle_timeout: None,
            max_connections: listener.max_connections,
            backlog: listener.backlog,
        }
    }

    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn with_max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_backlog(mut self, backlog: u32) -> Self {
        self.backlog = backlog;
        self
    }
}
