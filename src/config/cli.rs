//! Command-line surface.
//!
//! Accepts both `--accept` and the slash spelling `/accept` for every option;
//! slash options are rewritten before clap sees them.

use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::{LogFormat, SeikanConfig};

/// Option names that may be spelled with a leading `/`.
const SLASH_OPTIONS: &[&str] = &[
    "accept",
    "connect",
    "timeout",
    "maxconn",
    "backlog",
    "config",
    "metrics-address",
    "log-format",
    "help",
    "version",
];

#[derive(Parser, Debug, Default)]
#[command(name = "seikan", version, about = "TCP port forwarder", long_about = None)]
pub struct Cli {
    /// Address to accept clients on
    #[arg(long, value_name = "ADDR:PORT")]
    pub accept: Option<SocketAddr>,

    /// Destination every client is relayed to
    #[arg(long, value_name = "ADDR:PORT")]
    pub connect: Option<SocketAddr>,

    /// Idle timeout for connect, read and write, in milliseconds (0 or -1 disables)
    #[arg(long, value_name = "MS", allow_negative_numbers = true)]
    pub timeout: Option<i64>,

    /// Maximum concurrently relayed sessions [default: 10]
    #[arg(long, value_name = "NUM")]
    pub maxconn: Option<usize>,

    /// Listen backlog [default: 4]
    #[arg(long, value_name = "NUM")]
    pub backlog: Option<u32>,

    /// TOML configuration file; flags override its values
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Serve Prometheus metrics on this address
    #[arg(long, value_name = "ADDR:PORT")]
    pub metrics_address: Option<SocketAddr>,

    /// Log format: pretty or json
    #[arg(long, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,
}

impl Cli {
    /// Parse process-style arguments (program name first).
    pub fn parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_args(args))
    }

    /// One-line usage summary.
    pub fn usage() -> String {
        Self::command().render_usage().to_string()
    }

    /// Build the layered configuration: defaults, then the optional file,
    /// then flags.
    pub fn load(&self) -> Result<SeikanConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => SeikanConfig::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    /// Overlay the flags that were given onto `config`.
    pub fn apply(&self, config: &mut SeikanConfig) {
        if let Some(addr) = self.accept {
            config.listener.bind_address = Some(addr);
        }
        if let Some(addr) = self.connect {
            config.upstream.address = Some(addr);
        }
        if let Some(ms) = self.timeout {
            // Negative values mean "infinite", the same as 0.
            config.timeouts.idle_ms = Some(u64::try_from(ms).unwrap_or(0));
        }
        if let Some(max) = self.maxconn {
            config.listener.max_connections = max;
        }
        if let Some(backlog) = self.backlog {
            config.listener.backlog = backlog;
        }
        if let Some(addr) = self.metrics_address {
            config.observability.metrics_enabled = true;
            config.observability.metrics_address = addr.to_string();
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }
    }
}

/// Rewrite `/name` into `--name` for known options. The program name and
/// option values are left untouched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 {
                return arg;
            }
            match arg.to_str().and_then(|s| s.strip_prefix('/')) {
                Some(name) if SLASH_OPTIONS.contains(&name) => OsString::from(format!("--{name}")),
                _ => arg,
            }
        })
        .collect()
}
