//! Seikan TCP port forwarder.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │                   SEIKAN                     │
//!                       │                                              │
//!     Client            │  ┌───────────┐    ┌──────────┐               │
//!     ──────────────────┼─▶│ forwarder │───▶│ session  │───────────────┼──▶ Destination
//!                       │  │ (accept,  │    │ (connect,│  TimedChannel │
//!     ◀─────────────────┼──│  cap)     │    │  2 pipes)│◀──────────────┼───
//!                       │  └───────────┘    └──────────┘               │
//!                       │        ▲                ▲                    │
//!                       │        └── ShutdownSignal (Ctrl+C) ──┘       │
//!                       └──────────────────────────────────────────────┘
//! ```
//!
//! Usage:
//! `seikan /accept <addr>:<port> /connect <addr>:<port> [/timeout <ms>] [/maxconn <num>]`

use std::net::SocketAddr;
use std::process::ExitCode;

use seikan::config::{validate_config, Cli, ConfigError, ForwardingConfig, SeikanConfig};
use seikan::lifecycle::{signals, Shutdown};
use seikan::observability::{logging, metrics};
use seikan::Forwarder;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    // Nothing touches the network until the configuration is valid.
    let (config, forwarding) = match resolve(&cli) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("{e}");
            if e.is_usage() {
                eprintln!("{}", Cli::usage());
            }
            return ExitCode::from(2);
        }
    };

    if let Err(e) = logging::init_logging(config.observability.log_format) {
        eprintln!("warning: logging not initialized: {e}");
    }

    tracing::info!("seikan v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        listen = %forwarding.listen,
        destination = %forwarding.destination,
        max_connections = forwarding.max_connections,
        backlog = forwarding.backlog,
        idle_timeout_ms = forwarding.idle_timeout.map(|t| t.as_millis() as u64),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let forwarder = Forwarder::new(forwarding);
    if let Err(e) = forwarder.run(shutdown.subscribe()).await {
        tracing::error!(error = %e, "Forwarder failed");
        eprintln!("ERROR: {e}");
        return ExitCode::FAILURE;
    }

    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}

fn resolve(cli: &Cli) -> Result<(SeikanConfig, ForwardingConfig), ConfigError> {
    let config = cli.load()?;
    let forwarding = validate_config(&config).map_err(ConfigError::Validation)?;
    Ok((config, forwarding))
}
