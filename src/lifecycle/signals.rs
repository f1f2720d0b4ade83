//! OS signal handling.
//!
//! # Responsibilities
//! - Listen for SIGINT (Ctrl+C) and, on Unix, SIGTERM
//! - Translate the first one into a [`Shutdown`] trigger
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - A second interrupt while draining forces exit

use tokio::task::JoinHandle;

use super::Shutdown;

/// Exit status used when the operator interrupts a drain.
pub const FORCED_EXIT_CODE: i32 = 130;

/// Spawn a task that raises `shutdown` on the first interrupt and exits the
/// process on the second.
pub fn spawn_signal_handler(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = interrupted().await {
            tracing::error!(error = %e, "Failed to install signal handler");
            return;
        }
        tracing::info!("Interrupt received, draining active sessions");
        shutdown.trigger();

        if interrupted().await.is_ok() {
            tracing::warn!("Second interrupt received, exiting without draining");
            std::process::exit(FORCED_EXIT_CODE);
        }
    })
}

#[cfg(unix)]
async fn interrupted() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn interrupted() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
