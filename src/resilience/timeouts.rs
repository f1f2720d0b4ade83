//! Timeout and cancellation enforcement.
//!
//! # Responsibilities
//! - Race a single I/O future against a deadline and the shutdown signal
//! - Report timeout and cancellation distinctly from I/O failure
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Cancellation is polled first so a raised signal always wins a tie
//! - The losing future is dropped; Tokio socket futures are cancel-safe

use std::future::Future;
use std::io;
use std::time::Duration;

use crate::lifecycle::ShutdownSignal;
use crate::relay::{ForwardError, Operation};

/// Drive `io` to completion unless `signal` fires or `deadline` elapses.
///
/// The outer `Result` carries cancellation and timeout; the inner one is the
/// untouched outcome of `io`, left for the caller to classify.
pub async fn guard<F, T>(
    op: Operation,
    io: F,
    deadline: Option<Duration>,
    signal: &mut ShutdownSignal,
) -> Result<io::Result<T>, ForwardError>
where
    F: Future<Output = io::Result<T>>,
{
    let timed = async {
        match deadline {
            Some(limit) => tokio::time::timeout(limit, io)
                .await
                .map_err(|_| ForwardError::TimedOut(op)),
            None => Ok(io.await),
        }
    };

    tokio::select! {
        biased;
        _ = signal.triggered() => Err(ForwardError::Cancelled(op)),
        res = timed => res,
    }
}
