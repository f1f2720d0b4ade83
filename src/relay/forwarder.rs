//! Bounded accept loop.
//!
//! # Responsibilities
//! - Own the listening socket for the lifetime of the forward
//! - Keep at most one accept pending, and only while below the session cap
//! - Spawn one [`Session`] per accepted client
//! - Stop re-arming on shutdown, drain in-flight sessions, close the listener
//!
//! # Design Decisions
//! - The outstanding operations live in a `FuturesUnordered` owned by the
//!   loop; nothing else touches it, so it needs no locking
//! - Backpressure is applied at admission only; relaying sessions are never
//!   throttled
//! - Cancellation is checked before the accept, so once shutdown begins no
//!   socket is dequeued and none is orphaned

use futures_util::future::BoxFuture;
use futures_util::stream::FuturesUnordered;
use futures_util::{FutureExt, StreamExt};
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::task::JoinError;

use crate::config::ForwardingConfig;
use crate::lifecycle::ShutdownSignal;
use crate::net::{ConnectionId, ConnectionTracker, Listener, ListenerError};
use crate::observability::metrics;
use crate::relay::session::{Session, SessionReport};
use crate::relay::{ForwardError, ForwardResult, Operation};

/// Pause before re-arming after a failed accept (e.g. descriptor exhaustion).
const ACCEPT_ERROR_PAUSE: Duration = Duration::from_millis(100);

/// Accept loop states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwarderState {
    /// Accepting and/or relaying.
    Listening,
    /// Shutdown raised; waiting for active sessions.
    Draining,
    /// Listener closed.
    Stopped,
}

impl fmt::Display for ForwarderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForwarderState::Listening => write!(f, "listening"),
            ForwarderState::Draining => write!(f, "draining"),
            ForwarderState::Stopped => write!(f, "stopped"),
        }
    }
}

/// A resolved member of the outstanding-operation set.
enum Completion {
    /// The pending accept finished. `None` when shutdown won the race.
    Accept(Option<ForwardResult<(TcpStream, SocketAddr)>>),
    /// A session task finished.
    Session(ConnectionId, Result<SessionReport, JoinError>),
}

/// Relays every client of one listening address to one destination.
#[derive(Debug)]
pub struct Forwarder {
    config: Arc<ForwardingConfig>,
    tracker: ConnectionTracker,
}

impl Forwarder {
    pub fn new(config: ForwardingConfig) -> Self {
        Self {
            config: Arc::new(config),
            tracker: ConnectionTracker::new(),
        }
    }

    /// Live view of session states.
    pub fn tracker(&self) -> ConnectionTracker {
        self.tracker.clone()
    }

    /// Bind the configured listen address.
    pub fn bind(&self) -> Result<Listener, ListenerError> {
        Listener::bind(self.config.listen, self.config.backlog)
    }

    /// Bind and serve until shutdown has drained every session.
    pub async fn run(self, signal: ShutdownSignal) -> Result<(), ListenerError> {
        let listener = self.bind()?;
        self.serve(listener, signal).await;
        Ok(())
    }

    /// Serve on an already bound listener. Returns once shutdown was raised
    /// and every session has finished; the listener is closed on return.
    pub async fn serve(self, listener: Listener, signal: ShutdownSignal) {
        let listener = Arc::new(listener);
        let max_connections = self.config.max_connections;
        tracing::info!(
            address = %listener.local_addr(),
            destination = %self.config.destination,
            max_connections,
            idle_timeout_ms = self.config.idle_timeout.map(|t| t.as_millis() as u64),
            "Forwarder listening"
        );

        let mut outstanding: FuturesUnordered<BoxFuture<'static, Completion>> =
            FuturesUnordered::new();
        outstanding.push(accept_next(Arc::clone(&listener), signal.clone()).boxed());
        let mut accepting = true;
        let mut active = 0usize;
        let mut state = ForwarderState::Listening;

        while let Some(completion) = outstanding.next().await {
            match completion {
                Completion::Accept(accepted) => {
                    accepting = false;
                    match accepted {
                        Some(Ok((stream, peer))) => {
                            let (id, done) = self.start_session(stream, peer, signal.clone());
                            outstanding.push(done);
                            active += 1;
                            tracing::debug!(connection_id = %id, active, "Session started");
                        }
                        Some(Err(e)) => {
                            tracing::error!(error = %e, "Accept failed");
                        }
                        None => tracing::debug!("Accept cancelled"),
                    }
                }
                Completion::Session(id, finished) => {
                    active -= 1;
                    match finished {
                        Ok(report) => tracing::debug!(
                            connection_id = %report.id,
                            ok = report.result.is_ok(),
                            active,
                            "Session finished"
                        ),
                        Err(e) => {
                            tracing::error!(connection_id = %id, error = %e, "Session task failed")
                        }
                    }
                }
            }

            if signal.is_triggered() {
                if state == ForwarderState::Listening {
                    state = ForwarderState::Draining;
                    tracing::info!(active, %state, "Shutdown requested, no longer accepting");
                }
            } else if !accepting && active < max_connections {
                outstanding.push(accept_next(Arc::clone(&listener), signal.clone()).boxed());
                accepting = true;
            }
        }

        drop(listener);
        state = ForwarderState::Stopped;
        tracing::info!(%state, "Listener closed");
    }

    fn start_session(
        &self,
        stream: TcpStream,
        peer: SocketAddr,
        signal: ShutdownSignal,
    ) -> (ConnectionId, BoxFuture<'static, Completion>) {
        let tracking = self.tracker.track();
        let id = tracking.id();
        metrics::record_accepted();
        tracing::info!(
            connection_id = %id,
            "Accepted: {} -> {}",
            peer,
            stream
                .local_addr()
                .map(|a| a.to_string())
                .unwrap_or_else(|_| "?".into())
        );

        let session = Session::new(tracking, stream, peer, &self.config, signal);
        let handle = tokio::spawn(session.run());
        let done = async move { Completion::Session(id, handle.await) }.boxed();
        (id, done)
    }
}

async fn accept_next(listener: Arc<Listener>, mut signal: ShutdownSignal) -> Completion {
    tokio::select! {
        biased;
        _ = signal.triggered() => Completion::Accept(None),
        accepted = listener.accept() => {
            let accepted = accepted.map_err(|source| ForwardError::Io {
                op: Operation::Accept,
                source,
            });
            if accepted.is_err() {
                tokio::time::sleep(ACCEPT_ERROR_PAUSE).await;
            }
            Completion::Accept(Some(accepted))
        }
    }
}
