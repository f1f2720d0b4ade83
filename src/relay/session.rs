//! Forwarding session.
//!
//! # Responsibilities
//! - Dial the destination for one accepted client (cancellable, time-boxed)
//! - Copy bytes in both directions until each side finishes
//! - Half-close the write side a direction fed once its source reaches EOF
//! - Close both sockets and report the outcome; never propagate failure

use std::fmt;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::Instrument;

use crate::config::ForwardingConfig;
use crate::lifecycle::ShutdownSignal;
use crate::net::{ConnectionId, SessionGuard, TimedChannel};
use crate::observability::metrics;
use crate::relay::{ForwardError, ForwardResult, Operation};
use crate::resilience::guard;

/// Bytes moved per read/write round trip.
pub const TRANSFER_CHUNK_SIZE: usize = 4096;

/// Which way bytes flow through a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Client to destination.
    Upstream,
    /// Destination to client.
    Downstream,
}

impl Direction {
    fn label(self) -> &'static str {
        match self {
            Direction::Upstream => "upstream",
            Direction::Downstream => "downstream",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Byte totals of a session that ran to completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub bytes_up: u64,
    pub bytes_down: u64,
}

/// What happened to a session. Already logged by the time it is returned.
#[derive(Debug)]
pub struct SessionReport {
    pub id: ConnectionId,
    pub result: ForwardResult<RelayStats>,
}

/// One client relayed to the fixed destination.
#[derive(Debug)]
pub struct Session {
    tracking: SessionGuard,
    client: TcpStream,
    peer: SocketAddr,
    destination: SocketAddr,
    idle_timeout: Option<Duration>,
    signal: ShutdownSignal,
}

impl Session {
    pub fn new(
        tracking: SessionGuard,
        client: TcpStream,
        peer: SocketAddr,
        config: &ForwardingConfig,
        signal: ShutdownSignal,
    ) -> Self {
        Self {
            tracking,
            client,
            peer,
            destination: config.destination,
            idle_timeout: config.idle_timeout,
            signal,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.tracking.id()
    }

    /// Run the session to completion. Both sockets are closed on return.
    pub async fn run(self) -> SessionReport {
        let id = self.id();
        let peer = self.peer;
        let destination = self.destination;
        let span = tracing::info_span!("session", connection_id = %id, %peer);

        async move {
            let started = Instant::now();
            metrics::session_opened();

            let result = self.relay().await;
            match &result {
                Ok(stats) => tracing::info!(
                    bytes_up = stats.bytes_up,
                    bytes_down = stats.bytes_down,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Closed: {} -> {}",
                    peer,
                    destination
                ),
                Err(e) if e.is_routine() => tracing::warn!(error = %e, "Session ended early"),
                Err(e) => tracing::error!(error = %e, "Forward failed"),
            }

            let outcome = match &result {
                Ok(_) => "completed",
                Err(e) => e.kind(),
            };
            metrics::session_closed(outcome, started);

            SessionReport { id, result }
        }
        .instrument(span)
        .await
    }

    async fn relay(self) -> ForwardResult<RelayStats> {
        let Session {
            mut tracking,
            client,
            destination,
            idle_timeout,
            mut signal,
            ..
        } = self;

        let upstream = guard(
            Operation::Connect,
            TcpStream::connect(destination),
            idle_timeout,
            &mut signal,
        )
        .await?
        .map_err(|source| ForwardError::Connect {
            addr: destination,
            source,
        })?;

        client.set_nodelay(true).ok();
        upstream.set_nodelay(true).ok();
        tracking.relaying();
        tracing::info!(
            state = %tracking.state(),
            local = ?upstream.local_addr().ok(),
            %destination,
            "Connected to destination"
        );

        let (client_rx, client_tx) = client.into_split();
        let (upstream_rx, upstream_tx) = upstream.into_split();

        let mut client_rx = TimedChannel::new(client_rx, idle_timeout, signal.clone());
        let mut client_tx = TimedChannel::new(client_tx, idle_timeout, signal.clone());
        let mut upstream_rx = TimedChannel::new(upstream_rx, idle_timeout, signal.clone());
        let mut upstream_tx = TimedChannel::new(upstream_tx, idle_timeout, signal);

        // Dropping an owned write half sends FIN, so every half stays alive
        // until both directions are done.
        let (up, down) = tokio::join!(
            pipe(&mut client_rx, &mut upstream_tx, Direction::Upstream),
            pipe(&mut upstream_rx, &mut client_tx, Direction::Downstream),
        );

        match (up, down) {
            (Ok(bytes_up), Ok(bytes_down)) => Ok(RelayStats {
                bytes_up,
                bytes_down,
            }),
            (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(e),
            (Err(a), Err(b)) => Err(if a.is_routine() { b } else { a }),
        }
    }
}

/// Copy `from` into `to` until end-of-stream, then half-close `to`.
///
/// A failed direction leaves `to` open so the opposite direction keeps
/// flowing. Returns the number of bytes delivered.
pub async fn pipe<R, W>(
    from: &mut TimedChannel<R>,
    to: &mut TimedChannel<W>,
    direction: Direction,
) -> ForwardResult<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; TRANSFER_CHUNK_SIZE];
    let mut copied = 0u64;

    let result = copy(from, to, &mut buf, direction, &mut copied).await;
    match &result {
        Ok(()) => {
            if let Err(e) = to.shutdown_send().await {
                tracing::debug!(%direction, error = %e, "Half-close failed");
            }
            tracing::debug!(%direction, bytes = copied, "Direction finished");
        }
        Err(e) => tracing::debug!(%direction, bytes = copied, error = %e, "Direction failed"),
    }

    result.map(|()| copied)
}

async fn copy<R, W>(
    from: &mut TimedChannel<R>,
    to: &mut TimedChannel<W>,
    buf: &mut [u8],
    direction: Direction,
    copied: &mut u64,
) -> ForwardResult<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        let n = from.read(buf).await?;
        if n == 0 {
            return Ok(());
        }
        to.write(&buf[..n]).await?;
        *copied += n as u64;
        metrics::record_bytes(direction.label(), n);
    }
}
