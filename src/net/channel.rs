//! Timed, cancellable byte channel.
//!
//! Wraps one side of a stream (a whole socket or one of its owned halves) so
//! that every read and write resolves to exactly one of: success, timeout,
//! cancellation, or an I/O error.

use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::lifecycle::ShutdownSignal;
use crate::relay::{ForwardError, ForwardResult, Operation};
use crate::resilience::guard;

/// A stream endpoint whose operations honor a deadline and the shutdown signal.
#[derive(Debug)]
pub struct TimedChannel<S> {
    inner: S,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
    signal: ShutdownSignal,
}

impl<S> TimedChannel<S> {
    /// Wrap `inner`, using `timeout` as both the read and write deadline.
    pub fn new(inner: S, timeout: Option<Duration>, signal: ShutdownSignal) -> Self {
        Self {
            inner,
            read_timeout: timeout,
            write_timeout: timeout,
            signal,
        }
    }
}

impl<S: AsyncRead + Unpin> TimedChannel<S> {
    /// Read into `buf`. `Ok(0)` means the peer closed its send side.
    pub async fn read(&mut self, buf: &mut [u8]) -> ForwardResult<usize> {
        guard(
            Operation::Read,
            self.inner.read(buf),
            self.read_timeout,
            &mut self.signal,
        )
        .await?
        .map_err(|source| ForwardError::Io {
            op: Operation::Read,
            source,
        })
    }
}

impl<S: AsyncWrite + Unpin> TimedChannel<S> {
    /// Write all of `buf`.
    ///
    /// On timeout or cancellation an unknown prefix of `buf` may already be
    /// on the wire; the caller is expected to drop the connection.
    pub async fn write(&mut self, buf: &[u8]) -> ForwardResult<()> {
        guard(
            Operation::Write,
            self.inner.write_all(buf),
            self.write_timeout,
            &mut self.signal,
        )
        .await?
        .map_err(|source| ForwardError::Io {
            op: Operation::Write,
            source,
        })
    }

    /// Close the outbound direction only, signalling end-of-stream to the peer.
    pub async fn shutdown_send(&mut self) -> ForwardResult<()> {
        self.inner
            .shutdown()
            .await
            .map_err(|source| ForwardError::Io {
                op: Operation::Write,
                source,
            })
    }
}
