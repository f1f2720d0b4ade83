//! Error types for forwarding sessions.

use std::fmt;
use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// The suspendable step an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Accept,
    Connect,
    Read,
    Write,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Accept => write!(f, "accept"),
            Operation::Connect => write!(f, "connect"),
            Operation::Read => write!(f, "read"),
            Operation::Write => write!(f, "write"),
        }
    }
}

/// Outcome of a forwarding step that did not succeed.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// The shutdown signal fired before the operation completed.
    #[error("{0} cancelled")]
    Cancelled(Operation),

    /// The per-operation deadline elapsed first.
    #[error("{0} timed out")]
    TimedOut(Operation),

    /// Dialing the destination failed.
    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// Transport error on an established connection.
    #[error("{op} failed: {source}")]
    Io {
        op: Operation,
        #[source]
        source: io::Error,
    },
}

impl ForwardError {
    /// Cancellation and timeouts end a session normally.
    pub fn is_routine(&self) -> bool {
        matches!(self, ForwardError::Cancelled(_) | ForwardError::TimedOut(_))
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ForwardError::Cancelled(_) => "cancelled",
            ForwardError::TimedOut(_) => "timed_out",
            ForwardError::Connect { .. } => "connect_failed",
            ForwardError::Io { .. } => "io_failed",
        }
    }
}

pub type ForwardResult<T> = Result<T, ForwardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routine_outcomes() {
        assert!(ForwardError::Cancelled(Operation::Read).is_routine());
        assert!(ForwardError::TimedOut(Operation::Connect).is_routine());

        let reset = ForwardError::Io {
            op: Operation::Write,
            source: io::Error::from(io::ErrorKind::ConnectionReset),
        };
        assert!(!reset.is_routine());
        assert_eq!(reset.kind(), "io_failed");
    }

    #[test]
    fn messages_name_the_operation() {
        assert_eq!(ForwardError::TimedOut(Operation::Connect).to_string(), "connect timed out");
        assert_eq!(ForwardError::Cancelled(Operation::Read).to_string(), "read cancelled");

        let accept = ForwardError::Io {
            op: Operation::Accept,
            source: io::Error::from_raw_os_error(24),
        };
        assert!(accept.to_string().starts_with("accept failed: "));
        assert!(!accept.is_routine());
    }
}
