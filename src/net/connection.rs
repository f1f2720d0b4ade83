//! Session state machine and lifecycle tracking.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing
//! - Track how many sessions are connecting or relaying
//! - Remember the peak number of simultaneously relaying sessions

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for an accepted client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Session lifecycle: `Connecting → Relaying → Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Dialing the destination.
    Connecting,
    /// Both copy directions are running.
    Relaying,
    /// Both sockets released.
    Closed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Connecting => write!(f, "connecting"),
            SessionState::Relaying => write!(f, "relaying"),
            SessionState::Closed => write!(f, "closed"),
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    connecting: AtomicUsize,
    relaying: AtomicUsize,
    peak_relaying: AtomicUsize,
    total: AtomicU64,
}

/// Tracks live sessions by state.
///
/// Cheap to clone; all clones share the same counters.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    counters: Arc<Counters>,
}

impl ConnectionTracker {
    /// Create a new connection tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session in the `Connecting` state.
    pub fn track(&self) -> SessionGuard {
        self.counters.connecting.fetch_add(1, Ordering::SeqCst);
        self.counters.total.fetch_add(1, Ordering::Relaxed);
        SessionGuard {
            counters: Arc::clone(&self.counters),
            id: ConnectionId::new(),
            state: SessionState::Connecting,
        }
    }

    /// Sessions still dialing the destination.
    pub fn connecting(&self) -> usize {
        self.counters.connecting.load(Ordering::SeqCst)
    }

    /// Sessions currently relaying.
    pub fn relaying(&self) -> usize {
        self.counters.relaying.load(Ordering::SeqCst)
    }

    /// Sessions not yet closed.
    pub fn active_count(&self) -> usize {
        self.connecting() + self.relaying()
    }

    /// Highest number of sessions ever relaying at the same time.
    pub fn peak_relaying(&self) -> usize {
        self.counters.peak_relaying.load(Ordering::SeqCst)
    }

    /// Sessions ever tracked.
    pub fn total(&self) -> u64 {
        self.counters.total.load(Ordering::Relaxed)
    }
}

/// Guard that tracks one session's state.
/// Moves the session to `Closed` when dropped, even on panic.
#[derive(Debug)]
pub struct SessionGuard {
    counters: Arc<Counters>,
    id: ConnectionId,
    state: SessionState,
}

impl SessionGuard {
    /// Get this session's ID.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Mark the destination as connected.
    pub fn relaying(&mut self) {
        if self.state != SessionState::Connecting {
            return;
        }
        self.counters.connecting.fetch_sub(1, Ordering::SeqCst);
        let now = self.counters.relaying.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.peak_relaying.fetch_max(now, Ordering::SeqCst);
        self.state = SessionState::Relaying;
    }

    fn close(&mut self) {
        match self.state {
            SessionState::Connecting => {
                self.counters.connecting.fetch_sub(1, Ordering::SeqCst);
            }
            SessionState::Relaying => {
                self.counters.relaying.fetch_sub(1, Ordering::SeqCst);
            }
            SessionState::Closed => return,
        }
        self.state = SessionState::Closed;
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.close();
        tracing::trace!(connection_id = %self.id, "Session released");
    }
}
