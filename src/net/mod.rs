//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (bind with backlog, accept)
//!     → connection.rs (connection ID, session state tracking)
//!     → channel.rs (timed, cancellable reads and writes)
//!     → Hand off to the relay layer
//!
//! Session States:
//!     Connecting → Relaying → Closed
//! ```
//!
//! # Design Decisions
//! - The kernel backlog buffers clients while the forwarder is at capacity
//! - Each session is tracked so the concurrency cap is observable
//! - Channels are generic over the stream so they work on split socket halves

pub mod channel;
pub mod connection;
pub mod listener;

pub use channel::TimedChannel;
pub use connection::{ConnectionId, ConnectionTracker, SessionGuard, SessionState};
pub use listener::{Listener, ListenerError};
