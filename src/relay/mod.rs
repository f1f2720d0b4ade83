//! Relay subsystem.
//!
//! # Data Flow
//! ```text
//! forwarder.rs (bounded accept loop)
//!     → accepted client socket
//!     → session.rs (dial destination, two copy directions)
//!     → net::TimedChannel on each socket half
//!     → destination socket
//! ```
//!
//! # Design Decisions
//! - Session failures are logged and contained; the accept loop never sees them
//! - Timeouts and cancellation are routine endings, not errors
//! - The two directions run concurrently and end independently (half-close)

pub mod error;
pub mod forwarder;
pub mod session;

pub use error::{ForwardError, ForwardResult, Operation};
pub use forwarder::{Forwarder, ForwarderState};
pub use session::{Direction, RelayStats, Session, SessionReport, TRANSFER_CHUNK_SIZE};
