//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Every accept, connect, read and write:
//!     → timeouts.rs (race against deadline and shutdown signal)
//!     → Ok(io result) | TimedOut | Cancelled
//! ```
//!
//! # Design Decisions
//! - One idle timeout governs connect, read and write alike
//! - No retries: a failed session is torn down, the client may reconnect

pub mod timeouts;

pub use timeouts::guard;
