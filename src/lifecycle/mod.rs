//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT/SIGTERM → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → every ShutdownSignal resolves
//!             → accept loop stops re-arming, in-flight I/O is cancelled
//!             → loop drains and the listener closes
//! ```
//!
//! # Design Decisions
//! - One shared signal, passed by value into every component
//! - The signal is sticky: late subscribers observe it immediately
//! - A second interrupt skips the drain

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
