//! Seikan: a connection-capped TCP port forwarder.
//!
//! Listens on one address and relays every client, byte for byte, to a
//! fixed destination until either side closes or the idle timeout elapses.

pub mod config;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod relay;
pub mod resilience;

pub use config::{ForwardingConfig, SeikanConfig};
pub use lifecycle::{Shutdown, ShutdownSignal};
pub use relay::{ForwardError, Forwarder};
