//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! accept loop, sessions, channels produce:
//!     → logging.rs (structured log events, one span per session)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → optional Prometheus scrape endpoint
//! ```
//!
//! # Design Decisions
//! - Lifecycle events (accept, connect, close) at INFO
//! - Timeouts and cancellation at WARN, transport failures at ERROR
//! - Metrics are cheap and disabled unless an endpoint is configured

pub mod logging;
pub mod metrics;
