//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → optional TOML file (loader.rs)
//!     → command-line overrides (cli.rs)
//!     → validation.rs (semantic checks)
//!     → ForwardingConfig (validated, immutable)
//!     → owned by the forwarder for the process lifetime
//! ```
//!
//! # Design Decisions
//! - Config is immutable once validated; there is no reload
//! - All fields have defaults so a file may be partial
//! - Validation separates syntactic (serde, clap) from semantic checks
//! - Nothing touches the network until validation passes

pub mod cli;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cli::Cli;
pub use loader::{load_config, ConfigError};
pub use schema::{ForwardingConfig, ListenerConfig, LogFormat, ObservabilityConfig, SeikanConfig};
pub use validation::{validate_config, ValidationError};
