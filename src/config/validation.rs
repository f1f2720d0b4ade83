//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Require both endpoints before any socket is opened
//! - Validate value ranges (limits > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: SeikanConfig → ForwardingConfig or errors

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{ForwardingConfig, SeikanConfig};

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing parameter: accept address")]
    MissingListenAddress,

    #[error("missing parameter: connect address")]
    MissingDestination,

    #[error("max connections must be at least 1")]
    ZeroMaxConnections,

    #[error("backlog must be at least 1")]
    ZeroBacklog,

    #[error("invalid metrics address: {0}")]
    InvalidMetricsAddress(String),
}

/// Check `config` and produce the immutable forwarding parameters.
pub fn validate_config(config: &SeikanConfig) -> Result<ForwardingConfig, Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.is_none() {
        errors.push(ValidationError::MissingListenAddress);
    }
    if config.upstream.address.is_none() {
        errors.push(ValidationError::MissingDestination);
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroMaxConnections);
    }
    if config.listener.backlog == 0 {
        errors.push(ValidationError::ZeroBacklog);
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    match (config.listener.bind_address, config.upstream.address) {
        (Some(listen), Some(destination)) if errors.is_empty() => Ok(ForwardingConfig {
            listen,
            destination,
            idle_timeout: config.timeouts.idle(),
            max_connections: config.listener.max_connections,
            backlog: config.listener.backlog,
        }),
        _ => Err(errors),
    }
}
