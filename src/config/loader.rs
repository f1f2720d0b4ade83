//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::schema::SeikanConfig;
use crate::config::validation::ValidationError;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

impl ConfigError {
    /// Whether the operator should be shown the usage summary.
    pub fn is_usage(&self) -> bool {
        matches!(self, ConfigError::Validation(_))
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from a TOML file.
///
/// Only syntax is checked here; semantic checks run after command-line
/// overrides are applied.
pub fn load_config(path: &Path) -> Result<SeikanConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("seikan-{}-{}", std::process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_partial_file() {
        let path = scratch_file("partial.toml", "[upstream]\naddress = \"10.0.0.5:22\"\n");
        let config = load_config(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.upstream.address, Some("10.0.0.5:22".parse().unwrap()));
        assert!(config.listener.bind_address.is_none());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/seikan.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(!err.is_usage());
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let path = scratch_file("bad.toml", "[listener]\nbind_address = \"nope\"\n");
        let err = load_config(&path).unwrap_err();
        fs::remove_file(&path).ok();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn validation_errors_are_joined() {
        let err = ConfigError::Validation(vec![
            ValidationError::MissingListenAddress,
            ValidationError::ZeroBacklog,
        ]);
        assert!(err.is_usage());
        assert_eq!(
            err.to_string(),
            "missing parameter: accept address, backlog must be at least 1"
        );
    }
}
