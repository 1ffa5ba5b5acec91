//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::HoneypotConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<HoneypotConfig, ConfigError> {
    let config = parse_config(path)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Read and parse a TOML file without semantic checks.
///
/// For callers that layer more settings on top and validate the merged result.
pub fn parse_config(path: &Path) -> Result<HoneypotConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[listener]\nhost = \"0.0.0.0\"\nport = 2022\n\n[storage]\ncreds_log_path = \"/tmp/creds.log\""
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.listener.bind_target(), "0.0.0.0:2022");
        assert_eq!(config.storage.creds_log_path, Path::new("/tmp/creds.log"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn bad_syntax_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listener\nport = ").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn semantic_errors_are_reported_together() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listener]\nbacklog = 0\n\n[session]\nrecv_buffer = 0").unwrap();

        let err = load_config(file.path()).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Validation failed: "));
        assert!(message.contains("listener.backlog"));
        assert!(message.contains("session.recv_buffer"));
    }

    #[test]
    fn parse_leaves_semantic_checks_to_the_caller() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listener]\nbacklog = 0").unwrap();

        let config = parse_config(file.path()).unwrap();
        assert_eq!(config.listener.backlog, 0);
        assert!(matches!(load_config(file.path()), Err(ConfigError::Validation(_))));
    }
}
