//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0 and at most one day, buffers non-empty)
//! - Reject values the exchange cannot express (NUL in the banner)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: HoneypotConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::HoneypotConfig;

/// A single semantic problem with a configuration value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub(crate) fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check every semantic constraint, collecting all failures.
pub fn validate_config(config: &HoneypotConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.host.trim().is_empty() {
        errors.push(ValidationError::new("listener.host", "must not be empty"));
    }
    if config.listener.backlog == 0 {
        errors.push(ValidationError::new("listener.backlog", "must be greater than 0"));
    }

    let session = &config.session;
    // Same conversions the handler uses, so a value accepted here is the value served.
    if let Err(e) = session.idle_timeout() {
        errors.push(e);
    }
    if let Err(e) = session.simulated_delay() {
        errors.push(e);
    }
    if session.recv_buffer == 0 {
        errors.push(ValidationError::new("session.recv_buffer", "must be greater than 0"));
    }
    if session.banner.is_empty() {
        errors.push(ValidationError::new("session.banner", "must not be empty"));
    } else if session.banner.contains('\0') {
        errors.push(ValidationError::new("session.banner", "must not contain NUL bytes"));
    }

    if config.storage.creds_log_path.as_os_str().is_empty() {
        errors.push(ValidationError::new("storage.creds_log_path", "must not be empty"));
    }
    if config.storage.event_log_path.as_os_str().is_empty() {
        errors.push(ValidationError::new("storage.event_log_path", "must not be empty"));
    }

    if config.shutdown.drain_window == 0 {
        errors.push(ValidationError::new("shutdown.drain_window", "must be greater than 0"));
    }

    let observability = &config.observability;
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("not a socket address: {:?}", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
