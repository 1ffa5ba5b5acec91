//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the honeypot.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::validation::ValidationError;

/// Upper bound for the idle timeout and the simulated delay (one day).
pub const MAX_SESSION_SECS: f64 = 86_400.0;

/// Root configuration for the honeypot.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HoneypotConfig {
    /// Listener configuration (bind address, backlog).
    pub listener: ListenerConfig,

    /// Scripted login exchange settings.
    pub session: SessionConfig,

    /// Where captured credentials and events are written.
    pub storage: StorageConfig,

    /// Best-effort drain at shutdown.
    pub shutdown: ShutdownConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host to bind. Defaults to loopback so the first run never needs privileges.
    pub host: String,

    /// TCP port (0 picks an ephemeral port).
    pub port: u16,

    /// Pending-connection queue passed to `listen(2)`.
    pub backlog: u32,
}

impl ListenerConfig {
    /// `host:port` as shown in logs and errors.
    pub fn bind_target(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 2222,
            backlog: 50,
        }
    }
}

/// Scripted exchange configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Text presented before the login prompt.
    pub banner: String,

    /// Maximum wait for each client line, in seconds.
    pub idle_timeout_secs: f64,

    /// Simulated service latency applied after each line, in seconds.
    pub delay_secs: f64,

    /// Upper bound on bytes read for a single line.
    pub recv_buffer: usize,
}

impl SessionConfig {
    /// Idle timeout per client line: positive and at most [`MAX_SESSION_SECS`].
    pub fn idle_timeout(&self) -> Result<Duration, ValidationError> {
        const FIELD: &str = "session.idle_timeout_secs";
        let timeout = secs_to_duration(FIELD, self.idle_timeout_secs)?;
        if timeout.is_zero() {
            return Err(ValidationError::new(
                FIELD,
                format!("must be a positive number of seconds, got {}", self.idle_timeout_secs),
            ));
        }
        Ok(timeout)
    }

    /// Simulated latency: zero up to [`MAX_SESSION_SECS`].
    pub fn simulated_delay(&self) -> Result<Duration, ValidationError> {
        secs_to_duration("session.delay_secs", self.delay_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            banner: "Debian GNU/Linux 11".to_string(),
            idle_timeout_secs: 10.0,
            delay_secs: 0.3,
            recv_buffer: 1024,
        }
    }
}

fn secs_to_duration(field: &'static str, secs: f64) -> Result<Duration, ValidationError> {
    if !(0.0..=MAX_SESSION_SECS).contains(&secs) {
        return Err(ValidationError::new(
            field,
            format!("must be between 0 and {MAX_SESSION_SECS} seconds, got {secs}"),
        ));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| ValidationError::new(field, e.to_string()))
}

/// Output locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Append-only credential log.
    pub creds_log_path: PathBuf,

    /// Operational event log.
    pub event_log_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            creds_log_path: PathBuf::from("honeypot_creds.log"),
            event_log_path: PathBuf::from("honeypot.log"),
        }
    }
}

/// Shutdown drain configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Number of most recently spawned handlers awaited at shutdown.
    pub drain_window: usize,

    /// Grace period granted to each of those handlers, in milliseconds.
    pub drain_grace_ms: u64,
}

impl ShutdownConfig {
    pub fn drain_grace(&self) -> Duration {
        Duration::from_millis(self.drain_grace_ms)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            drain_window: 100,
            drain_grace_ms: 200,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    pub log_level: String,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
