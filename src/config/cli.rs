//! Command-line surface.
//!
//! Precedence: flags > config file > built-in defaults. The merged result is
//! validated once, after all layers are applied.

use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{parse_config, ConfigError};
use crate::config::schema::HoneypotConfig;
use crate::config::validation::validate_config;

#[derive(Debug, Parser)]
#[command(name = "honeypot")]
#[command(about = "Low-interaction login honeypot (TCP)", long_about = None)]
pub struct CliArgs {
    /// TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Listen address (default: 127.0.0.1, local only)
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (default: 2222)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// listen() backlog (default: 50)
    #[arg(long)]
    pub backlog: Option<u32>,

    /// Client idle timeout in seconds (default: 10)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<f64>,

    /// Banner shown before the login prompt (default: Debian GNU/Linux 11)
    #[arg(long)]
    pub banner: Option<String>,

    /// Maximum bytes read per client line (default: 1024)
    #[arg(long, value_name = "BYTES")]
    pub recv_buf: Option<usize>,

    /// Captured credentials file (default: honeypot_creds.log)
    #[arg(long, value_name = "PATH")]
    pub creds_log: Option<PathBuf>,

    /// Event log file (default: honeypot.log)
    #[arg(long, value_name = "PATH")]
    pub event_log: Option<PathBuf>,

    /// Simulated delay between prompts in seconds (default: 0.3)
    #[arg(long, value_name = "SECS")]
    pub delay: Option<f64>,

    /// Log filter, e.g. "info" or "honeypot=debug" (RUST_LOG wins when set)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Build the final, validated configuration.
    pub fn into_config(self) -> Result<HoneypotConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => parse_config(path)?,
            None => HoneypotConfig::default(),
        };
        self.apply(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    fn apply(self, config: &mut HoneypotConfig) {
        if let Some(host) = self.host {
            config.listener.host = host;
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(backlog) = self.backlog {
            config.listener.backlog = backlog;
        }
        if let Some(timeout) = self.timeout {
            config.session.idle_timeout_secs = timeout;
        }
        if let Some(banner) = self.banner {
            config.session.banner = banner;
        }
        if let Some(recv_buf) = self.recv_buf {
            config.session.recv_buffer = recv_buf;
        }
        if let Some(delay) = self.delay {
            config.session.delay_secs = delay;
        }
        if let Some(path) = self.creds_log {
            config.storage.creds_log_path = path;
        }
        if let Some(path) = self.event_log {
            config.storage.event_log_path = path;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
    }
}
