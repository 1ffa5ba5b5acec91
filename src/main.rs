//! Low-interaction login honeypot.
//!
//! Listens on a TCP port, plays back a shell-style login transcript, records
//! every submitted username/password pair and always refuses access.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                  HONEYPOT                    │
//!                        │                                              │
//!   Client ──────────────┼─▶ net::listener ──spawn──▶ session::handler  │
//!                        │        ▲                        │            │
//!                        │        │ stop token             ▼            │
//!                        │  lifecycle::signals     capture::sink        │
//!                        │  lifecycle::shutdown    (creds log)          │
//!                        │                                              │
//!                        │  config (defaults → TOML → CLI flags)        │
//!                        │  observability (event log, metrics)          │
//!                        └──────────────────────────────────────────────┘
//! ```

use clap::Parser;

use honeypot::config::CliArgs;
use honeypot::lifecycle::{self, signals, Shutdown};
use honeypot::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliArgs::parse().into_config()?;

    logging::init_logging(&config.observability, &config.storage.event_log_path)?;

    tracing::info!(
        bind_address = %config.listener.bind_target(),
        backlog = config.listener.backlog,
        idle_timeout_secs = config.session.idle_timeout_secs,
        delay_secs = config.session.delay_secs,
        creds_log = %config.storage.creds_log_path.display(),
        event_log = %config.storage.event_log_path.display(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Signals are routed before the socket exists, so a stop request that
    // races startup makes `run` return at once instead of killing the process.
    let shutdown = Shutdown::new();
    let signal_task = signals::spawn_signal_handler(shutdown.clone());

    let listener = match lifecycle::start(config).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, "Honeypot failed to start");
            signal_task.abort();
            return Err(e.into());
        }
    };

    let report = listener.run(shutdown.token()).await;
    signal_task.abort();

    tracing::info!(
        finished = report.finished,
        failed = report.failed,
        abandoned = report.abandoned,
        "Shutdown complete"
    );
    Ok(())
}
