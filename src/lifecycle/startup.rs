//! Startup orchestration.
//!
//! # Responsibilities
//! - Prepare the credential log (parent directories)
//! - Bind the listener
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds last so no connection arrives before the sink is ready

use std::sync::Arc;

use crate::capture::{FileCredentialSink, SinkError};
use crate::config::HoneypotConfig;
use crate::net::listener::{Listener, ListenerError};

/// Error type for startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error(transparent)]
    Listener(#[from] ListenerError),
}

/// Prepare storage and bind. The returned listener is ready to [`run`](Listener::run).
pub async fn start(config: HoneypotConfig) -> Result<Listener<FileCredentialSink>, StartupError> {
    let config = Arc::new(config);
    let sink = Arc::new(FileCredentialSink::open(&config.storage.creds_log_path).await?);
    let listener = Listener::bind(config, sink).await?;
    Ok(listener)
}
