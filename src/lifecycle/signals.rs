//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT / Ctrl-C)
//! - Translate each signal into a stop request
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - The handler only touches the stop flag; the listener owns the rest
//! - Repeated signals are no-ops once shutdown is in progress
//! - Handlers are registered synchronously, before the forwarding task runs
//! - Registration failure is logged and the process keeps serving

use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::Shutdown;

/// Register the termination signals, then spawn a task that triggers
/// `shutdown` on every delivery.
///
/// Registration happens before this returns, so a signal sent right after
/// the call is already routed to `shutdown`. Must be called from within a
/// Tokio runtime.
pub fn spawn_signal_handler(shutdown: Shutdown) -> JoinHandle<()> {
    let signals = Signals::register();
    tokio::spawn(async move {
        let Some(mut signals) = signals else {
            return;
        };
        while let Some(name) = signals.next().await {
            on_signal(&shutdown, name);
        }
    })
}

#[cfg(unix)]
struct Signals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Signals {
    fn register() -> Option<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
            (Ok(interrupt), Ok(terminate)) => Some(Self { interrupt, terminate }),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "Signal handlers unavailable");
                None
            }
        }
    }

    async fn next(&mut self) -> Option<&'static str> {
        tokio::select! {
            Some(()) = self.interrupt.recv() => Some("SIGINT"),
            Some(()) = self.terminate.recv() => Some("SIGTERM"),
            else => None,
        }
    }
}

#[cfg(not(unix))]
struct Signals;

#[cfg(not(unix))]
impl Signals {
    fn register() -> Option<Self> {
        Some(Self)
    }

    async fn next(&mut self) -> Option<&'static str> {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Some("ctrl-c"),
            Err(e) => {
                tracing::warn!(error = %e, "Signal handlers unavailable");
                None
            }
        }
    }
}

fn on_signal(shutdown: &Shutdown, name: &'static str) {
    if shutdown.trigger() {
        tracing::info!(signal = name, "Termination signal received, stopping listener");
    } else {
        tracing::debug!(signal = name, "Shutdown already in progress");
    }
}
