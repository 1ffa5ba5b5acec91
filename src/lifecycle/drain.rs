//! Best-effort drain of recently spawned handlers.
//!
//! Only the trailing `window` spawns are remembered; older handles are
//! detached as new ones arrive. At shutdown each remembered handle gets
//! `grace` to finish and is abandoned otherwise.
//!
//! Handlers older than the window are never waited for, even when still
//! running.
// TODO: decide whether the drain should cover every live handler (e.g. via
// the connection tracker) rather than the trailing window only.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Result of the shutdown drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Handlers that completed within their grace period.
    pub finished: usize,
    /// Handlers that panicked.
    pub failed: usize,
    /// Handlers still running when their grace period ran out.
    pub abandoned: usize,
}

/// Bounded ring of the most recent handler tasks.
#[derive(Debug)]
pub struct RecentHandlers {
    handles: VecDeque<JoinHandle<()>>,
    window: usize,
}

impl RecentHandlers {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            handles: VecDeque::with_capacity(window.min(1024)),
            window,
        }
    }

    /// Remember a new handler, forgetting the oldest one if the window is full.
    pub fn push(&mut self, handle: JoinHandle<()>) {
        if self.handles.len() == self.window {
            // Dropping a JoinHandle detaches the task; it keeps running.
            self.handles.pop_front();
        }
        self.handles.push_back(handle);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait up to `grace` for each remembered handler, oldest first.
    pub async fn drain(self, grace: Duration) -> DrainReport {
        let mut report = DrainReport::default();

        for handle in self.handles {
            match tokio::time::timeout(grace, handle).await {
                Ok(Ok(())) => report.finished += 1,
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "Connection handler failed");
                    report.failed += 1;
                }
                Err(_) => report.abandoned += 1,
            }
        }

        tracing::debug!(
            finished = report.finished,
            failed = report.failed,
            abandoned = report.abandoned,
            "Handler drain complete"
        );
        report
    }
}
