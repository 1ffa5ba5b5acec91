//! TCP listener and accept loop.
//!
//! # Responsibilities
//! - Bind to the configured address with the configured backlog
//! - Accept incoming TCP connections until the stop token fires
//! - Spawn one independent handler task per connection
//! - Best-effort drain of recent handlers on the way out
//!
//! # Design Decisions
//! - No connection cap: accept throughput never waits on handlers
//! - Accept errors are logged and retried; only binding is fatal

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{lookup_host, TcpListener, TcpSocket};

use crate::capture::CredentialSink;
use crate::config::HoneypotConfig;
use crate::lifecycle::drain::{DrainReport, RecentHandlers};
use crate::lifecycle::shutdown::StopToken;
use crate::net::connection::ConnectionTracker;
use crate::observability::metrics;
use crate::session::ConnectionHandler;

/// Pause after a failed accept (e.g. file descriptor exhaustion).
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

const BIND_HINT: &str =
    "try a local host such as 127.0.0.1, a non-privileged port above 1024, or a port not already in use";

/// Error type for listener operations.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("cannot listen on {addr}: {source} ({hint})")]
    Bind {
        addr: String,
        hint: &'static str,
        #[source]
        source: io::Error,
    },
}

impl ListenerError {
    fn bind(addr: &str, source: io::Error) -> Self {
        ListenerError::Bind {
            addr: addr.to_string(),
            hint: BIND_HINT,
            source,
        }
    }
}

/// The bound honeypot socket plus everything a handler needs.
pub struct Listener<S> {
    inner: TcpListener,
    config: Arc<HoneypotConfig>,
    handler: ConnectionHandler<S>,
    tracker: ConnectionTracker,
}

impl<S> Listener<S>
where
    S: CredentialSink + 'static,
{
    /// Bind to the configured address. Nothing is accepted until [`run`](Self::run).
    pub async fn bind(config: Arc<HoneypotConfig>, sink: Arc<S>) -> Result<Self, ListenerError> {
        let target = config.listener.bind_target();

        let addr = lookup_host((config.listener.host.as_str(), config.listener.port))
            .await
            .map_err(|e| ListenerError::bind(&target, e))?
            .next()
            .ok_or_else(|| {
                ListenerError::bind(
                    &target,
                    io::Error::new(io::ErrorKind::AddrNotAvailable, "host resolved to no address"),
                )
            })?;

        let inner = Self::listen(addr, config.listener.backlog).map_err(|e| ListenerError::bind(&target, e))?;
        let local_addr = inner.local_addr().map_err(|e| ListenerError::bind(&target, e))?;

        tracing::info!(
            address = %local_addr,
            backlog = config.listener.backlog,
            "Honeypot listening"
        );

        Ok(Self {
            inner,
            handler: ConnectionHandler::new(Arc::clone(&config), sink),
            config,
            tracker: ConnectionTracker::new(),
        })
    }

    fn listen(addr: SocketAddr, backlog: u32) -> io::Result<TcpListener> {
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        socket.listen(backlog)
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }

    /// Handlers still running.
    pub fn active_connections(&self) -> u64 {
        self.tracker.active_count()
    }

    /// Accept until `stop` fires, then close the socket and drain recent handlers.
    pub async fn run(self, mut stop: StopToken) -> DrainReport {
        let mut recent = RecentHandlers::new(self.config.shutdown.drain_window);

        loop {
            tokio::select! {
                biased;
                _ = stop.cancelled() => break,
                accepted = self.inner.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let guard = self.tracker.track();
                        metrics::record_connection_accepted();
                        tracing::info!(connection_id = %guard.id(), ip = %peer.ip(), port = peer.port(), "Incoming connection");

                        let handler = self.handler.clone();
                        recent.push(tokio::spawn(async move {
                            handler.handle(stream, peer, guard.id()).await;
                            drop(guard);
                        }));
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to accept connection");
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                },
            }
        }

        tracing::info!(
            active_connections = self.tracker.active_count(),
            draining = recent.len(),
            "Shutdown requested, closing server"
        );
        let Self { inner, config, .. } = self;
        drop(inner);

        recent.drain(config.shutdown.drain_grace()).await
    }
}
