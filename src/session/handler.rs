//! Per-connection handler.
//!
//! # Responsibilities
//! - Drive one connection through the scripted login exchange
//! - Hand the submitted credential to the sink
//! - Always reject, then close the connection on every exit path
//!
//! # Design Decisions
//! - Generic over the transport so the exchange runs against in-memory pipes
//! - Failures stay inside the handler; nothing propagates to the listener
//! - A sink failure loses the record but still completes the exchange;
//!   `CredentialLogged` is only entered once the sink accepted the record
//! - Timings that cannot be represented fail the connection up front

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::capture::{CapturedCredential, CredentialSink};
use crate::config::HoneypotConfig;
use crate::net::connection::ConnectionId;
use crate::observability::metrics;
use crate::session::line::read_line;
use crate::session::{
    SessionError, SessionOutcome, SessionState, LOGIN_PROMPT, PASSWORD_PROMPT, REJECTION,
};

/// Runs the scripted exchange. Cheap to clone; one per accepted connection.
pub struct ConnectionHandler<S> {
    config: Arc<HoneypotConfig>,
    sink: Arc<S>,
}

impl<S> Clone for ConnectionHandler<S> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<S: CredentialSink> ConnectionHandler<S> {
    pub fn new(config: Arc<HoneypotConfig>, sink: Arc<S>) -> Self {
        Self { config, sink }
    }

    /// Serve one connection to completion and close it.
    pub async fn handle<T>(&self, stream: T, peer: SocketAddr, id: ConnectionId) -> SessionOutcome
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        let settings = &self.config.session;
        let (idle, delay) = match (settings.idle_timeout(), settings.simulated_delay()) {
            (Ok(idle), Ok(delay)) => (idle, delay),
            (Err(e), _) | (_, Err(e)) => {
                tracing::error!(connection_id = %id, ip = %peer.ip(), error = %e, "Unusable session timing, dropping connection");
                metrics::record_session_outcome(SessionOutcome::Failed.as_str());
                return SessionOutcome::Failed;
            }
        };

        let mut session = Session {
            conn: BufReader::new(stream),
            state: SessionState::Connected,
            idle,
            id,
        };

        let outcome = match self.exchange(&mut session, peer, delay).await {
            Ok(()) => SessionOutcome::Rejected,
            Err(SessionError::Timeout) => {
                tracing::info!(connection_id = %id, ip = %peer.ip(), state = %session.state, "Client timed out");
                SessionOutcome::TimedOut
            }
            Err(e) if e.is_disconnect() => {
                tracing::info!(connection_id = %id, ip = %peer.ip(), state = %session.state, error = %e, "Connection interrupted");
                SessionOutcome::Disconnected
            }
            Err(e) => {
                tracing::error!(connection_id = %id, ip = %peer.ip(), state = %session.state, error = ?e, "Unexpected handler failure");
                SessionOutcome::Failed
            }
        };

        session.close().await;
        metrics::record_session_outcome(outcome.as_str());
        outcome
    }

    async fn exchange<T>(
        &self,
        session: &mut Session<T>,
        peer: SocketAddr,
        delay: Duration,
    ) -> Result<(), SessionError>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        let settings = &self.config.session;

        let greeting = format!("{}\n{}", settings.banner, LOGIN_PROMPT);
        session.send(greeting.as_bytes()).await?;
        session.advance(SessionState::BannerSent);

        session.advance(SessionState::AwaitUsername);
        let username = read_line(&mut session.conn, settings.recv_buffer, session.idle).await?;
        settle(delay).await;

        session.send(PASSWORD_PROMPT.as_bytes()).await?;
        session.advance(SessionState::PasswordPromptSent);

        session.advance(SessionState::AwaitPassword);
        let password = read_line(&mut session.conn, settings.recv_buffer, session.idle).await?;
        settle(delay).await;

        let credential = CapturedCredential::new(peer.ip(), username, password);
        match self.sink.append(&credential).await {
            Ok(()) => {
                metrics::record_credential_captured();
                tracing::info!(
                    connection_id = %session.id,
                    ip = %peer.ip(),
                    user = ?credential.username(),
                    "Attempt captured"
                );
                session.advance(SessionState::CredentialLogged);
            }
            Err(e) => {
                // Still rejected below, but the state never claims a stored record.
                tracing::warn!(connection_id = %session.id, ip = %peer.ip(), error = %e, "Credential record lost");
            }
        }

        session.send(REJECTION.as_bytes()).await?;
        session.advance(SessionState::Rejected);
        Ok(())
    }
}

/// Simulated service latency.
async fn settle(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

struct Session<T> {
    conn: BufReader<T>,
    state: SessionState,
    idle: Duration,
    id: ConnectionId,
}

impl<T> Session<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    fn advance(&mut self, next: SessionState) {
        tracing::trace!(connection_id = %self.id, from = %self.state, to = %next, "Session transition");
        self.state = next;
    }

    async fn send(&mut self, bytes: &[u8]) -> Result<(), SessionError> {
        tokio::time::timeout(self.idle, async {
            self.conn.write_all(bytes).await?;
            self.conn.flush().await
        })
        .await
        .map_err(|_| SessionError::Timeout)??;
        Ok(())
    }

    /// Best-effort orderly shutdown; the transport is dropped afterwards regardless.
    async fn close(mut self) {
        let _ = tokio::time::timeout(self.idle, self.conn.shutdown()).await;
        self.advance(SessionState::Closed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::SinkError;
    use std::sync::Mutex;
    use std::time::Instant;
    use tokio::io::{AsyncReadExt, DuplexStream};

    #[derive(Default)]
    struct MemorySink {
        records: Mutex<Vec<CapturedCredential>>,
        fail: bool,
    }

    impl CredentialSink for MemorySink {
        async fn append(&self, credential: &CapturedCredential) -> Result<(), SinkError> {
            if self.fail {
                return Err(SinkError::Write {
                    path: "memory".into(),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.records.lock().unwrap().push(credential.clone());
            Ok(())
        }
    }

    fn config(idle_ms: u64, delay_ms: u64) -> Arc<HoneypotConfig> {
        let mut config = HoneypotConfig::default();
        config.session.banner = "Debian GNU/Linux 11".into();
        config.session.idle_timeout_secs = idle_ms as f64 / 1000.0;
        config.session.delay_secs = delay_ms as f64 / 1000.0;
        Arc::new(config)
    }

    fn peer() -> SocketAddr {
        "203.0.113.9:40022".parse().unwrap()
    }

    fn spawn_handler(
        config: Arc<HoneypotConfig>,
        sink: Arc<MemorySink>,
    ) -> (DuplexStream, tokio::task::JoinHandle<SessionOutcome>) {
        let (client, server) = tokio::io::duplex(4096);
        let handler = ConnectionHandler::new(config, sink);
        let task = tokio::spawn(async move { handler.handle(server, peer(), ConnectionId::new()).await });
        (client, task)
    }

    async fn read_until(client: &mut DuplexStream, needle: &str) -> String {
        let mut seen = Vec::new();
        let mut chunk = [0u8; 256];
        while !String::from_utf8_lossy(&seen).contains(needle) {
            let n = client.read(&mut chunk).await.unwrap();
            assert!(n > 0, "stream closed before {needle:?}; got {:?}", String::from_utf8_lossy(&seen));
            seen.extend_from_slice(&chunk[..n]);
        }
        String::from_utf8(seen).unwrap()
    }

    #[tokio::test]
    async fn full_exchange_is_captured_and_rejected() {
        let sink = Arc::new(MemorySink::default());
        let (mut client, task) = spawn_handler(config(1000, 0), Arc::clone(&sink));

        let greeting = read_until(&mut client, LOGIN_PROMPT).await;
        assert_eq!(greeting, "Debian GNU/Linux 11\nlogin: ");

        client.write_all(b"admin\r\n").await.unwrap();
        assert_eq!(read_until(&mut client, PASSWORD_PROMPT).await, "password: ");

        client.write_all(b"secret\n").await.unwrap();
        let mut rest = String::new();
        client.read_to_string(&mut rest).await.unwrap();
        assert_eq!(rest, "Login incorrect\n");

        assert_eq!(task.await.unwrap(), SessionOutcome::Rejected);
        let records = sink.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].username(), "admin");
        assert_eq!(records[0].password(), "secret");
        assert_eq!(records[0].source_ip(), peer().ip());
    }

    #[tokio::test]
    async fn silent_client_times_out_without_record() {
        let sink = Arc::new(MemorySink::default());
        let (mut client, task) = spawn_handler(config(100, 0), Arc::clone(&sink));

        read_until(&mut client, LOGIN_PROMPT).await;
        assert_eq!(task.await.unwrap(), SessionOutcome::TimedOut);

        let mut rest = Vec::new();
        client.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());
        assert!(sink.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn username_only_produces_no_record() {
        let sink = Arc::new(MemorySink::default());
        let (mut client, task) = spawn_handler(config(100, 0), Arc::clone(&sink));

        read_until(&mut client, LOGIN_PROMPT).await;
        client.write_all(b"root\n").await.unwrap();
        read_until(&mut client, PASSWORD_PROMPT).await;

        assert_eq!(task.await.unwrap(), SessionOutcome::TimedOut);
        assert!(sink.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn hangup_after_username_is_a_disconnect() {
        let sink = Arc::new(MemorySink::default());
        let (mut client, task) = spawn_handler(config(1000, 0), Arc::clone(&sink));

        read_until(&mut client, LOGIN_PROMPT).await;
        client.write_all(b"root\n").await.unwrap();
        read_until(&mut client, PASSWORD_PROMPT).await;
        drop(client);

        assert_eq!(task.await.unwrap(), SessionOutcome::Disconnected);
        assert!(sink.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn both_lines_in_one_packet() {
        let sink = Arc::new(MemorySink::default());
        let (mut client, task) = spawn_handler(config(1000, 0), Arc::clone(&sink));

        client.write_all(b"oracle\noracle123\n").await.unwrap();
        let mut transcript = String::new();
        client.read_to_string(&mut transcript).await.unwrap();

        assert_eq!(transcript, "Debian GNU/Linux 11\nlogin: password: Login incorrect\n");
        assert_eq!(task.await.unwrap(), SessionOutcome::Rejected);
        assert_eq!(sink.records.lock().unwrap()[0].password(), "oracle123");
    }

    #[tokio::test]
    async fn delay_precedes_password_prompt() {
        let sink = Arc::new(MemorySink::default());
        let (mut client, task) = spawn_handler(config(1000, 150), sink);

        read_until(&mut client, LOGIN_PROMPT).await;
        let prompted = Instant::now();
        client.write_all(b"pi\n").await.unwrap();
        read_until(&mut client, PASSWORD_PROMPT).await;
        assert!(prompted.elapsed() >= Duration::from_millis(150));

        client.write_all(b"raspberry\n").await.unwrap();
        assert_eq!(task.await.unwrap(), SessionOutcome::Rejected);
    }

    #[tokio::test]
    async fn sink_failure_still_rejects() {
        let sink = Arc::new(MemorySink {
            fail: true,
            ..Default::default()
        });
        let (mut client, task) = spawn_handler(config(1000, 0), sink);

        client.write_all(b"user\npass\n").await.unwrap();
        let mut transcript = String::new();
        client.read_to_string(&mut transcript).await.unwrap();

        assert!(transcript.ends_with(REJECTION));
        assert_eq!(task.await.unwrap(), SessionOutcome::Rejected);
    }

    #[tokio::test]
    async fn empty_lines_are_still_a_complete_exchange() {
        let sink = Arc::new(MemorySink::default());
        let (mut client, task) = spawn_handler(config(1000, 0), Arc::clone(&sink));

        client.write_all(b"\n\n").await.unwrap();
        let mut transcript = String::new();
        client.read_to_string(&mut transcript).await.unwrap();

        assert!(transcript.ends_with(REJECTION));
        assert_eq!(task.await.unwrap(), SessionOutcome::Rejected);
        let records = sink.records.lock().unwrap();
        assert_eq!(records[0].username(), "");
        assert_eq!(records[0].password(), "");
    }

    #[derive(Clone, Default)]
    struct Transitions(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Transitions {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Transitions {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    /// Runs one two-line exchange and returns the trace output it produced.
    async fn traced_exchange(sink: Arc<MemorySink>) -> (SessionOutcome, String) {
        let transitions = Transitions::default();
        let writer = transitions.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let (mut client, server) = tokio::io::duplex(4096);
        let handler = ConnectionHandler::new(config(1000, 0), sink);
        client.write_all(b"user\npass\n").await.unwrap();
        let (outcome, _) = tokio::join!(handler.handle(server, peer(), ConnectionId::new()), async {
            let mut transcript = String::new();
            client.read_to_string(&mut transcript).await.unwrap();
        });
        (outcome, transitions.text())
    }

    #[tokio::test]
    async fn credential_logged_only_after_sink_accepts() {
        let (outcome, trace) = traced_exchange(Arc::new(MemorySink::default())).await;
        assert_eq!(outcome, SessionOutcome::Rejected);
        assert!(trace.contains("to=credential_logged"), "{trace}");
        assert!(trace.contains("to=rejected"), "{trace}");
    }

    #[tokio::test]
    async fn failed_append_never_enters_credential_logged() {
        let sink = Arc::new(MemorySink {
            fail: true,
            ..Default::default()
        });
        let (outcome, trace) = traced_exchange(sink).await;
        assert_eq!(outcome, SessionOutcome::Rejected);
        assert!(!trace.contains("credential_logged"), "{trace}");
        assert!(trace.contains("from=await_password to=rejected"), "{trace}");
    }

    #[tokio::test]
    async fn unrepresentable_timeout_fails_instead_of_zero() {
        let mut unchecked = HoneypotConfig::default();
        unchecked.session.idle_timeout_secs = 1e20;
        let sink = Arc::new(MemorySink::default());
        let (mut client, task) = spawn_handler(Arc::new(unchecked), Arc::clone(&sink));

        assert_eq!(task.await.unwrap(), SessionOutcome::Failed);
        let mut rest = Vec::new();
        client.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty(), "nothing is sent on an unusable timing");
        assert!(sink.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unrepresentable_delay_fails_instead_of_zero() {
        let mut unchecked = HoneypotConfig::default();
        unchecked.session.delay_secs = 1e20;
        let (_client, task) = spawn_handler(Arc::new(unchecked), Arc::new(MemorySink::default()));
        assert_eq!(task.await.unwrap(), SessionOutcome::Failed);
    }
}
