//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use honeypot::capture::{CapturedCredential, CredentialSink, SinkError};
use honeypot::lifecycle::{DrainReport, Shutdown};
use honeypot::{HoneypotConfig, Listener};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

/// In-memory credential sink.
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<CapturedCredential>>,
}

impl MemorySink {
    pub fn records(&self) -> Vec<CapturedCredential> {
        self.records.lock().unwrap().clone()
    }
}

impl CredentialSink for MemorySink {
    async fn append(&self, credential: &CapturedCredential) -> Result<(), SinkError> {
        self.records.lock().unwrap().push(credential.clone());
        Ok(())
    }
}

/// Loopback, ephemeral port, short timeouts.
pub fn test_config() -> HoneypotConfig {
    let mut config = HoneypotConfig::default();
    config.listener.port = 0;
    config.session.idle_timeout_secs = 1.0;
    config.session.delay_secs = 0.0;
    config
}

pub struct RunningHoneypot {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub task: JoinHandle<DrainReport>,
}

impl RunningHoneypot {
    pub async fn stop(self) -> DrainReport {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(10), self.task)
            .await
            .expect("listener did not stop")
            .unwrap()
    }
}

/// Bind and run a honeypot in the background.
pub async fn spawn_honeypot<S>(config: HoneypotConfig, sink: Arc<S>) -> RunningHoneypot
where
    S: CredentialSink + 'static,
{
    let listener = Listener::bind(Arc::new(config), sink).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let token = shutdown.token();
    let task = tokio::spawn(async move { listener.run(token).await });

    RunningHoneypot { addr, shutdown, task }
}

/// Read until `needle` shows up, returning everything read so far.
pub async fn read_until(stream: &mut TcpStream, needle: &str) -> String {
    let mut seen = Vec::new();
    let mut chunk = [0u8; 512];
    while !String::from_utf8_lossy(&seen).contains(needle) {
        let n = tokio::time::timeout(Duration::from_secs(5), stream.read(&mut chunk))
            .await
            .expect("timed out waiting for server output")
            .unwrap();
        assert!(
            n > 0,
            "connection closed before {needle:?}; got {:?}",
            String::from_utf8_lossy(&seen)
        );
        seen.extend_from_slice(&chunk[..n]);
    }
    String::from_utf8_lossy(&seen).into_owned()
}

/// Run the whole exchange as a client and return the full transcript.
pub async fn attempt_login(addr: SocketAddr, user: &str, pass: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let mut transcript = read_until(&mut stream, "login: ").await;
    stream.write_all(format!("{user}\n").as_bytes()).await.unwrap();
    transcript.push_str(&read_until(&mut stream, "password: ").await);
    stream.write_all(format!("{pass}\n").as_bytes()).await.unwrap();

    let mut rest = String::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_string(&mut rest))
        .await
        .expect("server did not close the connection")
        .unwrap();
    transcript.push_str(&rest);
    transcript
}
