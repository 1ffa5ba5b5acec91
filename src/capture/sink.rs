//! Credential sinks.
//!
//! # Design Decisions
//! - One record is one `write_all` of a complete line, under a lock, so
//!   concurrent handlers never interleave partial lines
//! - The file is opened in append mode per record, which tolerates external
//!   rotation and matches `O_APPEND` semantics across processes
//! - Failures are returned, not logged; the handler decides that a lost
//!   record is acceptable

use std::future::Future;
use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::capture::credential::CapturedCredential;

/// Error type for sink operations.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to prepare {path}: {source}")]
    Prepare {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to append to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Append-only destination for captured credentials.
pub trait CredentialSink: Send + Sync {
    /// Append one record atomically.
    fn append(
        &self,
        credential: &CapturedCredential,
    ) -> impl Future<Output = Result<(), SinkError>> + Send;
}

/// Appends credential lines to a file on disk.
#[derive(Debug)]
pub struct FileCredentialSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCredentialSink {
    /// Create the sink, making sure the parent directory exists.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let path = path.into();
        ensure_parent(&path).await.map_err(|source| SinkError::Prepare {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "Credential log ready");
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write_line(&self, line: &[u8]) -> std::io::Result<()> {
        let _guard = self.write_lock.lock().await;
        // The directory may have been removed since startup.
        ensure_parent(&self.path).await?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line).await?;
        file.flush().await
    }
}

impl CredentialSink for FileCredentialSink {
    async fn append(&self, credential: &CapturedCredential) -> Result<(), SinkError> {
        let line = credential.to_log_line();
        self.write_line(line.as_bytes())
            .await
            .map_err(|source| SinkError::Write {
                path: self.path.clone(),
                source,
            })
    }
}

async fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent).await,
        _ => Ok(()),
    }
}
