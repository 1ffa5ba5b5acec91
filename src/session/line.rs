//! Line reads from an untrusted client.

use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::session::SessionError;

/// Read one line of at most `limit` bytes, waiting no longer than `idle`.
///
/// Invalid UTF-8 is replaced rather than rejected and surrounding whitespace
/// (including `\r\n`) is trimmed. A line longer than `limit` is cut at the
/// limit; the rest stays buffered for the next read. EOF before any byte is
/// [`SessionError::PeerClosed`].
pub async fn read_line<R>(reader: &mut R, limit: usize, idle: Duration) -> Result<String, SessionError>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::with_capacity(limit.min(1024));
    let mut bounded = (&mut *reader).take(limit as u64);

    let read = tokio::time::timeout(idle, bounded.read_until(b'\n', &mut buf))
        .await
        .map_err(|_| SessionError::Timeout)??;

    if read == 0 {
        return Err(SessionError::PeerClosed);
    }

    Ok(String::from_utf8_lossy(&buf).trim().to_owned())
}
