//! Scripted login exchange.
//!
//! # Data Flow
//! ```text
//! accepted TcpStream
//!     → handler.rs (banner, prompts, rejection)
//!     → line.rs (bounded, timed, lossy line reads)
//!     → capture::CredentialSink (one record per completed exchange)
//! ```
//!
//! # Wire transcript
//! ```text
//! S: <banner>\nlogin:␠
//! C: <username>\n
//! S: password:␠
//! C: <password>\n
//! S: Login incorrect\n
//! S: <close>
//! ```

pub mod handler;
pub mod line;

pub use handler::ConnectionHandler;

use std::fmt;
use std::io;

pub const LOGIN_PROMPT: &str = "login: ";
pub const PASSWORD_PROMPT: &str = "password: ";
pub const REJECTION: &str = "Login incorrect\n";

/// Position of a session in the scripted exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    BannerSent,
    AwaitUsername,
    PasswordPromptSent,
    AwaitPassword,
    CredentialLogged,
    Rejected,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Connected => "connected",
            SessionState::BannerSent => "banner_sent",
            SessionState::AwaitUsername => "await_username",
            SessionState::PasswordPromptSent => "password_prompt_sent",
            SessionState::AwaitPassword => "await_password",
            SessionState::CredentialLogged => "credential_logged",
            SessionState::Rejected => "rejected",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Why an exchange stopped before the rejection was sent.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("client idle timeout")]
    Timeout,
    #[error("connection closed by peer")]
    PeerClosed,
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl SessionError {
    /// Reset, abort, broken pipe and EOF all mean the client went away.
    pub fn is_disconnect(&self) -> bool {
        match self {
            SessionError::Timeout => false,
            SessionError::PeerClosed => true,
            SessionError::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::NotConnected
            ),
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Full exchange: credential handed to the sink and rejection sent.
    Rejected,
    TimedOut,
    Disconnected,
    Failed,
}

impl SessionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionOutcome::Rejected => "rejected",
            SessionOutcome::TimedOut => "timed_out",
            SessionOutcome::Disconnected => "disconnected",
            SessionOutcome::Failed => "failed",
        }
    }
}
