//! Credential capture subsystem.
//!
//! # Data Flow
//! ```text
//! session handler (username + password received)
//!     → credential.rs (CapturedCredential, UTC second precision)
//!     → sink.rs (append one line per record)
//!     → honeypot_creds.log
//! ```

pub mod credential;
pub mod sink;

pub use credential::CapturedCredential;
pub use sink::{CredentialSink, FileCredentialSink, SinkError};
