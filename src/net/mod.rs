//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, stop token)
//!     → connection.rs (connection ID, active count)
//!     → Hand off to session::ConnectionHandler on its own task
//! ```
//!
//! # Design Decisions
//! - One task per connection, unbounded
//! - Each connection tracked so shutdown can report what is still running

pub mod connection;
pub mod listener;

pub use listener::{Listener, ListenerError};
