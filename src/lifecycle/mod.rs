//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → Prepare credential log → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Stop flag set → Stop accepting → Drain recent handlers (drain.rs) → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Set stop flag (once)
//! ```
//!
//! # Design Decisions
//! - Stop is cooperative: in-flight handlers are never cancelled
//! - Drain is bounded per handler; stragglers are abandoned at exit

pub mod drain;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use drain::DrainReport;
pub use shutdown::{Shutdown, StopToken};
pub use startup::{start, StartupError};
