//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Listener and handlers produce:
//!     → logging.rs (structured events → stderr + event log file)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → honeypot.log (`<timestamp> | <LEVEL> | <message>`)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Connection ID flows through every handler event
//! - Passwords go to the credential log only, never to the event log

pub mod logging;
pub mod metrics;
