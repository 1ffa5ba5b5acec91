//! Low-interaction login honeypot library.

pub mod capture;
pub mod config;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod session;

pub use config::schema::HoneypotConfig;
pub use lifecycle::Shutdown;
pub use net::Listener;
