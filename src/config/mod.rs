//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → loader.rs (optional TOML file)
//!     → cli.rs (command-line overrides)
//!     → validation.rs (semantic checks)
//!     → HoneypotConfig (validated, immutable)
//!     → shared via Arc to the listener and every handler
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod cli;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cli::CliArgs;
pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    HoneypotConfig, ListenerConfig, ObservabilityConfig, SessionConfig, ShutdownConfig,
    StorageConfig,
};
