//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem (console + event log file)
//! - Render every event as `<timestamp> | <LEVEL> | <message fields>`
//! - Configure log level from config, overridable via `RUST_LOG`
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Each event is formatted in full before a single write to the file, and
//!   the file writer sits behind a mutex, so lines never interleave

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Error type for logging setup.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("cannot open event log {path}: {source}")]
    EventLog {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("logging already initialized: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Line format shared by the console and the event log.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventLineFormat;

impl<S, N> FormatEvent<S, N> for EventLineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "{} | {} | ",
            Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
            event.metadata().level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Install the global subscriber: stderr plus an append-only event log file.
pub fn init_logging(config: &ObservabilityConfig, event_log_path: &Path) -> Result<(), LoggingError> {
    let file = open_event_log(event_log_path).map_err(|source| LoggingError::EventLog {
        path: event_log_path.display().to_string(),
        source,
    })?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(EventLineFormat)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(EventLineFormat)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()?;

    Ok(())
}

fn open_event_log(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
