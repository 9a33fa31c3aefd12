//! Logging setup
//!
//! `tracing` events go through `tracing-subscriber` with an `EnvFilter`
//! (`RUST_LOG`, default `info`). Output is JSON when stdout is not a terminal.

use std::io::{self, IsTerminal};

use tracing_subscriber::{fmt, EnvFilter};

/// Output format picked by [`default_log_mode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// One JSON object per event
    Json,
    /// Human readable, for interactive terminals
    Pretty,
}

/// Pretty when stdout is a terminal, JSON otherwise
pub fn default_log_mode() -> LogMode {
    if io::stdout().is_terminal() {
        LogMode::Pretty
    } else {
        LogMode::Json
    }
}

/// Initialize logging with `RUST_LOG` filtering (default `info`).
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_logging() {
    init_logging_with(default_log_mode());
}

pub fn init_logging_with(mode: LogMode) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match mode {
        LogMode::Json => fmt()
            .with_env_filter(filter)
            .json()
            .flatten_event(true)
            .try_init(),
        LogMode::Pretty => fmt().with_env_filter(filter).with_target(false).try_init(),
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "logging already initialised");
    }
}
