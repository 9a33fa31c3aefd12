//! Error types
//!
//! Each concern has its own error enum; `GlobalsError` collects them for
//! callers that drive several concerns at once (the binary, the watcher).

use std::io;
use std::path::PathBuf;

/// A line carried the `[Globals]` marker but could not be turned into a record.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid timestamp `{0}`")]
    MalformedTimestamp(String),
}

/// Failure while reading the chat log. Aborts the current pass only.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("chat log not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to open chat log {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("failed to stat chat log {}: {source}", .path.display())]
    Stat { path: PathBuf, source: io::Error },

    #[error("failed to seek chat log to offset {offset}: {source}")]
    Seek { offset: u64, source: io::Error },

    #[error("error reading chat log: {0}")]
    Read(#[source] io::Error),
}

/// Failure while loading or saving the persisted store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("store file is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Invalid or incomplete configuration. Surfaced before any processing starts.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("missing required setting `{0}`")]
    MissingField(&'static str),

    #[error("invalid value for `{field}`: {message}")]
    InvalidValue { field: &'static str, message: String },
}

/// A live subscriber could not be written to. Only used to prune it.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("send failed: {0}")]
    Send(String),

    #[error("connection closed")]
    Closed,
}

/// Failure from the screenshot collaborator.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("screenshots are not supported on this platform")]
    Unsupported,

    #[error("screenshots are disabled")]
    Disabled,

    #[error("screenshot already taken recently")]
    RateLimited,

    #[error("screenshot failed: {0}")]
    Failed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum GlobalsError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result type for crate-level operations
pub type GlobalsResult<T> = Result<T, GlobalsError>;
