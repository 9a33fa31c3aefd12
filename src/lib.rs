//! Globals Watch
//!
//! Tails an Entropia Universe chat log, records the globals and Hall of Fame
//! entries it announces, and serves stats plus a live feed to dashboards.
//!
//! # Features
//!
//! - **Resumable ingestion**: byte offsets survive restarts, rotated logs are rescanned
//! - **Player/team scope**: only the configured player's or team's globals are kept
//! - **Live feed**: WebSocket fan-out of new globals and stats updates
//! - **Query API**: stats, newest globals and Hall of Fame entries as JSON
//!
//! # Modules
//!
//! - `types`: Core data structures (GlobalEntry, StatsSnapshot)
//! - `parser`: Chat log line parser
//! - `store`: Record store, filters and persistence
//! - `processor`: Incremental processor, watch loop and new-record handling
//! - `stats`: Stats aggregation
//! - `capture`: Screenshot manager
//! - `config`: YAML configuration with environment overrides
//! - `api`: HTTP query API and WebSocket live feed
//! - `utils`: Atomic writes and timestamps
//!
//! # Example
//!
//! ```no_run
//! use globals_watch::{GlobalStore, LogProcessor};
//!
//! let store = GlobalStore::new(Some("John Doe"), None).into_shared();
//! let processor = LogProcessor::new(store.clone());
//! processor.process_full("chat.log").unwrap();
//! println!("{}", store.read().stats().format_report("John Doe", ""));
//! ```

pub mod api;
pub mod capture;
pub mod config;
pub mod error;
pub mod logging;
pub mod parser;
pub mod processor;
pub mod stats;
pub mod store;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use api::{BroadcastHub, HubRegistry, LiveEvent};
pub use config::Config;
pub use error::{GlobalsError, GlobalsResult};
pub use parser::{parse_line, LineParser};
pub use processor::{LogProcessor, NewRecordHandler, WatchState, Watcher};
pub use stats::compute_stats;
pub use store::{Filters, GlobalStore, SharedStore};
pub use types::{GlobalEntry, GlobalKind, StatsSnapshot};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
