//! Data types for the globals tracker
//!
//! This module contains the core data structures shared by the parser,
//! the store, the stats aggregator and the API.

mod entry;
mod stats;

pub use entry::{GlobalEntry, GlobalKind};
pub use stats::StatsSnapshot;

