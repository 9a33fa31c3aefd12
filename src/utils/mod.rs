//! Utility functions and helpers
//!
//! Atomic file writes and timestamp formatting.

pub mod atomic;
pub mod time;

pub use atomic::atomic_write;
pub use time::{iso8601, now_iso8601};
