//! REST API module for HTTP endpoints
//!
//! Read-only JSON endpoints over the store's filtered view:
//! - `GET /api/stats` - Current stats snapshot
//! - `GET /api/globals?limit=N` - Newest globals first
//! - `GET /api/hofs?limit=N` - Newest Hall of Fame globals first

pub mod globals;
pub mod stats;

use axum::http::{header, HeaderName};
use serde::Deserialize;

/// Limit used when the query has none or an unusable one
pub const DEFAULT_LIMIT: usize = 10;

/// `?limit=N` query parameter
///
/// Kept as a string so that a malformed value falls back to the default
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<String>,
}

impl LimitParams {
    /// Positive integer limit, or [`DEFAULT_LIMIT`]
    pub fn normalized_limit(&self) -> usize {
        self.limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|limit| *limit > 0)
            .map_or(DEFAULT_LIMIT, |limit| limit as usize)
    }
}

/// Headers that keep dashboards from caching API responses
pub fn no_cache_headers() -> [(HeaderName, &'static str); 3] {
    [
        (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
        (header::PRAGMA, "no-cache"),
        (header::EXPIRES, "0"),
    ]
}
