//! Global entry types

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of event a global announces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlobalKind {
    Kill,
    Craft,
    Find,
}

impl GlobalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GlobalKind::Kill => "kill",
            GlobalKind::Craft => "craft",
            GlobalKind::Find => "find",
        }
    }
}

impl fmt::Display for GlobalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed global message.
///
/// The same shape is persisted to the store file and returned by the query
/// API, so the serde names are part of the external interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: GlobalKind,
    /// Set when the global is attributed to an individual
    #[serde(default)]
    pub player: String,
    /// Set when the global is attributed to a team
    #[serde(default)]
    pub team: String,
    pub target: String,
    pub value: f64,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub is_hof: bool,
    /// Verbatim source line, used as the deduplication key
    pub raw_message: String,
}

impl GlobalEntry {
    /// Create an entry with no attribution, location or Hall of Fame flag
    pub fn new(
        timestamp: DateTime<Utc>,
        kind: GlobalKind,
        target: impl Into<String>,
        value: f64,
        raw_message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            kind,
            player: String::new(),
            team: String::new(),
            target: target.into(),
            value,
            location: String::new(),
            is_hof: false,
            raw_message: raw_message.into(),
        }
    }

    /// Name the entry is attributed to, team first
    pub fn actor(&self) -> &str {
        if self.is_team() {
            &self.team
        } else {
            &self.player
        }
    }

    /// Credited to a team rather than a single player
    pub fn is_team(&self) -> bool {
        !self.team.is_empty()
    }
}
