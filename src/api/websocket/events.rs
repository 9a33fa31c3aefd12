//! Live feed event types

use serde::Serialize;
use serde_json::Value;

use crate::types::{GlobalEntry, StatsSnapshot};
use crate::utils::now_iso8601;

/// Events pushed to live subscribers
#[derive(Clone, Debug, PartialEq)]
pub enum LiveEvent {
    /// A regular global was ingested
    NewGlobal(GlobalEntry),
    /// A Hall of Fame global was ingested
    NewHof(GlobalEntry),
    /// Stats changed
    StatsUpdate(StatsSnapshot),
}

impl LiveEvent {
    /// `new_hof` or `new_global` depending on the entry's flag
    pub fn for_entry(entry: GlobalEntry) -> Self {
        if entry.is_hof {
            LiveEvent::NewHof(entry)
        } else {
            LiveEvent::NewGlobal(entry)
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            LiveEvent::NewGlobal(_) => "new_global",
            LiveEvent::NewHof(_) => "new_hof",
            LiveEvent::StatsUpdate(_) => "stats_update",
        }
    }

    /// Wrap the event into the wire envelope, stamped with the current time
    pub fn envelope(&self) -> Result<Envelope, serde_json::Error> {
        let data = match self {
            LiveEvent::NewGlobal(entry) | LiveEvent::NewHof(entry) => serde_json::to_value(entry)?,
            LiveEvent::StatsUpdate(stats) => serde_json::to_value(stats)?,
        };
        Ok(Envelope {
            event_type: self.event_type(),
            data,
            time: now_iso8601(),
        })
    }
}

/// `{"type": ..., "data": ..., "time": ...}` as sent on the wire
#[derive(Clone, Debug, Serialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub event_type: &'static str,
    pub data: Value,
    pub time: String,
}
