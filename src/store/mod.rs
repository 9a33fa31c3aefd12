//! Globals store - in-memory record collection persisted after each pass
//!
//! Records keep insertion order. The filtered view (records matching the
//! store's player/team scope) is computed on demand and never stored.
//!
//! The store itself is not synchronised; processes share it as a
//! [`SharedStore`] so the processor's writes and the API's reads are
//! serialised by a read/write lock.

mod filter;
mod persist;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::stats::compute_stats;
use crate::types::{GlobalEntry, GlobalKind, StatsSnapshot};

pub use filter::Filters;

/// Store shared between the watcher and the API handlers
pub type SharedStore = Arc<RwLock<GlobalStore>>;

/// Ordered collection of globals plus filter and progress bookkeeping
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalStore {
    #[serde(default)]
    globals: Vec<GlobalEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    player_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    team_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_processed: Option<DateTime<Utc>>,
    /// Byte offset the next pass resumes from; 0 means "never scanned"
    #[serde(default)]
    last_processed_size: u64,
}

impl GlobalStore {
    /// Create an empty store scoped to the given player/team
    pub fn new(player: Option<&str>, team: Option<&str>) -> Self {
        let mut store = Self::default();
        store.set_filters(Filters::new(player, team));
        store
    }

    /// Wrap the store for sharing between tasks
    pub fn into_shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    pub fn filters(&self) -> Filters {
        Filters::new(self.player_name.as_deref(), self.team_name.as_deref())
    }

    pub fn set_filters(&mut self, filters: Filters) {
        self.player_name = filters.player;
        self.team_name = filters.team;
    }

    pub fn len(&self) -> usize {
        self.globals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.globals.is_empty()
    }

    /// All records in insertion order, unfiltered
    pub fn entries(&self) -> &[GlobalEntry] {
        &self.globals
    }

    pub fn last_processed_offset(&self) -> u64 {
        self.last_processed_size
    }

    pub fn last_processed_at(&self) -> Option<DateTime<Utc>> {
        self.last_processed
    }

    /// True until the first pass completes over a non-empty file
    pub fn is_never_scanned(&self) -> bool {
        self.last_processed_size == 0
    }

    /// Record that a pass consumed the file up to `offset`
    pub fn mark_processed(&mut self, offset: u64) {
        self.last_processed_size = offset;
        self.last_processed = Some(Utc::now());
    }

    /// Add a record unconditionally
    pub fn append(&mut self, entry: GlobalEntry) {
        self.globals.push(entry);
    }

    /// Add every record whose raw message is not already present.
    ///
    /// Returns the number of records added.
    pub fn merge(&mut self, other: &GlobalStore) -> usize {
        self.insert_unique(other.globals.iter().cloned()).len()
    }

    /// Add records, skipping any whose raw message is already stored.
    ///
    /// Returns the records that were actually added.
    pub fn insert_unique<I>(&mut self, entries: I) -> Vec<GlobalEntry>
    where
        I: IntoIterator<Item = GlobalEntry>,
    {
        let mut seen: HashSet<String> = self
            .globals
            .iter()
            .map(|entry| entry.raw_message.clone())
            .collect();

        let mut added = Vec::new();
        for entry in entries {
            if seen.insert(entry.raw_message.clone()) {
                added.push(entry.clone());
                self.globals.push(entry);
            }
        }
        added
    }

    /// Records matching the store's player/team scope, in insertion order
    pub fn filtered_view(&self) -> Vec<&GlobalEntry> {
        let filters = self.filters();
        self.globals.iter().filter(|e| filters.accepts(e)).collect()
    }

    /// Newest `limit` records of the filtered view
    pub fn newest_first(&self, limit: usize) -> Vec<GlobalEntry> {
        newest(self.filtered_view(), limit)
    }

    /// Newest `limit` Hall of Fame records of the filtered view
    pub fn hofs_newest_first(&self, limit: usize) -> Vec<GlobalEntry> {
        let hofs = self.filtered_view().into_iter().filter(|e| e.is_hof).collect();
        newest(hofs, limit)
    }

    /// Every Hall of Fame record regardless of scope, newest first
    pub fn hof_entries(&self) -> Vec<GlobalEntry> {
        let hofs: Vec<&GlobalEntry> = self.globals.iter().filter(|e| e.is_hof).collect();
        let len = hofs.len();
        newest(hofs, len)
    }

    pub fn entries_by_kind(&self, kind: GlobalKind) -> Vec<&GlobalEntry> {
        self.globals.iter().filter(|e| e.kind == kind).collect()
    }

    /// Records whose player name contains `name`, case-insensitively
    pub fn entries_by_player(&self, name: &str) -> Vec<&GlobalEntry> {
        let needle = name.to_lowercase();
        self.globals
            .iter()
            .filter(|e| e.player.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn entries_by_min_value(&self, min_value: f64) -> Vec<&GlobalEntry> {
        self.globals.iter().filter(|e| e.value >= min_value).collect()
    }

    /// Set the location of the record with the given raw message.
    ///
    /// Returns false when no such record exists or the location is unchanged.
    pub fn update_location(&mut self, raw_message: &str, location: &str) -> bool {
        match self
            .globals
            .iter_mut()
            .find(|e| e.raw_message == raw_message)
        {
            Some(entry) if entry.location != location => {
                entry.location = location.to_string();
                true
            }
            _ => false,
        }
    }

    /// Statistics over the filtered view
    pub fn stats(&self) -> StatsSnapshot {
        compute_stats(self.filtered_view())
    }
}

/// Sort newest first; among equal timestamps the later insertion comes first
fn newest(entries: Vec<&GlobalEntry>, limit: usize) -> Vec<GlobalEntry> {
    let mut entries: Vec<&GlobalEntry> = entries.into_iter().rev().collect();
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    entries.into_iter().take(limit).cloned().collect()
}
