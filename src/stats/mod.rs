//! Statistics aggregation
//!
//! Stats are recomputed from the store's filtered view on every request; a
//! single player's history is small enough that no incremental state is kept.

use crate::types::{GlobalEntry, StatsSnapshot};

/// Compute a snapshot in a single pass.
///
/// The highest value keeps the first entry that reached it; locations are
/// counted only when present, with one trailing `!` stripped.
pub fn compute_stats<'a, I>(entries: I) -> StatsSnapshot
where
    I: IntoIterator<Item = &'a GlobalEntry>,
{
    let mut stats = StatsSnapshot::default();

    for entry in entries {
        stats.total_globals += 1;
        stats.total_value += entry.value;

        if entry.is_hof {
            stats.total_hofs += 1;
        }

        if stats.total_globals == 1 || entry.value > stats.highest_value {
            stats.highest_value = entry.value;
            stats.highest_value_item = entry.target.clone();
        }

        *stats
            .by_type
            .entry(entry.kind.as_str().to_string())
            .or_insert(0) += 1;

        if !entry.location.is_empty() {
            let location = entry
                .location
                .strip_suffix('!')
                .unwrap_or(&entry.location);
            *stats.by_location.entry(location.to_string()).or_insert(0) += 1;
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GlobalKind;
    use chrono::Utc;

    fn entry(
        kind: GlobalKind,
        target: &str,
        value: f64,
        location: &str,
        is_hof: bool,
    ) -> GlobalEntry {
        let raw = format!("{target} {value}");
        let mut entry = GlobalEntry::new(Utc::now(), kind, target, value, raw);
        entry.location = location.to_string();
        entry.is_hof = is_hof;
        entry
    }

    #[test]
    fn test_empty_input() {
        let stats = compute_stats(&Vec::<GlobalEntry>::new());
        assert_eq!(stats, StatsSnapshot::default());
    }

    #[test]
    fn test_aggregates() {
        let entries = vec![
            entry(GlobalKind::Kill, "Atrox", 50.0, "Cape Corinth!", false),
            entry(GlobalKind::Kill, "Argonaut", 120.0, "Cape Corinth", true),
            entry(GlobalKind::Craft, "Opalo", 120.0, "", false),
            entry(GlobalKind::Find, "Lysterium", 30.0, "", false),
        ];

        let stats = compute_stats(&entries);
        assert_eq!(stats.total_globals, 4);
        assert_eq!(stats.total_hofs, 1);
        assert_eq!(stats.total_value, 320.0);
        assert_eq!(stats.highest_value, 120.0);
        // First entry reaching the maximum wins
        assert_eq!(stats.highest_value_item, "Argonaut");
        assert_eq!(stats.by_type["kill"], 2);
        assert_eq!(stats.by_type["craft"], 1);
        assert_eq!(stats.by_type["find"], 1);
        assert_eq!(stats.by_location.len(), 1);
        assert_eq!(stats.by_location["Cape Corinth"], 2);
    }

    #[test]
    fn test_zero_value_entry_still_names_highest() {
        let entries = vec![entry(GlobalKind::Find, "Oil", 0.0, "", false)];
        let stats = compute_stats(&entries);
        assert_eq!(stats.highest_value_item, "Oil");
    }
}
