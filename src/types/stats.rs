//! Summary statistics over a set of globals

use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Derived statistics, recomputed on every request.
///
/// Field names follow the dashboard's expectations (`TotalGlobals`, `ByType`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatsSnapshot {
    pub total_globals: usize,
    pub total_hofs: usize,
    pub highest_value: f64,
    pub highest_value_item: String,
    pub total_value: f64,
    pub by_type: HashMap<String, usize>,
    pub by_location: HashMap<String, usize>,
}

impl StatsSnapshot {
    /// Render a plain-text report for terminal output
    pub fn format_report(&self, player: &str, team: &str) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Statistics for player: {}", player);
        if !team.is_empty() {
            let _ = writeln!(out, "Team: {}", team);
        }
        let _ = writeln!(out, "Generated: {}\n", Local::now().format("%Y-%m-%d %H:%M:%S"));

        let _ = writeln!(out, "Total globals: {}", self.total_globals);
        let _ = writeln!(out, "Total HoFs: {}", self.total_hofs);
        let _ = writeln!(out, "Total PED value: {:.2}", self.total_value);

        if self.highest_value > 0.0 {
            let _ = writeln!(
                out,
                "Highest value: {:.2} PED ({})\n",
                self.highest_value, self.highest_value_item
            );
        }

        if !self.by_type.is_empty() {
            out.push_str("Globals by type:\n");
            let mut kinds: Vec<_> = self.by_type.iter().collect();
            kinds.sort();
            for (kind, count) in kinds {
                let _ = writeln!(out, "  {}: {}", capitalize(kind), count);
            }
            out.push('\n');
        }

        if !self.by_location.is_empty() {
            out.push_str("Globals by location:\n");
            let mut locations: Vec<_> = self.by_location.iter().collect();
            // Most visited first, name breaks ties so the output is stable
            locations.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            for (location, count) in locations {
                let _ = writeln!(out, "  {}: {}", location, count);
            }
        }

        out
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
