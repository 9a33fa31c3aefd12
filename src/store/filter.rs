//! Player/team filter applied at ingestion and on reads

use crate::parser::names_match;
use crate::types::GlobalEntry;

/// Optional player and team names a store is scoped to.
///
/// | player | team | accepted entries                                    |
/// |--------|------|-----------------------------------------------------|
/// | -      | -    | all                                                 |
/// | P      | -    | player entries whose name matches P                 |
/// | -      | T    | team entries whose name matches T                   |
/// | P      | T    | entries matching P **or** T                         |
///
/// Matching is case-insensitive, tolerates quoted or HTML-escaped team names,
/// and never matches an empty name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub player: Option<String>,
    pub team: Option<String>,
}

impl Filters {
    /// Build filters, treating blank names as "not set"
    pub fn new(player: Option<&str>, team: Option<&str>) -> Self {
        Self {
            player: non_blank(player),
            team: non_blank(team),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.player.is_none() && self.team.is_none()
    }

    /// Whether an entry belongs to this scope
    pub fn accepts(&self, entry: &GlobalEntry) -> bool {
        let player_match = || {
            self.player
                .as_deref()
                .is_some_and(|p| names_match(&entry.player, p))
        };
        let team_match = || {
            self.team
                .as_deref()
                .is_some_and(|t| names_match(&entry.team, t))
        };

        match (&self.player, &self.team) {
            (None, None) => true,
            (Some(_), None) => player_match(),
            (None, Some(_)) => team_match(),
            (Some(_), Some(_)) => player_match() || team_match(),
        }
    }
}

fn non_blank(name: Option<&str>) -> Option<String> {
    name.map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}
