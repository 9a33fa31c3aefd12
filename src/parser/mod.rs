//! Chat log line parser
//!
//! Turns one raw chat log line into zero or one [`GlobalEntry`]:
//!
//! 1. Lines without the `[Globals]` marker are ignored.
//! 2. The two leading tokens must form a `YYYY-MM-DD HH:MM:SS` timestamp.
//! 3. Shapes are tried in order: team kill, player kill, craft, find.
//! 4. The Hall of Fame flag is set from the whole line, whichever shape matched.

mod names;
mod patterns;

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Captures;

use crate::error::ParseError;
use crate::types::{GlobalEntry, GlobalKind};

pub use names::{decode_entities, names_match, normalize_name};
pub use patterns::{GLOBALS_MARKER, HOF_MARKER};

use patterns::Patterns;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static DEFAULT_PARSER: LazyLock<LineParser> = LazyLock::new(LineParser::new);

/// Parse a line with the shared, lazily compiled parser
pub fn parse_line(line: &str) -> Result<Option<GlobalEntry>, ParseError> {
    DEFAULT_PARSER.parse(line)
}

/// Line parser holding the compiled message shapes
pub struct LineParser {
    patterns: Patterns,
}

impl LineParser {
    pub fn new() -> Self {
        Self {
            patterns: Patterns::compile(),
        }
    }

    /// Parse a single chat log line.
    ///
    /// Returns `Ok(None)` for lines that are not globals or whose shape is not
    /// recognised, and `Err` only when a `[Globals]` line has a broken timestamp.
    pub fn parse(&self, line: &str) -> Result<Option<GlobalEntry>, ParseError> {
        if !line.contains(GLOBALS_MARKER) {
            return Ok(None);
        }

        let timestamp = parse_timestamp(line)?;
        let text = decode_entities(line);

        let Some(mut entry) = self.match_shape(&text, timestamp, line) else {
            return Ok(None);
        };

        entry.is_hof = line.contains(HOF_MARKER);
        Ok(Some(entry))
    }

    fn match_shape(
        &self,
        text: &str,
        timestamp: DateTime<Utc>,
        raw: &str,
    ) -> Option<GlobalEntry> {
        let p = &self.patterns;

        if let Some(caps) = p.team_kill.captures(text) {
            let mut entry = GlobalEntry::new(
                timestamp,
                GlobalKind::Kill,
                group(&caps, 2),
                value(&caps, 3),
                raw,
            );
            entry.team = group(&caps, 1).to_string();
            entry.location = location(&caps, 4);
            return Some(entry);
        }

        if let Some(caps) = p.player_kill.captures(text) {
            let mut entry = GlobalEntry::new(
                timestamp,
                GlobalKind::Kill,
                group(&caps, 2),
                value(&caps, 3),
                raw,
            );
            entry.player = group(&caps, 1).to_string();
            entry.location = location(&caps, 4);
            return Some(entry);
        }

        if let Some(caps) = p.craft.captures(text) {
            let mut entry = GlobalEntry::new(
                timestamp,
                GlobalKind::Craft,
                group(&caps, 2),
                value(&caps, 3),
                raw,
            );
            entry.player = group(&caps, 1).to_string();
            return Some(entry);
        }

        if let Some(caps) = p.find.captures(text) {
            let mut entry = GlobalEntry::new(
                timestamp,
                GlobalKind::Find,
                group(&caps, 3),
                value(&caps, 4),
                raw,
            );
            match caps.get(1) {
                Some(team) => entry.team = team.as_str().to_string(),
                None => entry.player = group(&caps, 2).to_string(),
            }
            return Some(entry);
        }

        None
    }
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_timestamp(line: &str) -> Result<DateTime<Utc>, ParseError> {
    let mut tokens = line.split_whitespace();
    let (Some(date), Some(time)) = (tokens.next(), tokens.next()) else {
        return Err(ParseError::MalformedTimestamp(line.to_string()));
    };

    let stamp = format!("{} {}", date, time);
    NaiveDateTime::parse_from_str(&stamp, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| ParseError::MalformedTimestamp(stamp))
}

fn group<'t>(caps: &Captures<'t>, index: usize) -> &'t str {
    caps.get(index).map(|m| m.as_str().trim()).unwrap_or("")
}

fn value(caps: &Captures<'_>, index: usize) -> f64 {
    group(caps, index).parse().unwrap_or(0.0)
}

fn location(caps: &Captures<'_>, index: usize) -> String {
    group(caps, index).trim_end_matches('!').trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEAM_KILL: &str = "2025-05-16 10:00:00 [Globals] [] Team \"Test Team\" killed a creature (Test Beast) with a value of 100 PED";
    const HOF_SUFFIX: &str = " A record has been added to the Hall of Fame!";

    fn parse_ok(line: &str) -> GlobalEntry {
        parse_line(line)
            .expect("line should parse")
            .expect("line should produce an entry")
    }

    #[test]
    fn test_team_kill() {
        let entry = parse_ok(TEAM_KILL);
        assert_eq!(entry.kind, GlobalKind::Kill);
        assert_eq!(entry.team, "Test Team");
        assert_eq!(entry.player, "");
        assert_eq!(entry.target, "Test Beast");
        assert_eq!(entry.value, 100.0);
        assert!(!entry.is_hof);
        assert_eq!(entry.raw_message, TEAM_KILL);
        assert_eq!(entry.timestamp.to_rfc3339(), "2025-05-16T10:00:00+00:00");
    }

    #[test]
    fn test_hof_suffix_only_flips_flag() {
        let plain = parse_ok(TEAM_KILL);
        let line = format!("{}!{}", TEAM_KILL, HOF_SUFFIX);
        let hof = parse_ok(&line);

        assert!(hof.is_hof);
        assert_eq!(hof.kind, plain.kind);
        assert_eq!(hof.team, plain.team);
        assert_eq!(hof.target, plain.target);
        assert_eq!(hof.value, plain.value);
        assert_eq!(hof.location, plain.location);
    }

    #[test]
    fn test_player_kill_with_location() {
        let entry = parse_ok(
            "2025-05-16 10:01:00 [Globals] [] Test Player killed a creature (Atrox Young) with a value of 52 PED at Cape Corinth!",
        );
        assert_eq!(entry.kind, GlobalKind::Kill);
        assert_eq!(entry.player, "Test Player");
        assert_eq!(entry.team, "");
        assert_eq!(entry.location, "Cape Corinth");
        assert_eq!(entry.value, 52.0);
    }

    #[test]
    fn test_target_with_comma() {
        let entry = parse_ok(
            "2025-05-06 15:15:45 [Globals] [] Test Player killed a creature (Lairkeeper, Brood of Unruly) with a value of 119 PED! A record has been added to the Hall of Fame!",
        );
        assert_eq!(entry.player, "Test Player");
        assert_eq!(entry.target, "Lairkeeper, Brood of Unruly");
        assert_eq!(entry.value, 119.0);
        assert!(entry.is_hof);
    }

    #[test]
    fn test_craft() {
        let entry = parse_ok(
            "2025-05-16 10:05:00 [Globals] [] Test Player constructed an item (Test Item) worth 200 PED!",
        );
        assert_eq!(entry.kind, GlobalKind::Craft);
        assert_eq!(entry.player, "Test Player");
        assert_eq!(entry.target, "Test Item");
        assert_eq!(entry.value, 200.0);
        assert!(!entry.is_hof);
    }

    #[test]
    fn test_find_team_and_player() {
        let team = parse_ok(
            "2025-05-16 10:02:00 [Globals] [] Team \"Test Team\" found a deposit (Test Material) with a value of 75 PED",
        );
        assert_eq!(team.kind, GlobalKind::Find);
        assert_eq!(team.team, "Test Team");
        assert_eq!(team.player, "");
        assert_eq!(team.target, "Test Material");

        let player = parse_ok(
            "2025-05-16 10:03:00 [Globals] [] Jane Roe found a deposit (Lysterium Stone) with a value of 81 PED!",
        );
        assert_eq!(player.kind, GlobalKind::Find);
        assert_eq!(player.player, "Jane Roe");
        assert_eq!(player.team, "");
        assert_eq!(player.value, 81.0);
    }

    #[test]
    fn test_html_escaped_team() {
        let line = "2025-06-27 18:09:18 [Globals] [] Team &quot;***DeagleTeam***&quot; killed a creature (Eomon Old Alpha) with a value of 268 PED at OLA#63!";
        let entry = parse_ok(line);
        assert_eq!(entry.team, "***DeagleTeam***");
        assert_eq!(entry.location, "OLA#63");
        assert_eq!(entry.raw_message, line);
    }

    #[test]
    fn test_hof_marker_in_unrelated_text() {
        let line = format!("{} - nothing was added to the Hall of Fame today", TEAM_KILL);
        assert!(parse_ok(&line).is_hof);
    }

    #[test]
    fn test_not_a_global() {
        let result = parse_line("2025-05-16 10:01:00 [Chat] Test Player: Hello world").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_unknown_global_shape() {
        let result =
            parse_line("2025-05-16 10:01:00 [Globals] [] Someone did something unusual").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_malformed_timestamp() {
        let result = parse_line(
            "Invalid-Date [Globals] [] Test Player killed a creature (Test Beast) with a value of 50 PED",
        );
        assert!(matches!(result, Err(ParseError::MalformedTimestamp(_))));
    }
}
