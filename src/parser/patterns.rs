//! Compiled message shapes for `[Globals]` lines
//!
//! Every shape starts after the `[Globals] []` channel prefix. Player names are
//! one to four whitespace separated tokens; team names are quoted.

use regex::Regex;

/// Substring every global line carries
pub const GLOBALS_MARKER: &str = "[Globals]";

/// Phrase the game appends when a global also enters the Hall of Fame
pub const HOF_MARKER: &str = "added to the Hall of Fame";

const PREFIX: &str = r#"\[\s*Globals\s*\]\s*\[\s*\]\s*"#;
const PLAYER: &str = r#"([^\s]+(?:\s+[^\s]+){0,3})"#;
const TEAM: &str = r#"Team\s*"([^"]+)""#;
const LOCATION: &str = r#"(?:\s+at\s+([^!]+))?"#;

/// The ordered set of shapes a line is tried against
pub struct Patterns {
    pub team_kill: Regex,
    pub player_kill: Regex,
    pub craft: Regex,
    pub find: Regex,
}

impl Patterns {
    pub fn compile() -> Self {
        Self {
            team_kill: build(&format!(
                r#"{PREFIX}{TEAM}\s*killed\s*a\s*creature\s*\(([^)]+)\)\s*with\s*a\s*value\s*of\s*(\d+)\s*PED{LOCATION}"#
            )),
            player_kill: build(&format!(
                r#"{PREFIX}{PLAYER}\s*(?:as|has|have)?\s*killed\s*a\s*creature\s*\(([^)]+)\)\s*with\s*a\s*value\s*of\s*(\d+)\s*PED{LOCATION}"#
            )),
            craft: build(&format!(
                r#"{PREFIX}{PLAYER}\s*constructed\s*an\s*item\s*\(([^)]+)\)\s*worth\s*(\d+)\s*PED"#
            )),
            find: build(&format!(
                r#"{PREFIX}(?:{TEAM}|{PLAYER})\s*found\s*a\s*deposit\s*\(([^)]+)\)\s*with\s*a\s*value\s*of\s*(\d+)\s*PED"#
            )),
        }
    }
}

// Patterns are fixed at compile time; a failure here is a programming error
// and is caught by the parser unit tests.
fn build(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in globals pattern must compile")
}
