//! Name normalisation for player and team matching
//!
//! The chat log sometimes HTML-escapes quotes (`Team &quot;X&quot;`), and users
//! type team names with or without the surrounding quotes.

use std::borrow::Cow;

const ENTITIES: [(&str, &str); 5] = [
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    // Last, so `&amp;quot;` decodes to `&quot;` and not to `"`
    ("&amp;", "&"),
];

/// Decode the handful of HTML entities the game client emits
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut decoded = text.to_string();
    for (entity, replacement) in ENTITIES {
        if decoded.contains(entity) {
            decoded = decoded.replace(entity, replacement);
        }
    }
    Cow::Owned(decoded)
}

/// Canonical form used for comparisons: decoded, trimmed, unquoted, lowercase
pub fn normalize_name(name: &str) -> String {
    let decoded = decode_entities(name);
    let trimmed = decoded.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    unquoted.trim().to_lowercase()
}

/// Case-insensitive match of an entry's actor name against a configured filter.
///
/// An empty name on either side never matches.
pub fn names_match(actual: &str, wanted: &str) -> bool {
    let actual = normalize_name(actual);
    let wanted = normalize_name(wanted);
    !actual.is_empty() && !wanted.is_empty() && actual == wanted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_entities() {
        assert_eq!(
            decode_entities("Team &quot;***DeagleTeam***&quot;"),
            "Team \"***DeagleTeam***\""
        );
        assert_eq!(decode_entities("plain text"), "plain text");
        assert_eq!(decode_entities("&amp;quot;"), "&quot;");
    }

    #[test]
    fn test_team_names_match() {
        let cases = [
            ("DeagleTeam", "DeagleTeam", true),
            ("\"DeagleTeam\"", "DeagleTeam", true),
            ("DeagleTeam", "\"DeagleTeam\"", true),
            ("\"DeagleTeam\"", "\"DeagleTeam\"", true),
            ("DeagleTeam", "deagleteam", true),
            ("&quot;***DeagleTeam***&quot;", "***DeagleTeam***", true),
            ("TeamB", "TeamA", false),
            ("DeagleTeam", "", false),
            ("", "DeagleTeam", false),
        ];

        for (entry, config, expected) in cases {
            assert_eq!(
                names_match(entry, config),
                expected,
                "names_match({entry:?}, {config:?})"
            );
        }
    }
}
