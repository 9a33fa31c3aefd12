//! Time helpers

use chrono::{DateTime, SecondsFormat, Utc};

/// ISO-8601 UTC with second precision, e.g. `2025-05-16T10:00:00Z`
pub fn iso8601(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current time formatted with [`iso8601`]
pub fn now_iso8601() -> String {
    iso8601(Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_iso8601_uses_z_suffix() {
        let time = Utc.with_ymd_and_hms(2025, 5, 16, 10, 0, 0).unwrap();
        assert_eq!(iso8601(time), "2025-05-16T10:00:00Z");
    }
}
