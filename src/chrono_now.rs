//! Small wall-clock helpers shared by the channel scheduler's HTTP
//! surface (spec §4.10 "elapsed_since_channel_start = now - channel.created_at").

use chrono::{DateTime, Utc};

pub fn now_unix() -> i64 {
    Utc::now().timestamp()
}

pub fn parse_rfc3339_unix(s: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_timestamp() {
        assert!(parse_rfc3339_unix("2024-01-01T00:00:00Z").is_some());
        assert!(parse_rfc3339_unix("not a date").is_none());
    }
}
