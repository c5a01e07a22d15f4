use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

use crate::error::{ProcessingError, Result};

/// Parse an ISO-8601 UTC instant such as `2017-12-11T18:05:00Z` into epoch seconds.
pub fn seconds_from_utc_string(value: &str) -> Result<i64> {
    let parsed = DateTime::parse_from_rfc3339(value.trim())?;
    Ok(parsed.timestamp())
}

/// Format epoch seconds as an ISO-8601 UTC instant.
pub fn utc_string_from_seconds(seconds: i64) -> Result<String> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .ok_or_else(|| ProcessingError::InvalidFormat(format!("Epoch seconds out of range: {}", seconds)))
}

pub fn now_seconds() -> i64 {
    Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_known_instant() {
        assert_eq!(seconds_from_utc_string("2017-12-11T18:05:00Z").unwrap(), 1513015500);
        assert_eq!(utc_string_from_seconds(1513015500).unwrap(), "2017-12-11T18:05:00Z");
    }

    #[test]
    fn test_fractional_seconds_are_truncated() {
        assert_eq!(
            seconds_from_utc_string("2018-10-18T21:34:59.000Z").unwrap(),
            1539898499
        );
    }

    #[test]
    fn test_invalid_instant() {
        let result = seconds_from_utc_string("12/11/2017");
        assert!(matches!(result, Err(ProcessingError::DateParse(_))));
    }
}
