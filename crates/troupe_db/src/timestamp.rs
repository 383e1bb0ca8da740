//! Timestamp normalization for record fields arriving as strings.
//!
//! API payloads deliver `created_at`/`updated_at` as ISO-8601 strings,
//! frequently with a trailing `Z` zone marker. The marker is rewritten to
//! an explicit `+00:00` offset before parsing; naive datetimes are
//! assumed to be UTC. Already-parsed values never pass through here.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{DbError, DbResult};

/// Parse an ISO-8601 timestamp string into an offset-aware UTC datetime.
///
/// Accepts `2024-01-01T00:00:00Z`, `2024-01-01T00:00:00+00:00` (or any
/// other explicit offset, converted to UTC), and naive
/// `2024-01-01T00:00:00`. Anything else fails with
/// [`DbError::InvalidData`].
pub fn parse_timestamp(value: &str) -> DbResult<DateTime<Utc>> {
    let normalized = if let Some(stripped) = value.strip_suffix('Z') {
        format!("{stripped}+00:00")
    } else {
        value.to_string()
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&normalized) {
        return Ok(parsed.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }

    Err(DbError::invalid_data(format!(
        "not an ISO-8601 timestamp: {value}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zulu_suffix_equals_explicit_offset() {
        let zulu = parse_timestamp("2024-01-01T00:00:00Z").unwrap();
        let offset = parse_timestamp("2024-01-01T00:00:00+00:00").unwrap();
        assert_eq!(zulu, offset);
    }

    #[test]
    fn non_utc_offset_is_converted() {
        let parsed = parse_timestamp("2024-01-01T02:30:00+02:30").unwrap();
        assert_eq!(parsed, parse_timestamp("2024-01-01T00:00:00Z").unwrap());
    }

    #[test]
    fn naive_datetime_is_assumed_utc() {
        let naive = parse_timestamp("2024-01-01T00:00:00").unwrap();
        assert_eq!(naive, parse_timestamp("2024-01-01T00:00:00Z").unwrap());
    }

    #[test]
    fn fractional_seconds_survive() {
        let parsed = parse_timestamp("2024-06-15T12:00:00.250Z").unwrap();
        assert_eq!(parsed.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn garbage_is_rejected() {
        let err = parse_timestamp("yesterday-ish").unwrap_err();
        assert!(matches!(err, DbError::InvalidData { .. }));
    }
}
