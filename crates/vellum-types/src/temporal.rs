use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::error::TypeError;

/// Point in time at which a version was created or updated.
pub type Timestamp = DateTime<Utc>;

/// Normalize a date string to a canonical UTC instant.
///
/// Accepts RFC 3339 timestamps with any offset (`2024-03-01T10:00:00+02:00`)
/// and bare calendar dates (`2024-03-01`, taken as midnight UTC). Two strings
/// naming the same instant normalize to equal values.
pub fn parse_instant(raw: &str) -> Result<Timestamp, TypeError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| TypeError::InvalidTimestamp(raw.to_string()))
}

/// Read an instant from a JSON value: a date string or epoch milliseconds.
pub fn instant_from_value(value: &Value) -> Option<Timestamp> {
    match value {
        Value::String(s) => parse_instant(s).ok(),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn offsets_normalize_to_same_instant() {
        let a = parse_instant("2024-03-01T10:00:00+02:00").unwrap();
        let b = parse_instant("2024-03-01T08:00:00Z").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn bare_date_is_midnight_utc() {
        let a = parse_instant("2024-03-01").unwrap();
        let b = parse_instant("2024-03-01T00:00:00.000Z").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            parse_instant("yesterday"),
            Err(TypeError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn epoch_millis_value() {
        let from_ms = instant_from_value(&json!(1_709_280_000_000_i64)).unwrap();
        let from_str = instant_from_value(&json!("2024-03-01T08:00:00Z")).unwrap();
        assert_eq!(from_ms, from_str);
        assert!(instant_from_value(&json!(true)).is_none());
    }
}
