use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};

/// Separator between fields of the signed message.
pub const FIELD_SEPARATOR: char = '|';

/// Formats an instant the one way both signer and verifier agree on:
/// RFC 3339, millisecond precision, `Z` designator.
///
/// Any change here changes every signature, so nothing else in the crate
/// formats timestamps.
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("parsing timestamp {value:?}"))?;
    Ok(parsed.with_timezone(&Utc))
}

/// The exact bytes that get signed: `userId|activityId|timestamp`.
pub fn canonical_message(user_id: &str, activity_id: &str, timestamp: &str) -> String {
    format!("{user_id}{FIELD_SEPARATOR}{activity_id}{FIELD_SEPARATOR}{timestamp}")
}

/// `#[serde(with = "canonical::timestamp_serde")]` for `DateTime<Utc>` fields
/// that must render in the canonical format.
pub mod timestamp_serde {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(|e| D::Error::custom(format!("{e:#}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_with_millis_and_zulu() {
        let instant = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(format_timestamp(instant), "2024-05-01T12:00:00.000Z");
    }

    #[test]
    fn sub_millisecond_precision_is_truncated() {
        let instant = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(1_234_567);
        assert_eq!(format_timestamp(instant), "2024-05-01T12:00:00.001Z");
    }

    #[test]
    fn parse_accepts_formatted_output() {
        let instant = Utc.with_ymd_and_hms(2023, 11, 30, 8, 15, 42).unwrap();
        let parsed = parse_timestamp(&format_timestamp(instant)).unwrap();
        assert_eq!(parsed, instant);
    }

    #[test]
    fn parse_normalizes_offsets_to_utc() {
        let parsed = parse_timestamp("2024-05-01T14:00:00.000+02:00").unwrap();
        assert_eq!(format_timestamp(parsed), "2024-05-01T12:00:00.000Z");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_timestamp("").is_err());
    }

    #[test]
    fn canonical_message_is_order_fixed() {
        assert_eq!(
            canonical_message("u1", "a1", "2024-05-01T12:00:00.000Z"),
            "u1|a1|2024-05-01T12:00:00.000Z"
        );
        assert_ne!(
            canonical_message("u1", "a1", "t"),
            canonical_message("a1", "u1", "t")
        );
    }
}
