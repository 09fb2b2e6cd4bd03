use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a timestamp that may or may not carry a UTC offset. Naive values are
/// assumed to be UTC; offset-aware values are converted to UTC.
pub fn parse_utc(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>()
        .map(|naive| naive.and_utc())
        .map_err(|err| format!("invalid timestamp {raw:?}: {err}"))
}

/// Serde field adapter for request payloads: accepts RFC 3339 with any offset
/// as well as naive timestamps, always yielding UTC.
pub mod flexible_utc {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_utc(&raw).map_err(serde::de::Error::custom)
    }
}
