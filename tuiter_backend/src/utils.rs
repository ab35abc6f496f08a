//! Shared helpers and constants.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};

pub const APP_NAME: &str = "tuiter_backend";

/// Current time as an RFC 3339 UTC string with millisecond precision.
///
/// Every stored timestamp uses this exact shape so that ordering by the raw
/// column text matches chronological order.
pub fn now_utc_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a client supplied RFC 3339 timestamp and rewrites it in the stored
/// shape (UTC, milliseconds, `Z` suffix).
pub fn normalize_timestamp(raw: &str) -> Result<String> {
    let parsed = DateTime::parse_from_rfc3339(raw.trim())
        .with_context(|| format!("invalid timestamp: {raw}"))?;
    Ok(parsed
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_offsets_to_utc() {
        let normalized = normalize_timestamp("2024-03-01T10:00:00+02:00").unwrap();
        assert_eq!(normalized, "2024-03-01T08:00:00.000Z");
    }

    #[test]
    fn rejects_garbage() {
        assert!(normalize_timestamp("yesterday").is_err());
    }

    #[test]
    fn now_is_lexically_ordered() {
        let first = now_utc_iso();
        let second = now_utc_iso();
        assert!(first <= second);
        assert!(first.ends_with('Z'));
    }
}
