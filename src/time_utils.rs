// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.
//!
//! Every timestamp we persist goes through [`format_utc_rfc3339`], so the
//! string form has a fixed width and sorts lexically in chronological order.
//! Firestore range filters and `order_by` rely on that.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Drop sub-second precision so stored and in-memory values compare equal.
pub fn truncate_to_secs(date: DateTime<Utc>) -> DateTime<Utc> {
    Utc.timestamp_opt(date.timestamp(), 0)
        .single()
        .unwrap_or(date)
}

/// Current time at whole-second precision.
pub fn now_secs() -> DateTime<Utc> {
    truncate_to_secs(Utc::now())
}

/// Serde adapter for `DateTime<Utc>` fields using [`format_utc_rfc3339`].
pub mod rfc3339_secs {
    use super::format_utc_rfc3339;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format_utc_rfc3339(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Optional variant of [`rfc3339_secs`].
pub mod rfc3339_secs_option {
    use super::format_utc_rfc3339;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &Option<DateTime<Utc>>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => s.serialize_some(&format_utc_rfc3339(*date)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|raw| {
                DateTime::parse_from_rfc3339(&raw)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(serde::de::Error::custom)
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_is_fixed_width() {
        let date = Utc.with_ymd_and_hms(2024, 1, 5, 7, 3, 9).unwrap();
        assert_eq!(format_utc_rfc3339(date), "2024-01-05T07:03:09Z");
    }

    #[test]
    fn test_lexical_order_matches_chronological_order() {
        let earlier = Utc.with_ymd_and_hms(2024, 1, 5, 7, 3, 9).unwrap();
        let later = earlier + chrono::Duration::milliseconds(1500);
        assert!(format_utc_rfc3339(earlier) < format_utc_rfc3339(truncate_to_secs(later)));
    }

    #[test]
    fn test_serde_round_trip() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Wrapper {
            #[serde(with = "rfc3339_secs")]
            at: DateTime<Utc>,
            #[serde(default, with = "rfc3339_secs_option")]
            maybe: Option<DateTime<Utc>>,
        }

        let at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let json = serde_json::to_string(&Wrapper { at, maybe: None }).unwrap();
        assert_eq!(json, r#"{"at":"2024-03-01T00:00:00Z","maybe":null}"#);

        let parsed: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.at, at);
        assert!(parsed.maybe.is_none());
    }
}
