// Utility functions for feed-service

use chrono::NaiveDateTime;

/// Timestamp layout used by the interaction dataset.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Multiplier for anything that happened today (or is dated in the future).
pub const TODAY_MULTIPLIER: f64 = 70.0;

const DECAY_BASE: f64 = 1.8;
const DECAY_PIVOT_DAYS: f64 = 7.0;

/// Recency multiplier for an age in whole days.
///
/// `d <= 0` maps to [`TODAY_MULTIPLIER`]; otherwise `1.8^(7 - d) + 1/d`,
/// which is strictly decreasing for `d >= 1`.
pub fn recency_multiplier(age_days: i64) -> f64 {
    if age_days <= 0 {
        return TODAY_MULTIPLIER;
    }

    let days = age_days as f64;
    DECAY_BASE.powf(DECAY_PIVOT_DAYS - days) + 1.0 / days
}

/// Whole days elapsed between `at` and `now` (negative when `at` is in the future).
pub fn days_since(at: NaiveDateTime, now: NaiveDateTime) -> i64 {
    (now - at).num_days()
}

/// Recency multiplier of an event or status published at `at`, seen from `now`.
pub fn recency_multiplier_at(at: NaiveDateTime, now: NaiveDateTime) -> f64 {
    recency_multiplier(days_since(at, now))
}

/// Serde adapter for dataset timestamps (`%Y-%m-%d %H:%M:%S`).
pub mod date_format {
    use super::DATE_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(raw.trim(), DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}
