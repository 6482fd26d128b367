//! Helpers for building display-only resource profiles.

use chrono::{DateTime, SecondsFormat, Utc};
use rootly_model::Profile;
use serde_json::Value;
use tracing::debug;

/// Normalizes an upstream timestamp to UTC RFC 3339.
///
/// Returns `None` for empty or unparseable values.
pub(crate) fn timestamp(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => Some(
            parsed
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        ),
        Err(e) => {
            debug!(value = raw, error = %e, "ignoring unparseable timestamp");
            None
        }
    }
}

/// Splits a full name into first name and the remainder.
pub(crate) fn split_full_name(full_name: &str) -> (String, String) {
    let mut parts = full_name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let rest = parts.collect::<Vec<_>>().join(" ");
    (first, rest)
}

/// Inserts `value` under `key` unless it is empty.
pub(crate) fn insert_non_empty(profile: &mut Profile, key: &str, value: &str) {
    if !value.is_empty() {
        profile.insert(key.to_string(), Value::from(value));
    }
}

/// Inserts a normalized timestamp under `key` when it parses.
pub(crate) fn insert_timestamp(profile: &mut Profile, key: &str, raw: &str) {
    if let Some(ts) = timestamp(raw) {
        profile.insert(key.to_string(), Value::from(ts));
    }
}
