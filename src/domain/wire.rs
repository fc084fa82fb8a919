//! Decoding helpers for the store's JSON shapes.

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;
use time::{Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description};
use tracing::debug;

/// Treat an explicit `null` like a missing field.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Unwrap the store's `{ "current": "..." }` slug object. Absent slugs are empty.
pub(crate) fn slug_current<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wire {
        #[serde(default)]
        current: Option<String>,
    }

    Ok(Option::<Wire>::deserialize(deserializer)?
        .and_then(|wire| wire.current)
        .unwrap_or_default())
}

/// Accept RFC 3339 timestamps or bare `YYYY-MM-DD` dates; anything else is absent.
pub(crate) fn timestamp<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(value);
    }
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight().assume_utc())
}

/// List field whose `null` or malformed elements are skipped, as dangling
/// references project to `null` inside an otherwise valid array.
pub(crate) fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values
        .into_iter()
        .filter(|value| !value.is_null())
        .filter_map(|value| match T::deserialize(&value) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                debug!(
                    target = "nostalgia::domain::wire",
                    error = %err,
                    "skipping list element that did not decode"
                );
                None
            }
        })
        .collect())
}

/// Decode each element on its own so one malformed entry cannot fail the list.
pub(crate) fn decode_lenient<T, F>(values: Vec<Value>, fallback: F) -> Vec<T>
where
    T: DeserializeOwned,
    F: Fn(&Value) -> T,
{
    values
        .into_iter()
        .map(|value| match T::deserialize(&value) {
            Ok(decoded) => decoded,
            Err(err) => {
                debug!(
                    target = "nostalgia::domain::wire",
                    kind = value.get("_type").and_then(serde_json::Value::as_str).unwrap_or(""),
                    error = %err,
                    "element did not match its declared shape"
                );
                fallback(&value)
            }
        })
        .collect()
}
