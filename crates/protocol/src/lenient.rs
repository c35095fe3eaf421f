//! Field decoders that treat unrecognized values as absent.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decodes an optional string-backed enum, mapping unknown or non-string values to `None`.
pub(crate) fn enum_value<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
	D: Deserializer<'de>,
	T: FromStr,
{
	let raw = Option::<Value>::deserialize(deserializer)?;
	Ok(raw.as_ref().and_then(Value::as_str).and_then(|value| value.parse().ok()))
}

/// Decodes a number, mapping null or non-numeric values to `0.0`.
pub(crate) fn number_or_default<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<Value>::deserialize(deserializer)?;
	Ok(raw.as_ref().and_then(Value::as_f64).unwrap_or_default())
}

/// Decodes a list of `[time, volume]` pairs, mapping null or malformed curves to an empty list.
pub(crate) fn curve_or_default<'de, D>(deserializer: D) -> Result<Vec<(f64, f64)>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<Value>::deserialize(deserializer)?;
	Ok(raw.and_then(|value| serde_json::from_value(value).ok()).unwrap_or_default())
}

/// Decodes an optional RFC 3339 timestamp, mapping unparsable values to `None`.
pub(crate) fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<Value>::deserialize(deserializer)?;
	Ok(raw
		.as_ref()
		.and_then(Value::as_str)
		.and_then(|value| DateTime::parse_from_rfc3339(value).ok())
		.map(|value| value.with_timezone(&Utc)))
}
