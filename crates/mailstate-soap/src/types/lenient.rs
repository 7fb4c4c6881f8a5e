//! Lenient number decoding.
//!
//! The server is inconsistent about numeric fields: dates, sizes and counters
//! arrive either as JSON numbers or as numeric strings.

use std::str::FromStr;

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Integer(i64),
    Float(f64),
    Text(String),
}

/// Deserializes an optional number that may be encoded as a string.
///
/// Values that cannot be represented as `T` decode as `None`.
#[allow(clippy::cast_possible_truncation)] // Fractional dates/sizes are truncated
pub fn option_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64> + FromStr,
{
    Ok(match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(NumberOrString::Integer(n)) => T::try_from(n).ok(),
        Some(NumberOrString::Float(f)) => T::try_from(f as i64).ok(),
        Some(NumberOrString::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}
