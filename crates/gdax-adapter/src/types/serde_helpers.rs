/*
[INPUT]:  Loosely typed JSON scalars (numbers, numeric strings, decimal text)
[OUTPUT]: Strict integer/text values or decode errors
[POS]:    Data layer - shared serde adapters for REST and feed payloads
[UPDATE]: When the wire format changes how a scalar is encoded
*/

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::http::{GdaxError, Result};

/// Parse an integer that arrived as text.
pub(crate) fn parse_integer(raw: &str) -> Result<i64> {
    raw.parse::<i64>().map_err(|_| GdaxError::InvalidNumber {
        value: raw.to_string(),
    })
}

fn integer_from_value(value: Value) -> Result<Option<i64>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(number) => number.as_i64().map(Some).ok_or(GdaxError::InvalidNumber {
            value: number.to_string(),
        }),
        Value::String(raw) => parse_integer(&raw).map(Some),
        other => Err(GdaxError::InvalidNumber {
            value: other.to_string(),
        }),
    }
}

/// Integer sent either as a JSON number or a numeric string; `null` maps to `None`.
pub(crate) fn deserialize_option_i64<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    integer_from_value(value).map_err(serde::de::Error::custom)
}

/// Integer sent either as a JSON number or a numeric string.
pub(crate) fn deserialize_i64<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    integer_from_value(value)
        .and_then(|parsed| {
            parsed.ok_or(GdaxError::InvalidNumber {
                value: "null".to_string(),
            })
        })
        .map_err(serde::de::Error::custom)
}

/// A positional-array element that is either text or a bare JSON number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum TextOrNumber {
    Text(String),
    Number(serde_json::Number),
}

impl From<TextOrNumber> for String {
    fn from(value: TextOrNumber) -> Self {
        match value {
            TextOrNumber::Text(text) => text,
            TextOrNumber::Number(number) => number.to_string(),
        }
    }
}
