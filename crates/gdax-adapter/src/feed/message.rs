/*
[INPUT]:  Raw feed frame bytes (one JSON object per frame)
[OUTPUT]: FeedMessage envelopes with positional entries decoded into named records
[POS]:    Feed layer - envelope decoding
[UPDATE]: When the feed adds fields or changes an entry layout
*/

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::http::{GdaxError, Result};
use crate::types::serde_helpers::{self, TextOrNumber};

/// Decode one feed frame.
///
/// Every field except `type` is optional and the whole superset is decoded no
/// matter which type the frame declares. Nothing is returned on error.
///
/// Every failure surfaces as [`GdaxError::Serialization`], including a book
/// entry with the wrong number of elements or a non-numeric id; the error text
/// names the offending record. [`GdaxError::InvalidArity`] is only returned
/// when converting entries directly with `TryFrom<Vec<String>>`.
pub fn decode_message(frame: &[u8]) -> Result<FeedMessage> {
    Ok(serde_json::from_slice(frame)?)
}

/// Flat feed envelope.
///
/// Which fields are meaningful depends entirely on `kind`; absent fields stay
/// `None` and an explicit `""` stays `Some("")`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_ids: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_option_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub trade_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_oid: Option<String>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_option_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub sequence: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maker_order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taker_order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funds: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_funds: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_funds: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bids: Option<Vec<PriceSizeEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asks: Option<Vec<PriceSizeEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<Vec<ChangeEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_bid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_ask: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<MessageChannel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_24h: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_24h: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_24h: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_24h: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_30d: Option<String>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_option_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_trade_id: Option<i64>,
}

impl FromStr for FeedMessage {
    type Err = GdaxError;

    fn from_str(s: &str) -> Result<Self> {
        decode_message(s.as_bytes())
    }
}

/// Channel listed in a `subscriptions` reply, also used to build subscribe requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageChannel {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub product_ids: Vec<String>,
}

/// `[price, size]` book entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PriceSizeEntry {
    pub price: String,
    pub size: String,
}

/// `[side, price, size]` book change
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChangeEntry {
    pub side: String,
    pub price: String,
    pub size: String,
}

impl PriceSizeEntry {
    pub fn new(price: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            price: price.into(),
            size: size.into(),
        }
    }

    pub fn price_decimal(&self) -> Result<Decimal> {
        parse_decimal("price", &self.price)
    }

    pub fn size_decimal(&self) -> Result<Decimal> {
        parse_decimal("size", &self.size)
    }
}

impl ChangeEntry {
    pub fn new(side: impl Into<String>, price: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            side: side.into(),
            price: price.into(),
            size: size.into(),
        }
    }

    pub fn price_decimal(&self) -> Result<Decimal> {
        parse_decimal("price", &self.price)
    }

    /// New aggregate size at `price`; zero means the level was removed
    pub fn size_decimal(&self) -> Result<Decimal> {
        parse_decimal("size", &self.size)
    }
}

pub(crate) fn parse_decimal(field: &'static str, raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw).map_err(|e| GdaxError::InvalidField {
        field,
        reason: format!("`{raw}`: {e}"),
    })
}

fn arity_error(record: &'static str, expected: usize, actual: usize) -> GdaxError {
    GdaxError::InvalidArity {
        record,
        expected,
        actual,
    }
}

impl TryFrom<Vec<String>> for PriceSizeEntry {
    type Error = GdaxError;

    fn try_from(fields: Vec<String>) -> Result<Self> {
        let [price, size]: [String; 2] = fields
            .try_into()
            .map_err(|fields: Vec<String>| arity_error("price/size entry", 2, fields.len()))?;
        Ok(Self { price, size })
    }
}

impl TryFrom<Vec<String>> for ChangeEntry {
    type Error = GdaxError;

    fn try_from(fields: Vec<String>) -> Result<Self> {
        let [side, price, size]: [String; 3] = fields
            .try_into()
            .map_err(|fields: Vec<String>| arity_error("change entry", 3, fields.len()))?;
        Ok(Self { side, price, size })
    }
}

fn positional_fields<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let fields = Vec::<TextOrNumber>::deserialize(deserializer)?;
    Ok(fields.into_iter().map(String::from).collect())
}

impl<'de> Deserialize<'de> for PriceSizeEntry {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = positional_fields(deserializer)?;
        Self::try_from(fields).map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for ChangeEntry {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = positional_fields(deserializer)?;
        Self::try_from(fields).map_err(de::Error::custom)
    }
}

impl Serialize for PriceSizeEntry {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (&self.price, &self.size).serialize(serializer)
    }
}

impl Serialize for ChangeEntry {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (&self.side, &self.price, &self.size).serialize(serializer)
    }
}
