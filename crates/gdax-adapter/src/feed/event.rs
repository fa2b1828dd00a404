/*
[INPUT]:  Decoded FeedMessage envelopes
[OUTPUT]: FeedEvent values carrying only the fields each message type documents
[POS]:    Feed layer - typed view over the flat envelope
[UPDATE]: When a message type is added or its required fields change
*/

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::message::{parse_decimal, ChangeEntry, FeedMessage, MessageChannel, PriceSizeEntry};
use crate::http::{GdaxError, Result};
use crate::types::Side;

/// One feed message, typed by its `type` discriminant.
///
/// Types this crate does not know keep their whole envelope in
/// [`FeedEvent::Unknown`].
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Subscriptions(Vec<MessageChannel>),
    Heartbeat(Heartbeat),
    Ticker(Ticker),
    Snapshot(BookSnapshot),
    L2Update(BookUpdate),
    Received(Received),
    Open(Open),
    Done(Done),
    /// Both `match` and `last_match`
    Match(Match),
    Change(Change),
    Activate(Activate),
    Error { message: String },
    Unknown(Box<FeedMessage>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Heartbeat {
    pub product_id: String,
    pub sequence: i64,
    pub last_trade_id: i64,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ticker {
    pub product_id: String,
    pub sequence: i64,
    pub price: Decimal,
    pub trade_id: Option<i64>,
    pub side: Option<Side>,
    pub last_size: Option<Decimal>,
    pub best_bid: Option<Decimal>,
    pub best_ask: Option<Decimal>,
    pub open_24h: Option<Decimal>,
    pub high_24h: Option<Decimal>,
    pub low_24h: Option<Decimal>,
    pub volume_24h: Option<Decimal>,
    pub volume_30d: Option<Decimal>,
    pub time: Option<DateTime<Utc>>,
}

/// Full level-2 book sent right after subscribing to `level2`
#[derive(Debug, Clone, PartialEq)]
pub struct BookSnapshot {
    pub product_id: String,
    pub bids: Vec<PriceSizeEntry>,
    pub asks: Vec<PriceSizeEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookUpdate {
    pub product_id: String,
    pub changes: Vec<ChangeEntry>,
    pub time: Option<DateTime<Utc>>,
}

/// Order accepted by the matching engine. Market orders may carry `funds`
/// instead of `price` and `size`.
#[derive(Debug, Clone, PartialEq)]
pub struct Received {
    pub product_id: String,
    pub sequence: i64,
    pub order_id: String,
    pub side: Side,
    pub order_type: String,
    pub size: Option<Decimal>,
    pub price: Option<Decimal>,
    pub funds: Option<Decimal>,
    pub client_oid: Option<String>,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Open {
    pub product_id: String,
    pub sequence: i64,
    pub order_id: String,
    pub side: Side,
    pub price: Decimal,
    pub remaining_size: Decimal,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Done {
    pub product_id: String,
    pub sequence: i64,
    pub order_id: String,
    pub side: Side,
    /// `filled` or `canceled`
    pub reason: String,
    pub price: Option<Decimal>,
    pub remaining_size: Option<Decimal>,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub product_id: String,
    pub sequence: i64,
    pub trade_id: i64,
    pub maker_order_id: String,
    pub taker_order_id: String,
    /// Side of the maker order
    pub side: Side,
    pub price: Decimal,
    pub size: Decimal,
    pub time: DateTime<Utc>,
}

/// Resting order changed by self-trade prevention or a modify.
/// Size changes fill `*_size`, market orders fill `*_funds`.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub product_id: String,
    pub sequence: i64,
    pub order_id: String,
    pub side: Side,
    pub price: Option<Decimal>,
    pub new_size: Option<Decimal>,
    pub old_size: Option<Decimal>,
    pub new_funds: Option<Decimal>,
    pub old_funds: Option<Decimal>,
    pub time: DateTime<Utc>,
}

/// Stop order triggered
#[derive(Debug, Clone, PartialEq)]
pub struct Activate {
    pub product_id: String,
    pub order_id: String,
    pub side: Side,
    pub size: Option<Decimal>,
    pub funds: Option<Decimal>,
    pub user_id: Option<String>,
    pub profile_id: Option<String>,
    pub time: Option<DateTime<Utc>>,
}

impl FeedEvent {
    /// Feed sequence number, for types that carry one
    pub fn sequence(&self) -> Option<i64> {
        match self {
            FeedEvent::Heartbeat(event) => Some(event.sequence),
            FeedEvent::Ticker(event) => Some(event.sequence),
            FeedEvent::Received(event) => Some(event.sequence),
            FeedEvent::Open(event) => Some(event.sequence),
            FeedEvent::Done(event) => Some(event.sequence),
            FeedEvent::Match(event) => Some(event.sequence),
            FeedEvent::Change(event) => Some(event.sequence),
            FeedEvent::Unknown(message) => message.sequence,
            FeedEvent::Subscriptions(_)
            | FeedEvent::Snapshot(_)
            | FeedEvent::L2Update(_)
            | FeedEvent::Activate(_)
            | FeedEvent::Error { .. } => None,
        }
    }

    pub fn product_id(&self) -> Option<&str> {
        match self {
            FeedEvent::Heartbeat(event) => Some(&event.product_id),
            FeedEvent::Ticker(event) => Some(&event.product_id),
            FeedEvent::Snapshot(event) => Some(&event.product_id),
            FeedEvent::L2Update(event) => Some(&event.product_id),
            FeedEvent::Received(event) => Some(&event.product_id),
            FeedEvent::Open(event) => Some(&event.product_id),
            FeedEvent::Done(event) => Some(&event.product_id),
            FeedEvent::Match(event) => Some(&event.product_id),
            FeedEvent::Change(event) => Some(&event.product_id),
            FeedEvent::Activate(event) => Some(&event.product_id),
            FeedEvent::Unknown(message) => message.product_id.as_deref(),
            FeedEvent::Subscriptions(_) | FeedEvent::Error { .. } => None,
        }
    }
}

impl TryFrom<FeedMessage> for FeedEvent {
    type Error = GdaxError;

    fn try_from(message: FeedMessage) -> Result<Self> {
        message.into_event()
    }
}

fn require<T>(value: Option<T>, message_type: &'static str, field: &'static str) -> Result<T> {
    value.ok_or(GdaxError::MissingField {
        message_type,
        field,
    })
}

fn require_decimal(
    value: Option<String>,
    message_type: &'static str,
    field: &'static str,
) -> Result<Decimal> {
    let raw = require(value, message_type, field)?;
    parse_decimal(field, &raw)
}

fn optional_decimal(value: Option<String>, field: &'static str) -> Result<Option<Decimal>> {
    match value.as_deref() {
        None | Some("") => Ok(None),
        Some(raw) => parse_decimal(field, raw).map(Some),
    }
}

fn require_side(value: Option<String>, message_type: &'static str) -> Result<Side> {
    require(value, message_type, "side")?.parse()
}

fn optional_side(value: Option<String>) -> Result<Option<Side>> {
    match value.as_deref() {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some),
    }
}

impl FeedMessage {
    /// Convert into the typed event for this message's `type`.
    ///
    /// Fails with [`GdaxError::MissingField`] when a field the type cannot do
    /// without is absent. Fields the type does not document are ignored.
    pub fn into_event(self) -> Result<FeedEvent> {
        let m = self;
        let kind = m.kind.clone();
        let event = match kind.as_str() {
            "subscriptions" => FeedEvent::Subscriptions(m.channels.unwrap_or_default()),
            "heartbeat" => {
                const T: &str = "heartbeat";
                FeedEvent::Heartbeat(Heartbeat {
                    product_id: require(m.product_id, T, "product_id")?,
                    sequence: require(m.sequence, T, "sequence")?,
                    last_trade_id: require(m.last_trade_id, T, "last_trade_id")?,
                    time: require(m.time, T, "time")?,
                })
            }
            "ticker" => {
                const T: &str = "ticker";
                FeedEvent::Ticker(Ticker {
                    product_id: require(m.product_id, T, "product_id")?,
                    sequence: require(m.sequence, T, "sequence")?,
                    price: require_decimal(m.price, T, "price")?,
                    trade_id: m.trade_id,
                    side: optional_side(m.side)?,
                    last_size: optional_decimal(m.last_size, "last_size")?,
                    best_bid: optional_decimal(m.best_bid, "best_bid")?,
                    best_ask: optional_decimal(m.best_ask, "best_ask")?,
                    open_24h: optional_decimal(m.open_24h, "open_24h")?,
                    high_24h: optional_decimal(m.high_24h, "high_24h")?,
                    low_24h: optional_decimal(m.low_24h, "low_24h")?,
                    volume_24h: optional_decimal(m.volume_24h, "volume_24h")?,
                    volume_30d: optional_decimal(m.volume_30d, "volume_30d")?,
                    time: m.time,
                })
            }
            "snapshot" => {
                const T: &str = "snapshot";
                FeedEvent::Snapshot(BookSnapshot {
                    product_id: require(m.product_id, T, "product_id")?,
                    bids: require(m.bids, T, "bids")?,
                    asks: require(m.asks, T, "asks")?,
                })
            }
            "l2update" => {
                const T: &str = "l2update";
                FeedEvent::L2Update(BookUpdate {
                    product_id: require(m.product_id, T, "product_id")?,
                    changes: require(m.changes, T, "changes")?,
                    time: m.time,
                })
            }
            "received" => {
                const T: &str = "received";
                FeedEvent::Received(Received {
                    product_id: require(m.product_id, T, "product_id")?,
                    sequence: require(m.sequence, T, "sequence")?,
                    order_id: require(m.order_id, T, "order_id")?,
                    side: require_side(m.side, T)?,
                    order_type: require(m.order_type, T, "order_type")?,
                    size: optional_decimal(m.size, "size")?,
                    price: optional_decimal(m.price, "price")?,
                    funds: optional_decimal(m.funds, "funds")?,
                    client_oid: m.client_oid.filter(|oid| !oid.is_empty()),
                    time: require(m.time, T, "time")?,
                })
            }
            "open" => {
                const T: &str = "open";
                FeedEvent::Open(Open {
                    product_id: require(m.product_id, T, "product_id")?,
                    sequence: require(m.sequence, T, "sequence")?,
                    order_id: require(m.order_id, T, "order_id")?,
                    side: require_side(m.side, T)?,
                    price: require_decimal(m.price, T, "price")?,
                    remaining_size: require_decimal(m.remaining_size, T, "remaining_size")?,
                    time: require(m.time, T, "time")?,
                })
            }
            "done" => {
                const T: &str = "done";
                FeedEvent::Done(Done {
                    product_id: require(m.product_id, T, "product_id")?,
                    sequence: require(m.sequence, T, "sequence")?,
                    order_id: require(m.order_id, T, "order_id")?,
                    side: require_side(m.side, T)?,
                    reason: require(m.reason, T, "reason")?,
                    price: optional_decimal(m.price, "price")?,
                    remaining_size: optional_decimal(m.remaining_size, "remaining_size")?,
                    time: require(m.time, T, "time")?,
                })
            }
            "match" | "last_match" => {
                const T: &str = "match";
                FeedEvent::Match(Match {
                    product_id: require(m.product_id, T, "product_id")?,
                    sequence: require(m.sequence, T, "sequence")?,
                    trade_id: require(m.trade_id, T, "trade_id")?,
                    maker_order_id: require(m.maker_order_id, T, "maker_order_id")?,
                    taker_order_id: require(m.taker_order_id, T, "taker_order_id")?,
                    side: require_side(m.side, T)?,
                    price: require_decimal(m.price, T, "price")?,
                    size: require_decimal(m.size, T, "size")?,
                    time: require(m.time, T, "time")?,
                })
            }
            "change" => {
                const T: &str = "change";
                FeedEvent::Change(Change {
                    product_id: require(m.product_id, T, "product_id")?,
                    sequence: require(m.sequence, T, "sequence")?,
                    order_id: require(m.order_id, T, "order_id")?,
                    side: require_side(m.side, T)?,
                    price: optional_decimal(m.price, "price")?,
                    new_size: optional_decimal(m.new_size, "new_size")?,
                    old_size: optional_decimal(m.old_size, "old_size")?,
                    new_funds: optional_decimal(m.new_funds, "new_funds")?,
                    old_funds: optional_decimal(m.old_funds, "old_funds")?,
                    time: require(m.time, T, "time")?,
                })
            }
            "activate" => {
                const T: &str = "activate";
                FeedEvent::Activate(Activate {
                    product_id: require(m.product_id, T, "product_id")?,
                    order_id: require(m.order_id, T, "order_id")?,
                    side: require_side(m.side, T)?,
                    size: optional_decimal(m.size, "size")?,
                    funds: optional_decimal(m.funds, "funds")?,
                    user_id: m.user_id,
                    profile_id: m.profile_id,
                    time: m.time,
                })
            }
            "error" => FeedEvent::Error {
                message: require(m.message, "error", "message")?,
            },
            _ => FeedEvent::Unknown(Box::new(m)),
        };
        Ok(event)
    }
}
