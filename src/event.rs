// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! The event data model (§3): a tagged variant over the four known event
//! types, parsed from and rendered back to `serde_json::Value` at the
//! codec's edge, with the pipeline staying strongly typed internally.

use serde_json::{Map, Value};

use crate::error::{CodecError, Result};

/// A single price/size level in an order book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    pub price: String,
    pub size: String,
}

/// The side of an order book change, trade, or price change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Canonicalizes an input string (case-insensitively) to a side; any
    /// value other than `"SELL"` is treated as `BUY`, matching the source
    /// protocol's looseness.
    fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("SELL") {
            Self::Sell
        } else {
            Self::Buy
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }

    /// The on-wire `side_byte`: 1 for `SELL`, 0 otherwise.
    pub fn to_byte(self) -> u8 {
        match self {
            Self::Buy => 0,
            Self::Sell => 1,
        }
    }

    /// Decodes a `side_byte`: any nonzero value is `SELL`.
    pub fn from_byte(b: u8) -> Self {
        if b == 1 { Self::Sell } else { Self::Buy }
    }
}

/// One entry of a `price_change` event's `changes` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceChangeEntry {
    pub side: Side,
    pub price: String,
    pub size: String,
}

/// A single logical event, stripped of `market`/`hash` and with its
/// timestamp parsed to an integer where possible.
///
/// `asset_id` deliberately has no field here: a session carries exactly one
/// asset id (held by the compressor/decompressor), so it never travels
/// inside an individual event on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Book {
        timestamp: Option<i64>,
        bids: Vec<Level>,
        asks: Vec<Level>,
    },
    PriceChange {
        timestamp: Option<i64>,
        changes: Vec<PriceChangeEntry>,
    },
    TickSizeChange {
        timestamp: Option<i64>,
        old_tick_size: String,
        new_tick_size: String,
    },
    LastTradePrice {
        timestamp: Option<i64>,
        price: String,
        size: String,
        side: Side,
        fee_rate_bps: Option<String>,
    },
}

/// The event-type code occupying bits 0..2 of the type byte (§4.4).
pub const EVENT_TYPE_BOOK: u8 = 0;
pub const EVENT_TYPE_PRICE_CHANGE: u8 = 1;
pub const EVENT_TYPE_TICK_SIZE_CHANGE: u8 = 2;
pub const EVENT_TYPE_LAST_TRADE_PRICE: u8 = 3;

impl Event {
    #[must_use]
    pub fn type_code(&self) -> u8 {
        match self {
            Self::Book { .. } => EVENT_TYPE_BOOK,
            Self::PriceChange { .. } => EVENT_TYPE_PRICE_CHANGE,
            Self::TickSizeChange { .. } => EVENT_TYPE_TICK_SIZE_CHANGE,
            Self::LastTradePrice { .. } => EVENT_TYPE_LAST_TRADE_PRICE,
        }
    }

    #[must_use]
    pub fn timestamp(&self) -> Option<i64> {
        match self {
            Self::Book { timestamp, .. }
            | Self::PriceChange { timestamp, .. }
            | Self::TickSizeChange { timestamp, .. }
            | Self::LastTradePrice { timestamp, .. } => *timestamp,
        }
    }

    /// Parses one JSON event object, stripping `market`/`hash` and
    /// canonicalizing aliases (`buys`/`sells`) and `side` casing.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidInput`] if `value` is not a JSON object,
    /// or [`CodecError::UnknownEventType`] if `event_type` isn't one of the
    /// four known kinds.
    pub fn from_json(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| CodecError::InvalidInput("event must be a JSON object".into()))?;
        let event_type = obj
            .get("event_type")
            .and_then(Value::as_str)
            .ok_or_else(|| CodecError::InvalidInput("event missing `event_type`".into()))?;
        let timestamp = parse_timestamp(obj.get("timestamp"));

        match event_type {
            "book" => {
                let bids = parse_levels(obj.get("bids").or_else(|| obj.get("buys")));
                let asks = parse_levels(obj.get("asks").or_else(|| obj.get("sells")));
                Ok(Self::Book {
                    timestamp,
                    bids,
                    asks,
                })
            }
            "price_change" => {
                let changes = parse_changes(obj.get("changes"));
                Ok(Self::PriceChange { timestamp, changes })
            }
            "tick_size_change" => Ok(Self::TickSizeChange {
                timestamp,
                old_tick_size: field_str(obj, "old_tick_size"),
                new_tick_size: field_str(obj, "new_tick_size"),
            }),
            "last_trade_price" => Ok(Self::LastTradePrice {
                timestamp,
                price: field_str(obj, "price"),
                size: field_str(obj, "size"),
                side: Side::parse(&field_str(obj, "side")),
                fee_rate_bps: obj.get("fee_rate_bps").map(|_| field_str(obj, "fee_rate_bps")),
            }),
            other => Err(CodecError::UnknownEventType(other.to_string())),
        }
    }

    /// Renders this event back to its normalized JSON form, injecting the
    /// session's single `asset_id` and the decimal-string `timestamp`.
    #[must_use]
    pub fn to_json(&self, asset_id: &str, timestamp: i64) -> Value {
        let mut obj = Map::new();
        obj.insert("event_type".into(), Value::String(self.event_type_name().into()));
        obj.insert("asset_id".into(), Value::String(asset_id.to_string()));
        obj.insert("timestamp".into(), Value::String(timestamp.to_string()));

        match self {
            Self::Book { bids, asks, .. } => {
                obj.insert("bids".into(), levels_to_json(bids));
                obj.insert("asks".into(), levels_to_json(asks));
            }
            Self::PriceChange { changes, .. } => {
                let arr = changes
                    .iter()
                    .map(|c| {
                        let mut m = Map::new();
                        m.insert("side".into(), Value::String(c.side.as_str().into()));
                        m.insert("price".into(), Value::String(c.price.clone()));
                        m.insert("size".into(), Value::String(c.size.clone()));
                        Value::Object(m)
                    })
                    .collect();
                obj.insert("changes".into(), Value::Array(arr));
            }
            Self::TickSizeChange {
                old_tick_size,
                new_tick_size,
                ..
            } => {
                obj.insert("old_tick_size".into(), Value::String(old_tick_size.clone()));
                obj.insert("new_tick_size".into(), Value::String(new_tick_size.clone()));
            }
            Self::LastTradePrice {
                price,
                size,
                side,
                fee_rate_bps,
                ..
            } => {
                obj.insert("price".into(), Value::String(price.clone()));
                obj.insert("size".into(), Value::String(size.clone()));
                obj.insert("side".into(), Value::String(side.as_str().into()));
                if let Some(fee) = fee_rate_bps {
                    obj.insert("fee_rate_bps".into(), Value::String(fee.clone()));
                }
            }
        }
        Value::Object(obj)
    }

    fn event_type_name(&self) -> &'static str {
        match self {
            Self::Book { .. } => "book",
            Self::PriceChange { .. } => "price_change",
            Self::TickSizeChange { .. } => "tick_size_change",
            Self::LastTradePrice { .. } => "last_trade_price",
        }
    }
}

fn levels_to_json(levels: &[Level]) -> Value {
    Value::Array(
        levels
            .iter()
            .map(|l| {
                let mut m = Map::new();
                m.insert("price".into(), Value::String(l.price.clone()));
                m.insert("size".into(), Value::String(l.size.clone()));
                Value::Object(m)
            })
            .collect(),
    )
}

fn parse_levels(v: Option<&Value>) -> Vec<Level> {
    let Some(Value::Array(arr)) = v else {
        return Vec::new();
    };
    arr.iter()
        .map(|lv| Level {
            price: value_to_string(lv.get("price")),
            size: value_to_string(lv.get("size")),
        })
        .collect()
}

/// `price_change` with a missing (or null) `changes` key decodes as an empty
/// array, not an error — the original implementation's fallback is
/// normative (SPEC_FULL §9 open question 3).
fn parse_changes(v: Option<&Value>) -> Vec<PriceChangeEntry> {
    let Some(Value::Array(arr)) = v else {
        return Vec::new();
    };
    arr.iter()
        .map(|ch| PriceChangeEntry {
            side: Side::parse(&value_to_string(ch.get("side"))),
            price: value_to_string(ch.get("price")),
            size: value_to_string(ch.get("size")),
        })
        .collect()
}

fn field_str(obj: &Map<String, Value>, key: &str) -> String {
    value_to_string(obj.get(key))
}

fn value_to_string(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Parses a timestamp field that may be a decimal string or a JSON number;
/// anything else (including absence) is "no numeric timestamp".
fn parse_timestamp(v: Option<&Value>) -> Option<i64> {
    match v {
        Some(Value::String(s)) => s.parse::<i64>().ok(),
        Some(Value::Number(n)) => n.as_i64(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_book_with_bids_asks_aliases() {
        let value = json!({
            "event_type": "book",
            "asset_id": "A",
            "market": "m",
            "hash": "h",
            "timestamp": "1000",
            "buys": [{"price": "0.5", "size": "10"}],
            "sells": [{"price": "0.6", "size": "5"}],
        });
        let event = Event::from_json(&value).unwrap();
        match event {
            Event::Book {
                timestamp,
                bids,
                asks,
            } => {
                assert_eq!(timestamp, Some(1000));
                assert_eq!(bids, vec![Level { price: "0.5".into(), size: "10".into() }]);
                assert_eq!(asks, vec![Level { price: "0.6".into(), size: "5".into() }]);
            }
            _ => panic!("expected Book"),
        }
    }

    #[test]
    fn missing_changes_is_empty_not_an_error() {
        let value = json!({"event_type": "price_change", "timestamp": "1", "asset_id": "A"});
        let event = Event::from_json(&value).unwrap();
        match event {
            Event::PriceChange { changes, .. } => assert!(changes.is_empty()),
            _ => panic!("expected PriceChange"),
        }
    }

    #[test]
    fn side_is_canonicalized_uppercase() {
        let value = json!({
            "event_type": "last_trade_price",
            "timestamp": "1",
            "price": "0.5",
            "size": "1",
            "side": "sell",
        });
        let event = Event::from_json(&value).unwrap();
        match event {
            Event::LastTradePrice { side, .. } => assert_eq!(side, Side::Sell),
            _ => panic!("expected LastTradePrice"),
        }
    }

    #[test]
    fn unknown_event_type_is_rejected() {
        let value = json!({"event_type": "unknown_thing"});
        assert!(matches!(
            Event::from_json(&value),
            Err(CodecError::UnknownEventType(_))
        ));
    }

    #[test]
    fn to_json_round_trips_last_trade_price_with_fee() {
        let event = Event::LastTradePrice {
            timestamp: Some(1100),
            price: "0.55".into(),
            size: "2".into(),
            side: Side::Buy,
            fee_rate_bps: Some("25".into()),
        };
        let rendered = event.to_json("A", 1100);
        assert_eq!(rendered["fee_rate_bps"], "25");
        assert_eq!(rendered["side"], "BUY");
        assert_eq!(rendered["asset_id"], "A");
    }
}
