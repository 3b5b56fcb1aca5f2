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

//! The stateful session decompressor (§4.6): the mirror image of
//! [`crate::compressor::Compressor`], tracking the same base timestamp and
//! string pool evolution a matching compressor produced.

use crate::{
    error::{CodecError, Result},
    event::{Event, Level, PriceChangeEntry, Side},
    pool::StringPool,
    record::{HEADER_FLAG_SINGLE_ASSET, PROTOCOL_VERSION, REC_FRAME, REC_HEADER, REC_RAW},
    transport::inflate_raw_b64,
    varint::decode_uvarint,
};

const TB_TYPE_MASK: u8 = 0x07;
const TB_TS_ABS: u8 = 1 << 5;
const TB_OPT0: u8 = 1 << 3;

/// Session state a matching [`crate::compressor::Compressor`] evolved on the
/// encode side, reconstructed as lines arrive.
pub struct Decompressor {
    asset_id: Option<String>,
    pool: StringPool,
    prev_ts: Option<i64>,
}

impl Default for Decompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompressor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            asset_id: None,
            pool: StringPool::new(),
            prev_ts: None,
        }
    }

    /// Resets session state, as happens whenever a fresh header is decoded.
    pub fn reset(&mut self) {
        self.asset_id = None;
        self.pool.reset();
        self.prev_ts = None;
    }

    /// Attempts to decode one wire line.
    ///
    /// Returns `Ok(None)` if `token` isn't a V3 record at all (try the
    /// legacy zlib fallback or pass the line through verbatim next).
    /// Returns `Ok(Some(lines))` with zero or more rendered JSON text lines
    /// (a header-only line yields zero). Returns `Err` for a token that
    /// decoded as V3 but was malformed.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] for any V3 record that fails to parse once
    /// its record-kind byte has been recognized.
    pub fn try_decode_line(&mut self, token: &str) -> Result<Option<Vec<String>>> {
        let Some(buf) = inflate_raw_b64(token) else {
            return Ok(None);
        };
        let Some(&kind) = buf.first() else {
            return Ok(None);
        };
        match kind {
            REC_HEADER => {
                self.decode_header(&buf)?;
                Ok(Some(Vec::new()))
            }
            REC_FRAME => self.decode_frame(&buf).map(|s| Some(vec![s])),
            REC_RAW => self.decode_raw(&buf).map(|s| Some(vec![s])),
            _ => Ok(None),
        }
    }

    fn decode_header(&mut self, buf: &[u8]) -> Result<()> {
        let (version, i) = decode_uvarint(buf, 1)?;
        if version != PROTOCOL_VERSION {
            return Err(CodecError::UnsupportedVersion(version));
        }
        let (flags, i) = decode_uvarint(buf, i)?;
        if flags & HEADER_FLAG_SINGLE_ASSET == 0 {
            return Err(CodecError::InvalidInput(
                "header is missing the single-asset flag".into(),
            ));
        }
        let (base_ts, i) = decode_uvarint(buf, i)?;
        let (asset_count, i) = decode_uvarint(buf, i)?;
        if asset_count != 1 {
            return Err(CodecError::InvalidInput(format!(
                "expected exactly one asset id, found {asset_count}"
            )));
        }
        let (len, i) = decode_uvarint(buf, i)?;
        let end = i
            .checked_add(len as usize)
            .ok_or(CodecError::LiteralOverflow)?;
        let bytes = buf.get(i..end).ok_or(CodecError::LiteralOverflow)?;
        let asset_id = std::str::from_utf8(bytes)
            .map_err(|_| CodecError::InvalidInput("asset id is not valid UTF-8".into()))?
            .to_string();

        self.pool.reset();
        self.prev_ts = Some(base_ts as i64);
        tracing::debug!(%asset_id, base_ts, "decoded V3 session header");
        self.asset_id = Some(asset_id);
        Ok(())
    }

    /// Decodes a frame record into a single compact JSON array text
    /// (one entry per event), matching the wire's one-record-per-frame
    /// shape rather than one output line per event.
    fn decode_frame(&mut self, buf: &[u8]) -> Result<String> {
        let asset_id = self.require_asset_id()?;
        let (count, mut i) = decode_uvarint(buf, 1)?;
        let mut events = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let (event, next) = self.decode_event(buf, i)?;
            i = next;
            let ts = event.timestamp().unwrap_or(0);
            events.push(event.to_json(&asset_id, ts));
        }
        warn_on_trailing_bytes("frame", buf, i);
        Ok(serde_json::to_string(&serde_json::Value::Array(events))
            .expect("serde_json::Value always serializes"))
    }

    fn decode_raw(&mut self, buf: &[u8]) -> Result<String> {
        let (s, i) = self.pool.decode(buf, 1)?;
        warn_on_trailing_bytes("raw", buf, i);
        Ok(serde_json::to_string(&s).expect("serde_json::Value always serializes"))
    }

    fn decode_event(&mut self, buf: &[u8], i: usize) -> Result<(Event, usize)> {
        let type_byte = *buf.get(i).ok_or(CodecError::TruncatedVarint)?;
        let i = i + 1;
        let (ts_raw, mut i) = decode_uvarint(buf, i)?;
        let ts_raw = ts_raw as i64;
        let ts_abs = type_byte & TB_TS_ABS != 0;
        let ts = if ts_abs {
            ts_raw
        } else {
            self.prev_ts.unwrap_or(0) + ts_raw
        };
        self.prev_ts = Some(ts);

        let event = match type_byte & TB_TYPE_MASK {
            crate::event::EVENT_TYPE_BOOK => {
                let (bids, next) = self.decode_levels(buf, i)?;
                i = next;
                let (asks, next) = self.decode_levels(buf, i)?;
                i = next;
                Event::Book {
                    timestamp: Some(ts),
                    bids,
                    asks,
                }
            }
            crate::event::EVENT_TYPE_PRICE_CHANGE => {
                let (count, next) = decode_uvarint(buf, i)?;
                i = next;
                let mut changes = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    let side_byte = *buf.get(i).ok_or(CodecError::TruncatedVarint)?;
                    i += 1;
                    let (price, next) = self.pool.decode(buf, i)?;
                    i = next;
                    let (size, next) = self.pool.decode(buf, i)?;
                    i = next;
                    changes.push(PriceChangeEntry {
                        side: Side::from_byte(side_byte),
                        price,
                        size,
                    });
                }
                Event::PriceChange {
                    timestamp: Some(ts),
                    changes,
                }
            }
            crate::event::EVENT_TYPE_TICK_SIZE_CHANGE => {
                let (old_tick_size, next) = self.pool.decode(buf, i)?;
                i = next;
                let (new_tick_size, next) = self.pool.decode(buf, i)?;
                i = next;
                Event::TickSizeChange {
                    timestamp: Some(ts),
                    old_tick_size,
                    new_tick_size,
                }
            }
            crate::event::EVENT_TYPE_LAST_TRADE_PRICE => {
                let (price, next) = self.pool.decode(buf, i)?;
                i = next;
                let (size, next) = self.pool.decode(buf, i)?;
                i = next;
                let side_byte = *buf.get(i).ok_or(CodecError::TruncatedVarint)?;
                i += 1;
                let fee_rate_bps = if type_byte & TB_OPT0 != 0 {
                    let (fee, next) = self.pool.decode(buf, i)?;
                    i = next;
                    Some(fee)
                } else {
                    None
                };
                Event::LastTradePrice {
                    timestamp: Some(ts),
                    price,
                    size,
                    side: Side::from_byte(side_byte),
                    fee_rate_bps,
                }
            }
            other => return Err(CodecError::UnknownEventType(other.to_string())),
        };
        Ok((event, i))
    }

    fn decode_levels(&mut self, buf: &[u8], i: usize) -> Result<(Vec<Level>, usize)> {
        let (count, mut i) = decode_uvarint(buf, i)?;
        let mut levels = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let (price, next) = self.pool.decode(buf, i)?;
            i = next;
            let (size, next) = self.pool.decode(buf, i)?;
            i = next;
            levels.push(Level { price, size });
        }
        Ok((levels, i))
    }

    fn require_asset_id(&self) -> Result<String> {
        self.asset_id
            .clone()
            .ok_or_else(|| CodecError::InvalidInput("frame decoded before any header".into()))
    }
}

/// Warns (§4.6: surplus bytes "SHOULD be flagged in a test build") if `i`
/// hasn't consumed all of `buf`. The decoder keeps the bytes it already
/// parsed rather than treating this as fatal — a forward-compatible
/// producer may append fields this version doesn't know about yet.
fn warn_on_trailing_bytes(record_kind: &str, buf: &[u8], i: usize) {
    if i < buf.len() {
        tracing::warn!(
            record_kind,
            consumed = i,
            total = buf.len(),
            surplus = buf.len() - i,
            "decoded V3 record with surplus trailing bytes"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compressor::Compressor;

    fn round_trip(frames: &[&str]) -> Vec<String> {
        let mut compressor = Compressor::new("ASSET1");
        let mut decompressor = Decompressor::new();
        let mut out = Vec::new();
        for frame in frames {
            let lines = compressor.compress(frame).unwrap().into_lines();
            for line in lines {
                if let Some(mut decoded) = decompressor.try_decode_line(&line).unwrap() {
                    out.append(&mut decoded);
                }
            }
        }
        out
    }

    #[test]
    fn book_snapshot_round_trips() {
        let text = r#"{"event_type":"book","asset_id":"ASSET1","timestamp":"1000","bids":[{"price":"0.50","size":"100"}],"asks":[{"price":"0.51","size":"50"}]}"#;
        let out = round_trip(&[text]);
        assert_eq!(out.len(), 1);
        let array: serde_json::Value = serde_json::from_str(&out[0]).unwrap();
        let value = &array[0];
        assert_eq!(value["event_type"], "book");
        assert_eq!(value["asset_id"], "ASSET1");
        assert_eq!(value["timestamp"], "1000");
    }

    #[test]
    fn backwards_timestamp_forces_an_absolute_re_anchor() {
        let first = r#"{"event_type":"tick_size_change","timestamp":"2000","old_tick_size":"0.01","new_tick_size":"0.001"}"#;
        let second = r#"{"event_type":"tick_size_change","timestamp":"1500","old_tick_size":"0.001","new_tick_size":"0.01"}"#;
        let out = round_trip(&[first, second]);
        let second_array: serde_json::Value = serde_json::from_str(&out[1]).unwrap();
        assert_eq!(second_array[0]["timestamp"], "1500");
    }

    #[test]
    fn last_trade_price_with_fee_round_trips() {
        let text = r#"{"event_type":"last_trade_price","timestamp":"1100","price":"0.55","size":"2","side":"BUY","fee_rate_bps":"25"}"#;
        let out = round_trip(&[text]);
        let array: serde_json::Value = serde_json::from_str(&out[0]).unwrap();
        assert_eq!(array[0]["fee_rate_bps"], "25");
        assert_eq!(array[0]["side"], "BUY");
    }

    #[test]
    fn frame_before_header_is_rejected() {
        let mut decompressor = Decompressor::new();
        let mut buf = vec![REC_FRAME];
        crate::varint::encode_uvarint(0, &mut buf);
        let line = crate::transport::deflate_raw_b64(&buf);
        assert!(matches!(
            decompressor.try_decode_line(&line),
            Err(CodecError::InvalidInput(_))
        ));
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let mut buf = vec![REC_HEADER];
        crate::varint::encode_uvarint(99, &mut buf);
        crate::varint::encode_uvarint(HEADER_FLAG_SINGLE_ASSET, &mut buf);
        crate::varint::encode_uvarint(0, &mut buf);
        crate::varint::encode_uvarint(1, &mut buf);
        crate::varint::encode_uvarint(1, &mut buf);
        buf.push(b'A');
        let line = crate::transport::deflate_raw_b64(&buf);
        let mut decompressor = Decompressor::new();
        assert!(matches!(
            decompressor.try_decode_line(&line),
            Err(CodecError::UnsupportedVersion(99))
        ));
    }

    #[test]
    fn raw_record_with_surplus_trailing_bytes_still_decodes() {
        let mut buf = vec![REC_RAW];
        crate::pool::StringPool::new().encode("PONG", &mut buf);
        buf.extend_from_slice(&[0xFF, 0xFF, 0xFF]);
        let line = crate::transport::deflate_raw_b64(&buf);
        let mut decompressor = Decompressor::new();
        let out = decompressor.try_decode_line(&line).unwrap().unwrap();
        assert_eq!(out, vec!["\"PONG\"".to_string()]);
    }

    #[test]
    fn non_v3_line_returns_none() {
        let mut decompressor = Decompressor::new();
        assert_eq!(decompressor.try_decode_line("PONG").unwrap(), None);
    }
}
