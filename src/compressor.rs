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

//! The stateful session compressor (§4.5): emits a header lazily on the
//! first frame, then one record per incoming raw frame string.

use crate::{
    error::Result,
    event::{Event, Level, PriceChangeEntry},
    frame::Frame,
    pool::StringPool,
    record::{HEADER_FLAG_SINGLE_ASSET, PROTOCOL_VERSION, REC_FRAME, REC_HEADER, REC_RAW},
    transport::deflate_raw_b64,
    varint::{encode_uvarint, encode_uvarint_signed},
};

/// Bit 5 of the type byte: set iff `ts_delta` carries an absolute timestamp.
const TB_TS_ABS: u8 = 1 << 5;
/// Bit 3 of the type byte: set iff a `last_trade_price` carries `fee_rate_bps`.
const TB_OPT0: u8 = 1 << 3;

/// What [`Compressor::compress`] returns: one line, or a header/frame pair
/// the first time a session produces output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emit {
    /// A single frame or raw record line.
    One(String),
    /// A header line followed by the frame or raw record line it gated.
    Pair(String, String),
}

impl Emit {
    /// Flattens this value into the lines it carries, in wire order.
    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        match self {
            Self::One(line) => vec![line],
            Self::Pair(header, line) => vec![header, line],
        }
    }
}

/// Stateful V3 compressor for a single asset's session.
///
/// Not safe to share across threads (§5): the string pool, `prev_ts`, and
/// header flag form a strictly ordered state machine.
pub struct Compressor {
    asset_id: String,
    pool: StringPool,
    prev_ts: Option<i64>,
    wrote_header: bool,
}

impl Compressor {
    /// Creates a compressor for `asset_id`; the header is not emitted until
    /// the first call to [`Compressor::compress`].
    #[must_use]
    pub fn new(asset_id: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            pool: StringPool::new(),
            prev_ts: None,
            wrote_header: false,
        }
    }

    /// Encodes one raw websocket frame string.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::CodecError::UnknownEventType`] if an event
    /// isn't one of the four known kinds, or
    /// [`crate::error::CodecError::InvalidInput`] if a timestamp encodes
    /// negative (callers should fall back to persisting the raw frame).
    pub fn compress(&mut self, raw_frame_text: &str) -> Result<Emit> {
        match Frame::parse(raw_frame_text)? {
            Frame::Raw(text) => {
                let header = self.ensure_header(None)?;
                let mut out = vec![REC_RAW];
                self.pool.encode(&text, &mut out);
                let line = deflate_raw_b64(&out);
                Ok(self.emit(header, line))
            }
            Frame::Events(events) => {
                let first_ts = events.iter().find_map(Event::timestamp);
                let header = self.ensure_header(first_ts)?;
                let mut out = vec![REC_FRAME];
                encode_uvarint(events.len() as u64, &mut out);
                for event in &events {
                    self.encode_event(event, &mut out)?;
                }
                let line = deflate_raw_b64(&out);
                Ok(self.emit(header, line))
            }
        }
    }

    fn emit(&self, header: Option<String>, line: String) -> Emit {
        match header {
            Some(header) => Emit::Pair(header, line),
            None => Emit::One(line),
        }
    }

    /// Emits the session header on the first call only, fixing `base_ts`
    /// from the first numeric timestamp seen (0 if none) and resetting the
    /// pool for the fresh session.
    fn ensure_header(&mut self, first_ts: Option<i64>) -> Result<Option<String>> {
        if self.wrote_header {
            return Ok(None);
        }
        let base_ts = first_ts.unwrap_or(0);
        self.prev_ts = Some(base_ts);

        let mut out = vec![REC_HEADER];
        encode_uvarint(PROTOCOL_VERSION, &mut out);
        encode_uvarint(HEADER_FLAG_SINGLE_ASSET, &mut out);
        encode_uvarint_signed(base_ts, &mut out)?;
        encode_uvarint(1, &mut out); // asset_count
        let asset_bytes = self.asset_id.as_bytes();
        encode_uvarint(asset_bytes.len() as u64, &mut out);
        out.extend_from_slice(asset_bytes);

        self.wrote_header = true;
        self.pool.reset();
        tracing::debug!(asset_id = %self.asset_id, base_ts, "emitted V3 session header");

        Ok(Some(deflate_raw_b64(&out)))
    }

    fn encode_event(&mut self, event: &Event, out: &mut Vec<u8>) -> Result<()> {
        let (ts_abs, ts_val) = self.next_timestamp(event.timestamp());

        let mut type_byte = event.type_code() & 0x07;
        if ts_abs {
            type_byte |= TB_TS_ABS;
        }
        if let Event::LastTradePrice {
            fee_rate_bps: Some(_),
            ..
        } = event
        {
            type_byte |= TB_OPT0;
        }

        out.push(type_byte);
        encode_uvarint_signed(ts_val, out)?;

        match event {
            Event::Book { bids, asks, .. } => {
                self.encode_levels(bids, out);
                self.encode_levels(asks, out);
            }
            Event::PriceChange { changes, .. } => self.encode_changes(changes, out),
            Event::TickSizeChange {
                old_tick_size,
                new_tick_size,
                ..
            } => {
                self.pool.encode(old_tick_size, out);
                self.pool.encode(new_tick_size, out);
            }
            Event::LastTradePrice {
                price,
                size,
                side,
                fee_rate_bps,
                ..
            } => {
                self.pool.encode(price, out);
                self.pool.encode(size, out);
                out.push(side.to_byte());
                if let Some(fee) = fee_rate_bps {
                    self.pool.encode(fee, out);
                }
            }
        }
        Ok(())
    }

    /// Computes `(ts_abs, ts_val)` per §4.4's timestamp encoding rule and
    /// advances `prev_ts`.
    fn next_timestamp(&mut self, ts: Option<i64>) -> (bool, i64) {
        match (self.prev_ts, ts) {
            (None, _) | (_, None) => {
                let ts_val = ts.unwrap_or(0);
                if let Some(ts) = ts {
                    self.prev_ts = Some(ts);
                }
                (true, ts_val)
            }
            (Some(prev), Some(ts)) if ts >= prev => {
                self.prev_ts = Some(ts);
                (false, ts - prev)
            }
            (Some(_), Some(ts)) => {
                self.prev_ts = Some(ts);
                (true, ts)
            }
        }
    }

    fn encode_levels(&mut self, levels: &[Level], out: &mut Vec<u8>) {
        encode_uvarint(levels.len() as u64, out);
        for level in levels {
            self.pool.encode(&level.price, out);
            self.pool.encode(&level.size, out);
        }
    }

    fn encode_changes(&mut self, changes: &[PriceChangeEntry], out: &mut Vec<u8>) {
        encode_uvarint(changes.len() as u64, out);
        for change in changes {
            out.push(change.side.to_byte());
            self.pool.encode(&change.price, out);
            self.pool.encode(&change.size, out);
        }
    }
}
