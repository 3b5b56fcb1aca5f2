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

//! Session-lived string pool (§4.3): deduplicates recurring strings (prices,
//! sizes) across a session with a literal-or-reference varint wire encoding.

use std::collections::HashMap;

use crate::{
    error::{CodecError, Result},
    varint::{decode_uvarint, encode_uvarint},
};

/// Assigns small integer IDs to first-seen strings within a session.
///
/// ID 0 is reserved and never assigned; encoder and decoder pools are
/// required to evolve identically given corresponding byte streams.
#[derive(Debug, Clone)]
pub struct StringPool {
    by_string: HashMap<String, u32>,
    by_id: Vec<String>,
    next_id: u32,
}

impl Default for StringPool {
    fn default() -> Self {
        Self::new()
    }
}

impl StringPool {
    /// Creates an empty pool with `next_id` starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_string: HashMap::new(),
            // Index 0 is the reserved/unused slot; never returned by `decode`.
            by_id: vec![String::new()],
            next_id: 1,
        }
    }

    /// Encodes `s` as a literal (and interns it) or a reference to an
    /// already-interned occurrence, appending the wire bytes to `out`.
    pub fn encode(&mut self, s: &str, out: &mut Vec<u8>) {
        if let Some(&id) = self.by_string.get(s) {
            encode_uvarint(u64::from(id) << 1, out);
            return;
        }
        let bytes = s.as_bytes();
        encode_uvarint((bytes.len() as u64) << 1 | 1, out);
        out.extend_from_slice(bytes);
        self.intern(s);
    }

    /// Decodes one pooled string starting at `buf[i]`, returning it and the
    /// index immediately past it.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::BadStringRef`] for an out-of-range reference, or
    /// [`CodecError::LiteralOverflow`] if a literal's length runs past the
    /// buffer.
    pub fn decode(&mut self, buf: &[u8], i: usize) -> Result<(String, usize)> {
        let (v, i) = decode_uvarint(buf, i)?;
        if v & 1 == 0 {
            let idx = (v >> 1) as usize;
            if idx == 0 || idx >= self.next_id as usize {
                return Err(CodecError::BadStringRef { idx });
            }
            return Ok((self.by_id[idx].clone(), i));
        }
        let len = (v >> 1) as usize;
        let end = i.checked_add(len).ok_or(CodecError::LiteralOverflow)?;
        if end > buf.len() {
            return Err(CodecError::LiteralOverflow);
        }
        let s = std::str::from_utf8(&buf[i..end])
            .map_err(|_| CodecError::InvalidInput("string pool literal is not valid UTF-8".into()))?
            .to_string();
        self.intern(&s);
        Ok((s, end))
    }

    /// Clears the map and resets `next_id` to 1, as happens at every session
    /// header boundary.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn intern(&mut self, s: &str) {
        self.by_string.insert(s.to_string(), self.next_id);
        self.by_id.push(s.to_string());
        self.next_id += 1;
    }
}
