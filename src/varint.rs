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

//! Unsigned LEB128 varint encoding over a byte buffer.

use crate::error::{CodecError, Result};

/// Appends the unsigned LEB128 encoding of `n` to `out`.
pub fn encode_uvarint(mut n: u64, out: &mut Vec<u8>) {
    while n > 0x7F {
        out.push(((n & 0x7F) as u8) | 0x80);
        n >>= 7;
    }
    out.push((n & 0x7F) as u8);
}

/// Encodes `n` as an unsigned LEB128 varint, rejecting negative values.
///
/// # Errors
///
/// Returns [`CodecError::InvalidInput`] if `n` is negative.
pub fn encode_uvarint_signed(n: i64, out: &mut Vec<u8>) -> Result<()> {
    if n < 0 {
        return Err(CodecError::InvalidInput(format!(
            "uvarint negative: {n}"
        )));
    }
    encode_uvarint(n as u64, out);
    Ok(())
}

/// Decodes an unsigned LEB128 varint from `buf` starting at `i`.
///
/// Returns the decoded value and the index immediately past it.
///
/// # Errors
///
/// Returns [`CodecError::TruncatedVarint`] if the buffer ends mid-varint, or
/// [`CodecError::VarintOverflow`] if more than 10 continuation bytes are read.
pub fn decode_uvarint(buf: &[u8], mut i: usize) -> Result<(u64, usize)> {
    let mut shift: u32 = 0;
    let mut x: u64 = 0;
    loop {
        let b = *buf.get(i).ok_or(CodecError::TruncatedVarint)?;
        i += 1;
        x |= ((b & 0x7F) as u64) << shift;
        if b & 0x80 == 0 {
            return Ok((x, i));
        }
        shift += 7;
        if shift > 70 {
            return Err(CodecError::VarintOverflow);
        }
    }
}
