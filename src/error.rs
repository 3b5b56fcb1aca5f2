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

//! Error types for the V3 market-frame codec.
//!
//! `NotV3` is deliberately absent from this enum: a line that fails the
//! base64/DEFLATE/leading-byte checks is not malformed, it simply isn't a
//! V3 record, so that case is represented as `Ok(None)` rather than `Err`.

pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors raised by the string pool, varint codec, event codec, and session
/// compressor/decompressor.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// A varint continuation byte was required but the buffer ended.
    #[error("truncated varint")]
    TruncatedVarint,
    /// A varint ran past 10 continuation bytes without terminating.
    #[error("varint overflow")]
    VarintOverflow,
    /// A string pool reference pointed outside the interned range.
    #[error("bad string pool reference: {idx}")]
    BadStringRef {
        /// The out-of-range index that was referenced.
        idx: usize,
    },
    /// A string pool literal's declared length ran past the buffer end.
    #[error("string pool literal overflow")]
    LiteralOverflow,
    /// The session header declared a protocol version other than 3.
    #[error("unsupported V3 version: {0}")]
    UnsupportedVersion(u64),
    /// An event carried (or decoded to) an `event_type` the codec doesn't know.
    #[error("unknown event type: {0}")]
    UnknownEventType(String),
    /// The input was structurally invalid for the operation attempted
    /// (a negative timestamp, a non-object/array JSON root, malformed UTF-8).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
