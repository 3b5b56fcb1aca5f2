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

//! Record kind and header flag bytes shared by the compressor and
//! decompressor (§4.5).

/// Header record: version, flags, base timestamp, and asset ids.
pub const REC_HEADER: u8 = 0x48; // 'H'
/// Frame record: a varint event count followed by that many events.
pub const REC_FRAME: u8 = 0x46; // 'F'
/// Raw record: a single pooled opaque string.
pub const REC_RAW: u8 = 0x58; // 'X'

/// Header flags bit 0: single-asset mode (the only mode the protocol uses).
pub const HEADER_FLAG_SINGLE_ASSET: u64 = 1 << 0;

/// The only protocol version this codec understands.
pub const PROTOCOL_VERSION: u64 = 3;
