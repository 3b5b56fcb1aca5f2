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

//! A stateful binary codec for Polymarket order-book websocket frames
//! (the "V3 market-frame" wire format), plus a tolerant reinflater that
//! reconstructs JSON from mixed V3/legacy/wrapped logs.
//!
//! The session compressor ([`Compressor`]) and decompressor
//! ([`Decompressor`]) are mirror-image state machines: a header is emitted
//! (or consumed) once per session, after which every frame is a single
//! opaque, DEFLATE-compressed, base64url line. [`reinflate_file`] drives a
//! [`Decompressor`] over a log file that may also contain the legacy
//! zlib-framed transport or bare JSON, for logs spanning multiple codec
//! generations.

pub mod compressor;
pub mod decompressor;
pub mod error;
pub mod event;
pub mod frame;
pub mod legacy;
pub mod pool;
pub mod record;
pub mod reinflate;
pub mod transport;
pub mod varint;

pub use compressor::{Compressor, Emit};
pub use decompressor::Decompressor;
pub use error::{CodecError, Result};
pub use event::{Event, Level, PriceChangeEntry, Side};
pub use reinflate::reinflate_file;
