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

//! Per-line raw-DEFLATE + base64url transport (§4.2) and the legacy
//! zlib-framed variant the tolerant reinflater also has to understand.

use std::io::{Read, Write};

use base64::{
    Engine as _,
    engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD},
};
use flate2::{Compression, read::ZlibDecoder, write::DeflateEncoder};

/// Compresses `data` with raw DEFLATE (no zlib/gzip framing) at maximum
/// level and base64url-encodes the result.
pub fn deflate_raw_b64(data: &[u8]) -> String {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(data)
        .expect("writing to an in-memory buffer cannot fail");
    let compressed = encoder
        .finish()
        .expect("finishing an in-memory buffer cannot fail");
    URL_SAFE_NO_PAD.encode(compressed)
}

/// Base64url-decodes `token` and inflates it as raw DEFLATE.
///
/// Returns `None` on any failure (bad base64, bad DEFLATE stream) — this is
/// the `NotV3` signal, not a fatal error.
pub fn inflate_raw_b64(token: &str) -> Option<Vec<u8>> {
    let bytes = decode_base64_padding_agnostic(token)?;
    let mut decoder = flate2::read::DeflateDecoder::new(&bytes[..]);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).ok()?;
    Some(out)
}

/// Base64url-decodes `token` and inflates it as zlib-framed DEFLATE (the
/// legacy wire format that predates V3).
pub fn inflate_legacy_zlib_b64(token: &str) -> Option<Vec<u8>> {
    let bytes = decode_base64_padding_agnostic(token)?;
    let mut decoder = ZlibDecoder::new(&bytes[..]);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).ok()?;
    Some(out)
}

/// Base64url decoding that tolerates both padded and unpadded input, since
/// the spec requires the transport to be "padding-agnostic".
fn decode_base64_padding_agnostic(token: &str) -> Option<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(token)
        .or_else(|_| URL_SAFE.decode(token))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_raw_deflate() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let line = deflate_raw_b64(data);
        assert!(!line.contains('\n'));
        let back = inflate_raw_b64(&line).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn rejects_garbage_as_not_v3() {
        assert!(inflate_raw_b64("not valid base64 !!!").is_none());
    }

    #[test]
    fn rejects_valid_base64_of_non_deflate_bytes() {
        let token = URL_SAFE_NO_PAD.encode(b"hello world, not a deflate stream");
        assert!(inflate_raw_b64(&token).is_none());
    }

    #[test]
    fn accepts_padded_and_unpadded_base64() {
        let data = b"abc";
        let unpadded = URL_SAFE_NO_PAD.encode(data);
        let padded = URL_SAFE.encode(data);
        assert_eq!(
            decode_base64_padding_agnostic(&unpadded),
            decode_base64_padding_agnostic(&padded)
        );
    }
}
