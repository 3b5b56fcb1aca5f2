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

//! Tolerance helpers the reinflater needs for non-V3 shapes (§4.7): key
//! stripping and the legacy zlib+base64 JSON fallback.

use serde_json::Value;

use crate::transport::inflate_legacy_zlib_b64;

/// Recursively removes the `market` and `hash` keys from every object in
/// `value`, matching what a V3-decoded event always omits.
pub fn strip_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(k, _)| k != "market" && k != "hash")
                .map(|(k, v)| (k, strip_keys(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_keys).collect()),
        other => other,
    }
}

/// Decodes `token` as legacy zlib-framed base64 JSON and renders the
/// stripped result as compact JSON text.
#[must_use]
pub fn try_decode_legacy_zlib_json(token: &str) -> Option<String> {
    let bytes = inflate_legacy_zlib_b64(token)?;
    let text = String::from_utf8(bytes).ok()?;
    let value: Value = serde_json::from_str(&text).ok()?;
    Some(compact(strip_keys(value)))
}

/// Interprets a bare non-V3, non-legacy string as JSON (§4.7 step 3): a
/// `{`/`[` prefix parses directly, a `"` prefix parses as a JSON string that
/// may itself contain nested JSON text.
#[must_use]
pub fn maybe_json_value(line: &str) -> Option<String> {
    let s = line.trim();
    let first = s.chars().next()?;
    match first {
        '{' | '[' => {
            let value: Value = serde_json::from_str(s).ok()?;
            Some(compact(strip_keys(value)))
        }
        '"' => {
            let inner: Value = serde_json::from_str(s).ok()?;
            let Value::String(inner) = inner else {
                return None;
            };
            if let Some(c) = inner.chars().next() {
                if (c == '[' || c == '{')
                    && let Ok(nested) = serde_json::from_str::<Value>(&inner)
                {
                    return Some(compact(strip_keys(nested)));
                }
            }
            Some(compact(Value::String(inner)))
        }
        _ => None,
    }
}

fn compact(value: Value) -> String {
    serde_json::to_string(&value).expect("serde_json::Value always serializes")
}
