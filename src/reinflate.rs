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

//! The tolerant reinflater (§4.7): reads a file of mixed V3/legacy/wrapped
//! records and writes reconstructed JSON, either NDJSON or a single array.

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use serde_json::Value;

use crate::{
    decompressor::Decompressor,
    legacy::{maybe_json_value, strip_keys, try_decode_legacy_zlib_json},
};

/// One entry read from the input file, before any decoding is attempted.
enum Entry {
    Object(serde_json::Map<String, Value>),
    String(String),
    Other(Value),
}

/// Reads `path` as a JSON array if possible, otherwise as newline-delimited
/// text (§4.7: "may be (a) a JSON array, (b) newline-delimited records").
fn iter_any_entries(path: &Path) -> io::Result<Vec<Entry>> {
    let text = fs::read_to_string(path)?;
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(&text) {
        return Ok(items.into_iter().map(classify).collect());
    }
    Ok(text
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| classify_line(line))
        .collect())
}

fn classify(value: Value) -> Entry {
    match value {
        Value::Object(map) => Entry::Object(map),
        Value::String(s) => Entry::String(s),
        other => Entry::Other(other),
    }
}

fn classify_line(line: &str) -> Entry {
    match serde_json::from_str::<Value>(line) {
        Ok(value) => classify(value),
        Err(_) => Entry::String(line.to_string()),
    }
}

/// Decodes one [`Entry`] into zero or more compact JSON text lines,
/// advancing `decompressor`'s session state as V3 lines are consumed.
fn process_entry(decompressor: &mut Decompressor, entry: Entry) -> Vec<String> {
    match entry {
        Entry::Object(map) => process_object(decompressor, map),
        Entry::String(s) => process_string(decompressor, &s),
        Entry::Other(value) => vec![compact(strip_keys(value))],
    }
}

fn process_object(
    decompressor: &mut Decompressor,
    map: serde_json::Map<String, Value>,
) -> Vec<String> {
    if let Some(Value::String(c)) = map.get("c") {
        if let Ok(Some(lines)) = decompressor.try_decode_line(c) {
            return lines;
        }
        if let Some(line) = try_decode_legacy_zlib_json(c) {
            return vec![line];
        }
    }
    if let Some(Value::String(c)) = map.get("compressed") {
        if let Ok(Some(lines)) = decompressor.try_decode_line(c) {
            return lines;
        }
    }
    if let Some(m) = map.get("m") {
        if let Value::Object(m_obj) = m {
            if let Some(Value::String(raw)) = m_obj.get("_raw") {
                return vec![compact(Value::String(raw.clone()))];
            }
        }
        return vec![compact(strip_keys(m.clone()))];
    }
    vec![compact(strip_keys(Value::Object(map)))]
}

fn process_string(decompressor: &mut Decompressor, s: &str) -> Vec<String> {
    match decompressor.try_decode_line(s) {
        Ok(Some(lines)) => return lines,
        Ok(None) => {}
        Err(err) => {
            tracing::error!(error = %err, "skipping malformed V3 record");
            return Vec::new();
        }
    }
    if let Some(line) = try_decode_legacy_zlib_json(s) {
        return vec![line];
    }
    if let Some(line) = maybe_json_value(s) {
        return vec![line];
    }
    vec![compact(Value::String(s.to_string()))]
}

fn compact(value: Value) -> String {
    serde_json::to_string(&value).expect("serde_json::Value always serializes")
}

/// Reads `input_path` (mixed V3/legacy/wrapped records) and writes
/// reconstructed JSON to `output_path`: NDJSON when `array` is `false`, a
/// single JSON array when `true`.
///
/// # Errors
///
/// Returns an [`io::Error`] if `input_path` can't be read or `output_path`
/// can't be written.
pub fn reinflate_file(input_path: &Path, output_path: &Path, array: bool) -> io::Result<()> {
    let entries = iter_any_entries(input_path)?;
    let mut decompressor = Decompressor::new();
    let mut values = Vec::new();
    for entry in entries {
        values.extend(process_entry(&mut decompressor, entry));
    }

    let mut out = fs::File::create(output_path)?;
    if array {
        write!(out, "[{}]", values.join(","))?;
    } else {
        for line in &values {
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}
