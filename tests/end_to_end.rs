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

//! Full compress -> decompress round trips for the six concrete end-to-end
//! scenarios and crate-level invariants.

use polymarket_codec::{Compressor, Decompressor, Emit};
use serde_json::Value;

const ASSET: &str = "60877...0774";

/// Runs `frames` through a matched compressor/decompressor pair and
/// flattens each frame's decoded JSON array into individual event values,
/// since a frame record decodes to one JSON-array line per input frame.
fn run_session(frames: &[&str]) -> Vec<Value> {
    let mut compressor = Compressor::new(ASSET);
    let mut decompressor = Decompressor::new();
    let mut out = Vec::new();
    for frame in frames {
        let lines = compressor.compress(frame).unwrap().into_lines();
        for line in lines {
            if let Some(decoded) = decompressor.try_decode_line(&line).unwrap() {
                for text in decoded {
                    let value: Value = serde_json::from_str(&text).unwrap();
                    match value {
                        Value::Array(events) => out.extend(events),
                        other => out.push(other),
                    }
                }
            }
        }
    }
    out
}

#[test]
fn scenario_book_snapshot() {
    let input = r#"{"event_type":"book","asset_id":"A","market":"m","hash":"h","timestamp":"1000","bids":[{"price":"0.5","size":"10"}],"asks":[{"price":"0.6","size":"5"}]}"#;
    let out = run_session(&[input]);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["event_type"], "book");
    assert_eq!(out[0]["asset_id"], ASSET);
    assert_eq!(out[0]["timestamp"], "1000");
    assert_eq!(out[0]["bids"][0]["price"], "0.5");
    assert_eq!(out[0]["asks"][0]["size"], "5");
    assert!(out[0].get("market").is_none());
    assert!(out[0].get("hash").is_none());
}

#[test]
fn scenario_price_change_with_delta_reuses_pooled_price() {
    let first = r#"{"event_type":"book","asset_id":"A","timestamp":"1000","bids":[{"price":"0.5","size":"10"}],"asks":[{"price":"0.6","size":"5"}]}"#;
    let second = r#"{"event_type":"price_change","asset_id":"A","timestamp":"1050","changes":[{"side":"sell","price":"0.5","size":"0"}]}"#;
    let out = run_session(&[first, second]);
    assert_eq!(out[1]["event_type"], "price_change");
    assert_eq!(out[1]["timestamp"], "1050");
    assert_eq!(out[1]["changes"][0]["side"], "SELL");
    assert_eq!(out[1]["changes"][0]["price"], "0.5");
}

#[test]
fn scenario_backwards_timestamp_re_anchors_absolute() {
    let first = r#"{"event_type":"book","asset_id":"A","timestamp":"1000","bids":[],"asks":[]}"#;
    let second = r#"{"event_type":"last_trade_price","asset_id":"A","timestamp":"900","price":"0.55","size":"2","side":"BUY"}"#;
    let out = run_session(&[first, second]);
    assert_eq!(out[1]["timestamp"], "900");
    assert_eq!(out[1]["side"], "BUY");
}

#[test]
fn scenario_last_trade_price_with_fee() {
    let input = r#"{"event_type":"last_trade_price","asset_id":"A","timestamp":"1100","price":"0.55","size":"2","side":"BUY","fee_rate_bps":"25"}"#;
    let out = run_session(&[input]);
    assert_eq!(out[0]["fee_rate_bps"], "25");
}

#[test]
fn scenario_tick_size_change_round_trips_exactly() {
    let input = r#"{"event_type":"tick_size_change","asset_id":"A","timestamp":"1200","old_tick_size":"0.01","new_tick_size":"0.001"}"#;
    let out = run_session(&[input]);
    assert_eq!(out[0]["old_tick_size"], "0.01");
    assert_eq!(out[0]["new_tick_size"], "0.001");
}

#[test]
fn scenario_heartbeat_emits_json_string() {
    let mut compressor = Compressor::new(ASSET);
    let mut decompressor = Decompressor::new();
    let lines = compressor.compress("PONG").unwrap().into_lines();
    let mut out = Vec::new();
    for line in lines {
        if let Some(decoded) = decompressor.try_decode_line(&line).unwrap() {
            out.extend(decoded);
        }
    }
    assert_eq!(out, vec!["\"PONG\"".to_string()]);
}

#[test]
fn header_is_idempotent_across_many_frames() {
    let mut compressor = Compressor::new(ASSET);
    let first = compressor
        .compress(r#"{"event_type":"tick_size_change","timestamp":"1","old_tick_size":"0.01","new_tick_size":"0.001"}"#)
        .unwrap();
    assert!(matches!(first, Emit::Pair(_, _)));
    for _ in 0..5 {
        let emit = compressor
            .compress(r#"{"event_type":"tick_size_change","timestamp":"2","old_tick_size":"0.01","new_tick_size":"0.001"}"#)
            .unwrap();
        assert!(matches!(emit, Emit::One(_)));
    }
}

#[test]
fn empty_levels_round_trip() {
    let input = r#"{"event_type":"book","asset_id":"A","timestamp":"1","bids":[],"asks":[]}"#;
    let out = run_session(&[input]);
    assert_eq!(out[0]["bids"].as_array().unwrap().len(), 0);
    assert_eq!(out[0]["asks"].as_array().unwrap().len(), 0);
}

#[test]
fn duplicate_price_size_pairs_intern_once_but_decode_twice() {
    let input = r#"{"event_type":"book","asset_id":"A","timestamp":"1","bids":[{"price":"0.5","size":"10"},{"price":"0.5","size":"10"}],"asks":[]}"#;
    let out = run_session(&[input]);
    let bids = out[0]["bids"].as_array().unwrap();
    assert_eq!(bids.len(), 2);
    assert_eq!(bids[0]["price"], "0.5");
    assert_eq!(bids[1]["price"], "0.5");
}

#[test]
fn mixed_side_price_change_with_zero_size() {
    let input = r#"{"event_type":"price_change","asset_id":"A","timestamp":"1","changes":[{"side":"buy","price":"0.1","size":"0"},{"side":"sell","price":"0.2","size":"5"}]}"#;
    let out = run_session(&[input]);
    let changes = out[0]["changes"].as_array().unwrap();
    assert_eq!(changes[0]["side"], "BUY");
    assert_eq!(changes[0]["size"], "0");
    assert_eq!(changes[1]["side"], "SELL");
}

#[test]
fn last_trade_price_with_and_without_fee_in_the_same_session() {
    let with_fee = r#"{"event_type":"last_trade_price","asset_id":"A","timestamp":"1","price":"0.5","size":"1","side":"BUY","fee_rate_bps":"10"}"#;
    let without_fee = r#"{"event_type":"last_trade_price","asset_id":"A","timestamp":"2","price":"0.5","size":"1","side":"BUY"}"#;
    let out = run_session(&[with_fee, without_fee]);
    assert_eq!(out[0]["fee_rate_bps"], "10");
    assert!(out[1].get("fee_rate_bps").is_none());
}
