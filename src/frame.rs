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

//! Normalizes a raw websocket frame string into either a list of events or a
//! single opaque raw record (§4.5 steps 1-2).

use serde_json::Value;

use crate::{error::Result, event::Event};

/// What `Compressor::compress` normalizes a raw frame string into before
/// building a wire record.
pub enum Frame {
    /// One or more JSON events from the same server message.
    Events(Vec<Event>),
    /// Non-JSON text (a heartbeat like `"PONG"`), or a JSON scalar that
    /// isn't an object/array, carried as its re-serialized compact text.
    Raw(String),
}

impl Frame {
    /// Parses `text` per §4.5 steps 1-2: a JSON object becomes a one-event
    /// list, a JSON array is used as-is, anything else (including text that
    /// fails to parse as JSON at all) becomes a raw record.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::error::CodecError::UnknownEventType`] or
    /// [`crate::error::CodecError::InvalidInput`] from parsing an individual
    /// event object.
    pub fn parse(text: &str) -> Result<Self> {
        let Ok(value) = serde_json::from_str::<Value>(text) else {
            return Ok(Self::Raw(text.to_string()));
        };
        match value {
            Value::Object(_) => Ok(Self::Events(vec![Event::from_json(&value)?])),
            Value::Array(items) => {
                let events = items
                    .iter()
                    .map(Event::from_json)
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self::Events(events))
            }
            other => Ok(Self::Raw(compact_json(&other))),
        }
    }
}

fn compact_json(value: &Value) -> String {
    serde_json::to_string(value).expect("serde_json::Value always serializes")
}
