use super::error::RelayError;
use super::state::MatchSnapshot;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Message types the router knows how to dispatch
const MESSAGE_TYPES: [&str; 4] = ["join", "pass-turn", "signal", "ice-candidate"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    Join {
        nickname: String,
    },
    PassTurn,

    // Peer-connection setup, relayed verbatim
    Signal(Map<String, Value>),
    IceCandidate(Map<String, Value>),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
}

impl ClientMessage {
    /// Decode a raw text frame. An unknown `type` is reported separately from
    /// a payload that is not valid for a known type.
    pub fn decode(raw: &str) -> Result<Self, RelayError> {
        let envelope: Envelope = serde_json::from_str(raw)?;
        if !MESSAGE_TYPES.contains(&envelope.kind.as_str()) {
            return Err(RelayError::UnrecognizedMessageType(envelope.kind));
        }
        Ok(serde_json::from_str(raw)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Participants { users: Vec<String> },
    Estado { estado: MatchSnapshot },
}

impl ServerMessage {
    /// Serialize once so a broadcast can share the text across connections
    pub fn to_payload(&self) -> Result<Arc<str>, serde_json::Error> {
        serde_json::to_string(self).map(Arc::from)
    }
}
