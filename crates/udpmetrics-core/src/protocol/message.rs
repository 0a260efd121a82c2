//! Inbound metric-update message (one JSON object per datagram).
//!
//! Decoding is lenient in the same places senders rely on: unknown fields are
//! ignored, and missing or `null` fields fall back to their empty value.
//! Anything that is not a JSON object of the right shape is a `Decode` error.

use serde::Deserialize;

use crate::error::{BridgeError, Result};
use crate::protocol::null_as_default;

/// Largest datagram the receiver reads; longer payloads are truncated by the socket.
pub const MAX_DATAGRAM_BYTES: usize = 2048;

/// Update operation requested by a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Add exactly 1, ignoring `value`.
    Increment,
    /// Add `value`.
    Add,
}

impl Command {
    /// Parse the wire spelling (`"inc"` / `"add"`).
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "inc" => Ok(Command::Increment),
            "add" => Ok(Command::Add),
            other => Err(BridgeError::UnsupportedCommand(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Command::Increment => "inc",
            Command::Add => "add",
        }
    }
}

/// Wire message: `{"name": .., "labels": [..], "command": "inc"|"add", "value": ..}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Message {
    /// Fully-qualified target metric name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Label values, matched by position against the definition's label names.
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Vec<String>,
    /// Raw command; validated when the update is applied.
    #[serde(default, deserialize_with = "null_as_default")]
    pub command: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: f64,
}

impl Message {
    /// Resolve the raw command string.
    pub fn command(&self) -> Result<Command> {
        Command::parse(&self.command)
    }
}

/// Decode one datagram payload.
pub fn decode(bytes: &[u8]) -> Result<Message> {
    serde_json::from_slice(bytes).map_err(|e| BridgeError::Decode(format!("invalid message json: {e}")))
}
