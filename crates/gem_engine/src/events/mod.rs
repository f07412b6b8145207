//! Host message protocol
//!
//! The embedding host talks to the runtime with JSON objects of the form
//! `{"type": "...", ...payload}`. The host is untrusted: [`parse_message`] is
//! total, mapping anything it does not understand to an error or to
//! [`HostMessage::Unknown`], never panicking. Outbound messages are typed
//! ([`OutboundMessage`]) and addressed with a [`Recipient`].

pub mod channel;

pub use channel::{
    initial_snapshot, ChannelState, ConfigCommand, ConfigurationChannel, SnapshotUpdate,
};

use serde::{Deserialize, Serialize};

use crate::error::ConfiguratorError;
use crate::scene::snapshot::EngravingStyle;

/// Opaque identity of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SenderId(pub u64);

/// A raw inbound message and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEnvelope {
    /// Sender the reply (if any) goes back to
    pub origin: SenderId,
    /// JSON text as received
    pub payload: String,
}

impl InboundEnvelope {
    /// Wrap a payload
    pub fn new(origin: SenderId, payload: impl Into<String>) -> Self {
        Self {
            origin,
            payload: payload.into(),
        }
    }
}

/// A recognised inbound message
#[derive(Debug, Clone, PartialEq)]
pub enum HostMessage {
    /// Mutates the snapshot through the configuration channel
    Command(ConfigCommand),
    /// Synchronous query for the current engraving text
    GetEngravingText,
    /// Well-formed message of a type this runtime does not handle
    Unknown(String),
}

/// Wire form of the recognised message types
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum WireMessage {
    ChangeModel {
        #[serde(rename = "modelType")]
        model_type: String,
    },
    MaterialChange {
        material: String,
    },
    DiamondChange {
        diamond: String,
    },
    ChangeEngravingText {
        text: String,
    },
    GetEngravingText,
    ChangeEngravingStyle(EngravingStyle),
    CameraDistanceChange {
        distance: f32,
    },
}

const KNOWN_TYPES: &[&str] = &[
    "changeModel",
    "materialChange",
    "diamondChange",
    "changeEngravingText",
    "getEngravingText",
    "changeEngravingStyle",
    "cameraDistanceChange",
];

impl From<WireMessage> for HostMessage {
    fn from(message: WireMessage) -> Self {
        match message {
            WireMessage::ChangeModel { model_type } => Self::Command(ConfigCommand::SelectModel(model_type)),
            WireMessage::MaterialChange { material } => Self::Command(ConfigCommand::SelectMetal(material)),
            WireMessage::DiamondChange { diamond } => Self::Command(ConfigCommand::SelectGem(diamond)),
            WireMessage::ChangeEngravingText { text } => {
                Self::Command(ConfigCommand::SetEngravingText(text))
            }
            WireMessage::GetEngravingText => Self::GetEngravingText,
            WireMessage::ChangeEngravingStyle(style) => {
                Self::Command(ConfigCommand::SetEngravingStyle(style))
            }
            WireMessage::CameraDistanceChange { distance } => {
                Self::Command(ConfigCommand::SetCameraDistance(distance))
            }
        }
    }
}

/// Parse an inbound JSON message
///
/// Malformed JSON, a missing or non-string `type`, and recognised types with
/// bad payloads are protocol errors. Unrecognised types are returned as
/// [`HostMessage::Unknown`] so callers can ignore them quietly.
pub fn parse_message(raw: &str) -> Result<HostMessage, ConfiguratorError> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| ConfiguratorError::Protocol(format!("invalid JSON: {e}")))?;

    let kind = value
        .get("type")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| ConfiguratorError::Protocol("message has no string 'type'".to_string()))?;

    if !KNOWN_TYPES.contains(&kind) {
        return Ok(HostMessage::Unknown(kind.to_string()));
    }

    let kind = kind.to_string();
    serde_json::from_value::<WireMessage>(value)
        .map(HostMessage::from)
        .map_err(|e| ConfiguratorError::Protocol(format!("bad '{kind}' payload: {e}")))
}

/// Messages sent to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundMessage {
    /// The runtime is listening
    Ready,
    /// Reply to `getEngravingText`
    CurrentEngravingText {
        /// Engraving text at the time of the query
        text: String,
    },
}

impl OutboundMessage {
    /// JSON encoding
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Who an outbound message is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recipient {
    /// The embedding host as a whole
    Host,
    /// The sender of a specific inbound message
    Sender(SenderId),
}

/// Delivery of outbound messages to the host
pub trait HostSink {
    /// Deliver `message` to `recipient`
    fn post(&mut self, recipient: Recipient, message: &OutboundMessage);
}
