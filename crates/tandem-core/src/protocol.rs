use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::events::{ClientEvent, ServerEvent};

/// Encoding used on a single connection.
///
/// JSON travels in text frames, MessagePack (with named fields, so the payload
/// shapes stay identical to the JSON form) in binary frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    #[default]
    Json,
    #[serde(alias = "messagepack")]
    Msgpack,
}

/// A single encoded frame, ready to be handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
}

#[derive(Debug)]
pub enum ProtocolError {
    SerializeError(String),
    DeserializeError(String),
    /// Frame kind does not match the connection's wire format.
    UnexpectedFrame(WireFormat),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SerializeError(e) => write!(f, "serialize error: {e}"),
            Self::DeserializeError(e) => write!(f, "deserialize error: {e}"),
            Self::UnexpectedFrame(format) => {
                write!(f, "unexpected frame kind for {format:?} connection")
            },
        }
    }
}

impl std::error::Error for ProtocolError {}

fn encode<T: Serialize>(value: &T, format: WireFormat) -> Result<Frame, ProtocolError> {
    match format {
        WireFormat::Json => serde_json::to_string(value)
            .map(Frame::Text)
            .map_err(|e| ProtocolError::SerializeError(e.to_string())),
        WireFormat::Msgpack => rmp_serde::to_vec_named(value)
            .map(Frame::Binary)
            .map_err(|e| ProtocolError::SerializeError(e.to_string())),
    }
}

fn decode<T: DeserializeOwned>(frame: &Frame, format: WireFormat) -> Result<T, ProtocolError> {
    match (format, frame) {
        (WireFormat::Json, Frame::Text(text)) => {
            serde_json::from_str(text).map_err(|e| ProtocolError::DeserializeError(e.to_string()))
        },
        (WireFormat::Msgpack, Frame::Binary(data)) => rmp_serde::from_slice(data)
            .map_err(|e| ProtocolError::DeserializeError(e.to_string())),
        _ => Err(ProtocolError::UnexpectedFrame(format)),
    }
}

/// Encode a `ServerEvent` for a connection using `format`.
pub fn encode_server_event(event: &ServerEvent, format: WireFormat) -> Result<Frame, ProtocolError> {
    encode(event, format)
}

/// Decode an incoming frame into a `ClientEvent`.
pub fn decode_client_event(frame: &Frame, format: WireFormat) -> Result<ClientEvent, ProtocolError> {
    decode(frame, format)
}

/// Encode a `ClientEvent` (client side of the wire).
pub fn encode_client_event(event: &ClientEvent, format: WireFormat) -> Result<Frame, ProtocolError> {
    encode(event, format)
}

/// Decode a server frame (client side of the wire).
pub fn decode_server_event(frame: &Frame, format: WireFormat) -> Result<ServerEvent, ProtocolError> {
    decode(frame, format)
}
