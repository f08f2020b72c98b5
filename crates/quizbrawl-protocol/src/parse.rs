//! Two-stage parsing of untrusted inbound payloads.
//!
//! Stage one looks only at the `type` discriminant to decide whether the
//! message is one we recognize at all. Stage two runs the full typed
//! deserialization. The split matters for error handling: a recognized
//! type with a bad body is a recoverable validation error reported back to
//! the sender, while an unrecognized type is a protocol violation that
//! closes the offending connection.

use serde_json::Value;

use crate::{IncomingMessage, OutgoingMessage, ProtocolError};

/// The `type` values the server accepts from clients.
const KNOWN_TYPES: &[&str] = &["questionAnswered", "togglePlayerReady", "playerAction"];

/// Parses an inbound text payload into a typed [`IncomingMessage`].
///
/// # Errors
///
/// - [`ProtocolError::InvalidMessage`]: not JSON, no string `type` field,
///   or a recognized type whose body fails schema validation. Recoverable.
/// - [`ProtocolError::UnknownType`]: a `type` the server does not speak.
///   Fatal for the sending connection.
pub fn parse_incoming(payload: &str) -> Result<IncomingMessage, ProtocolError> {
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| ProtocolError::InvalidMessage(e.to_string()))?;

    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ProtocolError::InvalidMessage("missing `type` field".into()))?;

    if !KNOWN_TYPES.contains(&kind) {
        return Err(ProtocolError::UnknownType(kind.to_string()));
    }

    serde_json::from_value(value).map_err(|e| ProtocolError::InvalidMessage(e.to_string()))
}

/// Serializes an outbound message into its JSON wire form.
pub fn encode_outgoing(msg: &OutgoingMessage) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(msg)?)
}
