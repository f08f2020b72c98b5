//! Error types for the protocol layer.

/// Errors that can occur while handling wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The payload is not valid JSON, or it is JSON of the wrong shape
    /// (missing fields, non-UUID ids, bad enum values). Recoverable: the
    /// sender gets an error message and the connection stays open.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// The `type` discriminant is not one the server recognizes. Fatal for
    /// the sending connection only.
    #[error("unknown message type: {0}")]
    UnknownType(String),

    /// Serializing an outbound message failed.
    #[error("encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ProtocolError {
    /// Whether the originating connection should be closed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::UnknownType(_))
    }
}
