//! Unified error type for the server binary.

use quizbrawl_lobby::LobbyError;
use quizbrawl_protocol::ProtocolError;
use quizbrawl_questions::QuestionSourceError;

/// Top-level error that wraps every layer's errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts lower-level errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A socket-level failure (bind, accept).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A WebSocket handshake or framing failure.
    #[error(transparent)]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Configuration could not be loaded or parsed.
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    /// A lobby-level failure (actor gone, join rejected).
    #[error(transparent)]
    Lobby(#[from] LobbyError),

    /// A wire message could not be encoded or parsed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The question service client could not be built.
    #[error(transparent)]
    Questions(#[from] QuestionSourceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_lobby_error() {
        let err = LobbyError::Unavailable("ROOM1".into());
        let server_err: ServerError = err.into();
        assert!(matches!(server_err, ServerError::Lobby(_)));
        assert!(server_err.to_string().contains("ROOM1"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::UnknownType("flyToMoon".into());
        let server_err: ServerError = err.into();
        assert!(matches!(server_err, ServerError::Protocol(_)));
    }

    #[test]
    fn test_from_io_error() {
        let err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "busy");
        let server_err: ServerError = err.into();
        assert!(matches!(server_err, ServerError::Io(_)));
    }
}
