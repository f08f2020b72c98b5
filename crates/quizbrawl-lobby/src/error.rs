//! Error types for the lobby layer.

use quizbrawl_game::GameError;

/// Errors from lobby operations.
#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    /// The lobby actor is gone (crashed or shut down); the command was
    /// not delivered.
    #[error("lobby {0} is unavailable")]
    Unavailable(String),

    /// The game rejected the operation. The message is safe to forward
    /// to the client that caused it.
    #[error(transparent)]
    Rejected(#[from] GameError),
}
