//! Error types for the game core.

use quizbrawl_protocol::{PlayerId, QuestionId};

/// Domain rule violations.
///
/// These are recoverable: the lobby layer reports them back to the player
/// who triggered them and the session is left untouched. Action failures
/// (insufficient power points, bad targets) are not errors; they surface
/// as `ActionPerformed { success: false }` events so every client sees the
/// failed attempt.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The game has left the waiting state and no longer accepts this
    /// operation.
    #[error("game has already started")]
    AlreadyStarted,

    /// A game cannot start with an empty question list.
    #[error("no questions provided")]
    NoQuestions,

    /// The lobby is at capacity.
    #[error("game cannot have more than {0} players")]
    GameFull(usize),

    /// The player id is already present in this game.
    #[error("player {0} already in game")]
    DuplicatePlayer(PlayerId),

    /// No player with this id is in the game.
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    /// An answer arrived while no question was awaiting answers.
    #[error("game is not awaiting answers")]
    NotAwaitingAnswer,

    /// Internal invariant breach: the active question has no entry in the
    /// answer key. Should be impossible for sets built by this crate.
    #[error("no correct answer recorded for question {0}")]
    AnswerKeyMissing(QuestionId),
}
