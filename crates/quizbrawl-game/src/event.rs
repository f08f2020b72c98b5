//! Domain events produced by game operations.

use quizbrawl_protocol::{ActionKind, AnswerId, Player, PlayerId, QuestionId, QuestionView};

/// What a game operation produced.
///
/// Events carry full player snapshots rather than deltas: clients replace
/// their roster wholesale on every update, so the lobby layer never has to
/// reconstruct state from the event stream.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A player joined the lobby.
    PlayerJoined { player: Player, players: Vec<Player> },

    /// A player left the lobby.
    PlayerLeft { player: Player, players: Vec<Player> },

    /// Roster state changed without anyone joining or leaving, e.g. a
    /// ready toggle.
    PlayersUpdated { players: Vec<Player> },

    /// All players readied up and the session began.
    GameStarted,

    /// A new question is live and awaiting answers.
    QuestionChanged { question: QuestionView },

    /// Every player answered; the correct answer and updated scores go out.
    AnswerRevealed {
        question_id: QuestionId,
        answer_id: AnswerId,
        players: Vec<Player>,
    },

    /// An action was attempted. `success` is false for rejected attempts
    /// (insufficient power points, invalid target); those still broadcast
    /// so everyone sees the failed move.
    ActionPerformed {
        action: ActionKind,
        actor_id: PlayerId,
        target_id: Option<PlayerId>,
        success: bool,
        message: String,
        players: Vec<Player>,
    },

    /// The question list is exhausted; final standings attached.
    GameFinished { players: Vec<Player> },
}
