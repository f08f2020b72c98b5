//! Inbound and outbound message envelopes.
//!
//! Every message on the wire is a JSON object with a `type` discriminant
//! and camelCase keys, e.g.
//! `{ "type": "questionAnswered", "questionId": "...", "answerId": "..." }`.
//! The internally-tagged representation keeps the format easy to consume
//! from a browser client.

use serde::{Deserialize, Serialize};

use crate::{AnswerId, Player, PlayerId, QuestionId, QuestionView};

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// A combat action a player can spend power points on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Deal damage to a target's score; shields absorb part of it.
    Attack,
    /// Gain shields; self-only.
    Shield,
    /// Force a target to forfeit scoring on their next question.
    Skip,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Attack => write!(f, "attack"),
            Self::Shield => write!(f, "shield"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// Messages a client may send after connecting.
///
/// Parsed through [`parse_incoming`](crate::parse_incoming), never directly
/// with `serde_json::from_str`; the two-stage parse is what separates a
/// recoverable schema error from a fatal unknown message type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum IncomingMessage {
    /// The sender submits an answer for the active question.
    QuestionAnswered {
        question_id: QuestionId,
        answer_id: AnswerId,
    },

    /// The sender toggles their ready flag in the waiting room.
    TogglePlayerReady { player_id: PlayerId },

    /// The sender performs a combat action. `target_player_id` is required
    /// for attack and skip, absent for shield.
    PlayerAction {
        action: ActionKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_player_id: Option<PlayerId>,
    },
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// Messages the server sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OutgoingMessage {
    /// Unicast to a player right after they join: their assigned identity.
    SetUserId { user_id: PlayerId },

    /// Unicast to a player right after they join: the rule parameters the
    /// client UI needs (action costs, damage numbers, starting health).
    GameConfig { config: GameConfigPayload },

    /// Broadcast when a new question becomes active. Never contains the
    /// correct answer.
    AskQuestion { question: QuestionView },

    /// Broadcast whenever the player list changes (join, leave, ready).
    PlayerUpdate { players: Vec<Player> },

    /// Broadcast once every player has answered: the correct answer and
    /// the post-scoring player list.
    AnswerRevealed {
        question_id: QuestionId,
        answer_id: AnswerId,
        players: Vec<Player>,
    },

    /// Broadcast after an action attempt, successful or not.
    ActionResult {
        action: ActionKind,
        actor_id: PlayerId,
        #[serde(skip_serializing_if = "Option::is_none")]
        target_id: Option<PlayerId>,
        success: bool,
        message: String,
        players: Vec<Player>,
    },

    /// Broadcast when the question list is exhausted.
    GameFinished { players: Vec<Player> },

    /// Unicast to a single connection when something it sent was rejected.
    Error { error: String },
}

// ---------------------------------------------------------------------------
// Game config payload
// ---------------------------------------------------------------------------

/// The rule parameters shared with clients via [`OutgoingMessage::GameConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfigPayload {
    pub player: PlayerConfig,
    pub power_ups: PowerUpsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerConfig {
    pub starting_health: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerUpsConfig {
    pub attack: AttackConfig,
    pub shield: ShieldConfig,
    pub skip: SkipConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackConfig {
    pub cost: u32,
    pub base_damage: u32,
    pub power_points_drained: u32,
    pub shield_damage_reduction: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShieldConfig {
    pub cost: u32,
    pub shields_gained: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipConfig {
    pub cost: u32,
    pub power_points_drained: u32,
}
