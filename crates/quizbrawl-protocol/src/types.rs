//! Core protocol types shared between the game core and the wire format.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// Newtype over a UUIDv4. `#[serde(transparent)]` keeps the wire format a
/// plain UUID string, so `PlayerId` and a raw `"xxxxxxxx-..."` are
/// interchangeable for clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Generates a fresh random player id.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub Uuid);

impl QuestionId {
    /// Generates a fresh random question id.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for one answer option of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerId(pub Uuid);

impl AnswerId {
    /// Generates a fresh random answer id.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for AnswerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A player as seen by every client in the lobby.
///
/// `score` doubles as health: attacks reduce it, and a player whose score
/// reaches zero is eliminated. Both `score` and `power_points` are unsigned
/// and saturate at zero rather than going negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
    pub power_points: u32,
    pub shields: u32,
    pub skip_next_question: bool,
    pub is_ready: bool,
}

// ---------------------------------------------------------------------------
// Question (client-facing view)
// ---------------------------------------------------------------------------

/// One answer option of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: AnswerId,
    pub text: String,
}

/// The client-facing projection of a question.
///
/// Deliberately excludes the correct answer id and any submission
/// bookkeeping; clients must never learn the answer before the reveal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionView {
    pub id: QuestionId,
    pub text: String,
    pub answers: Vec<Answer>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_serializes_as_plain_uuid_string() {
        let id = PlayerId::random();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.0));
    }

    #[test]
    fn test_player_id_deserializes_from_uuid_string() {
        let raw = "\"6ba7b810-9dad-11d1-80b4-00c04fd430c8\"";
        let id: PlayerId = serde_json::from_str(raw).unwrap();
        assert_eq!(id.to_string(), "6ba7b810-9dad-11d1-80b4-00c04fd430c8");
    }

    #[test]
    fn test_player_id_rejects_non_uuid() {
        let result: Result<PlayerId, _> = serde_json::from_str("\"not-a-uuid\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_player_serializes_camel_case() {
        let player = Player {
            id: PlayerId::random(),
            name: "alice".into(),
            score: 100,
            power_points: 7,
            shields: 1,
            skip_next_question: false,
            is_ready: true,
        };
        let json: serde_json::Value = serde_json::to_value(&player).unwrap();

        assert_eq!(json["name"], "alice");
        assert_eq!(json["powerPoints"], 7);
        assert_eq!(json["skipNextQuestion"], false);
        assert_eq!(json["isReady"], true);
        assert!(json.get("power_points").is_none());
    }

    #[test]
    fn test_question_view_has_no_answer_key_field() {
        let view = QuestionView {
            id: QuestionId::random(),
            text: "q".into(),
            answers: vec![Answer {
                id: AnswerId::random(),
                text: "a".into(),
            }],
        };
        let json: serde_json::Value = serde_json::to_value(&view).unwrap();
        assert!(json.get("correctAnswerId").is_none());
        assert!(json.get("providedAnswers").is_none());
    }
}
