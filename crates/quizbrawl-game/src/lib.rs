//! Game session core for Quizbrawl.
//!
//! One [`Game`] is one lobby's trivia battle royale: the state machine that
//! accepts players, walks a fixed question list, awards power points for
//! fast correct answers, and resolves combat actions.
//!
//! The game is deliberately synchronous and transport-agnostic. Every
//! operation returns the domain events it produced
//! (`Result<Vec<GameEvent>, GameError>`); the lobby layer decides how those
//! events reach clients and when timers fire.
//!
//! # Key types
//!
//! - [`Game`]: the per-lobby state machine
//! - [`GameEvent`]: what an operation produced
//! - [`GameError`]: why an operation was rejected
//! - [`Rules`]: every tunable number (health, costs, scoring curve)
//! - [`QuestionSet`]: questions plus the private answer key

mod error;
mod event;
mod game;
mod question;
mod rules;

pub use error::GameError;
pub use event::GameEvent;
pub use game::{Game, GameStatus, power_points_earned};
pub use question::{Question, QuestionSet};
pub use rules::{LobbyRules, PowerPointRules, QuestionRules, Rules};
