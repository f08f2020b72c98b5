//! Fans game events out to per-player outbound channels.

use std::collections::HashMap;

use tokio::sync::mpsc;

use quizbrawl_game::GameEvent;
use quizbrawl_protocol::{GameConfigPayload, OutgoingMessage, PlayerId};

/// Channel sender for delivering outbound messages to a player's
/// connection handler.
pub type PlayerSender = mpsc::UnboundedSender<OutgoingMessage>;

/// Translates [`GameEvent`]s into wire messages and routes them.
///
/// Owned by the lobby actor, so all mutation happens on one task. A send
/// to a disconnected player is silently dropped; the connection's close
/// path unbinds them shortly after.
pub struct Dispatcher {
    lobby_code: String,
    config: GameConfigPayload,
    senders: HashMap<PlayerId, PlayerSender>,
}

impl Dispatcher {
    pub fn new(lobby_code: impl Into<String>, config: GameConfigPayload) -> Self {
        Self {
            lobby_code: lobby_code.into(),
            config,
            senders: HashMap::new(),
        }
    }

    pub fn bind(&mut self, player_id: PlayerId, sender: PlayerSender) {
        self.senders.insert(player_id, sender);
    }

    pub fn unbind(&mut self, player_id: PlayerId) {
        self.senders.remove(&player_id);
    }

    /// Sends a recoverable error back to one player.
    pub fn send_error(&self, player_id: PlayerId, error: impl Into<String>) {
        self.send_to(player_id, OutgoingMessage::Error { error: error.into() });
    }

    /// Routes a batch of game events to the right recipients.
    pub fn dispatch(&self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::PlayerJoined { player, players } => {
                    // The joiner learns their identity and the rule set
                    // before the roster broadcast.
                    self.send_to(player.id, OutgoingMessage::SetUserId { user_id: player.id });
                    self.send_to(
                        player.id,
                        OutgoingMessage::GameConfig {
                            config: self.config.clone(),
                        },
                    );
                    self.broadcast(OutgoingMessage::PlayerUpdate {
                        players: players.clone(),
                    });
                }
                GameEvent::PlayerLeft { players, .. }
                | GameEvent::PlayersUpdated { players } => {
                    self.broadcast(OutgoingMessage::PlayerUpdate {
                        players: players.clone(),
                    });
                }
                GameEvent::GameStarted => {
                    tracing::info!(lobby = %self.lobby_code, "game started");
                }
                GameEvent::QuestionChanged { question } => {
                    self.broadcast(OutgoingMessage::AskQuestion {
                        question: question.clone(),
                    });
                }
                GameEvent::AnswerRevealed {
                    question_id,
                    answer_id,
                    players,
                } => {
                    self.broadcast(OutgoingMessage::AnswerRevealed {
                        question_id: *question_id,
                        answer_id: *answer_id,
                        players: players.clone(),
                    });
                }
                GameEvent::ActionPerformed {
                    action,
                    actor_id,
                    target_id,
                    success,
                    message,
                    players,
                } => {
                    self.broadcast(OutgoingMessage::ActionResult {
                        action: *action,
                        actor_id: *actor_id,
                        target_id: *target_id,
                        success: *success,
                        message: message.clone(),
                        players: players.clone(),
                    });
                }
                GameEvent::GameFinished { players } => {
                    tracing::info!(lobby = %self.lobby_code, "game finished");
                    self.broadcast(OutgoingMessage::GameFinished {
                        players: players.clone(),
                    });
                }
            }
        }
    }

    fn broadcast(&self, msg: OutgoingMessage) {
        for sender in self.senders.values() {
            let _ = sender.send(msg.clone());
        }
    }

    fn send_to(&self, player_id: PlayerId, msg: OutgoingMessage) {
        if let Some(sender) = self.senders.get(&player_id) {
            let _ = sender.send(msg);
        }
    }
}
