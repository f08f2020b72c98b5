//! Lobby actor: an isolated Tokio task that owns one game.
//!
//! Each lobby runs in its own task, communicating with the outside world
//! through an mpsc channel. No shared mutable state, just message
//! passing; the game itself stays single-threaded and synchronous.

use tokio::sync::{mpsc, oneshot};

use quizbrawl_game::{Game, GameEvent, GameStatus, QuestionSet, Rules};
use quizbrawl_protocol::{IncomingMessage, PlayerId};

use crate::dispatch::{Dispatcher, PlayerSender};
use crate::error::LobbyError;

/// Commands sent to a lobby actor through its channel.
///
/// Variants with a `oneshot::Sender` are request/reply: the caller sends
/// the command and awaits the response.
pub(crate) enum LobbyCommand {
    /// Add a player and bind their outbound channel.
    Join {
        player_id: PlayerId,
        name: String,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), LobbyError>>,
    },

    /// Remove a player. Replies with how many players remain, which the
    /// manager uses to decide whether to delete the lobby.
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<usize>,
    },

    /// Deliver a parsed client message.
    Message {
        sender: PlayerId,
        msg: IncomingMessage,
    },

    /// The reveal delay elapsed; move to the next question.
    AdvanceRound,

    /// Shut down the lobby.
    Shutdown,
}

/// Handle to a running lobby actor. Cheap to clone.
#[derive(Clone)]
pub struct LobbyHandle {
    code: String,
    sender: mpsc::Sender<LobbyCommand>,
}

impl LobbyHandle {
    /// The lobby's join code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Adds a player to the lobby.
    pub async fn join(
        &self,
        player_id: PlayerId,
        name: impl Into<String>,
        sender: PlayerSender,
    ) -> Result<(), LobbyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(LobbyCommand::Join {
                player_id,
                name: name.into(),
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| LobbyError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| LobbyError::Unavailable(self.code.clone()))?
    }

    /// Removes a player. Returns how many players remain.
    pub async fn leave(&self, player_id: PlayerId) -> Result<usize, LobbyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(LobbyCommand::Leave {
                player_id,
                reply: reply_tx,
            })
            .await
            .map_err(|_| LobbyError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| LobbyError::Unavailable(self.code.clone()))
    }

    /// Delivers a client message (fire-and-forget).
    pub async fn handle_message(
        &self,
        sender: PlayerId,
        msg: IncomingMessage,
    ) -> Result<(), LobbyError> {
        self.sender
            .send(LobbyCommand::Message { sender, msg })
            .await
            .map_err(|_| LobbyError::Unavailable(self.code.clone()))
    }

    /// Tells the lobby to shut down.
    pub async fn shutdown(&self) -> Result<(), LobbyError> {
        self.sender
            .send(LobbyCommand::Shutdown)
            .await
            .map_err(|_| LobbyError::Unavailable(self.code.clone()))
    }
}

/// The internal lobby actor state. Runs inside a Tokio task.
struct LobbyActor {
    code: String,
    game: Game,
    dispatcher: Dispatcher,
    receiver: mpsc::Receiver<LobbyCommand>,
    /// Clone of our own command sender, used by round-advance timers.
    timer_tx: mpsc::Sender<LobbyCommand>,
}

impl LobbyActor {
    async fn run(mut self) {
        tracing::info!(lobby = %self.code, "lobby actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                LobbyCommand::Join {
                    player_id,
                    name,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(player_id, &name, sender);
                    let _ = reply.send(result);
                }
                LobbyCommand::Leave { player_id, reply } => {
                    self.handle_leave(player_id);
                    let _ = reply.send(self.game.players().len());
                }
                LobbyCommand::Message { sender, msg } => {
                    self.handle_message(sender, msg);
                }
                LobbyCommand::AdvanceRound => {
                    self.advance_round();
                }
                LobbyCommand::Shutdown => {
                    tracing::info!(lobby = %self.code, "lobby shutting down");
                    break;
                }
            }
        }

        self.game.cancel();
        tracing::info!(lobby = %self.code, "lobby actor stopped");
    }

    fn handle_join(
        &mut self,
        player_id: PlayerId,
        name: &str,
        sender: PlayerSender,
    ) -> Result<(), LobbyError> {
        // Bind first so the joiner receives their own identity messages.
        self.dispatcher.bind(player_id, sender);
        match self.game.add_player(player_id, name) {
            Ok(events) => {
                self.process(events);
                Ok(())
            }
            Err(err) => {
                self.dispatcher.unbind(player_id);
                Err(LobbyError::Rejected(err))
            }
        }
    }

    fn handle_leave(&mut self, player_id: PlayerId) {
        self.dispatcher.unbind(player_id);
        match self.game.remove_player(player_id) {
            Ok(events) => self.process(events),
            // A close handler may race a rejected join; nothing to undo.
            Err(err) => {
                tracing::debug!(lobby = %self.code, %player_id, %err, "leave ignored");
            }
        }
    }

    fn handle_message(&mut self, sender: PlayerId, msg: IncomingMessage) {
        let result = match msg {
            IncomingMessage::QuestionAnswered {
                question_id,
                answer_id,
            } => self.game.answer_question(sender, question_id, answer_id),
            // The ready toggle always applies to the sender, whatever id
            // the payload claims.
            IncomingMessage::TogglePlayerReady { player_id: claimed } => {
                if claimed != sender {
                    tracing::warn!(
                        lobby = %self.code,
                        %sender,
                        %claimed,
                        "ready toggle claimed another player, using sender"
                    );
                }
                self.game.toggle_ready(sender)
            }
            IncomingMessage::PlayerAction {
                action,
                target_player_id,
            } => self.game.perform_action(sender, action, target_player_id),
        };

        match result {
            Ok(events) => self.process(events),
            Err(err) => {
                tracing::debug!(lobby = %self.code, %sender, %err, "message rejected");
                self.dispatcher.send_error(sender, err.to_string());
            }
        }
    }

    fn advance_round(&mut self) {
        if self.game.status() != GameStatus::AwaitingAnswer {
            return;
        }
        match self.game.advance_question() {
            Ok(events) => self.process(events),
            Err(err) => {
                tracing::warn!(lobby = %self.code, %err, "failed to advance question");
            }
        }
    }

    /// Dispatches events and schedules the round-advance timer after a
    /// reveal. The timer sends `AdvanceRound` back through our own
    /// command channel, so it is harmless if the lobby dies first.
    fn process(&mut self, events: Vec<GameEvent>) {
        let revealed = events
            .iter()
            .any(|e| matches!(e, GameEvent::AnswerRevealed { .. }));
        self.dispatcher.dispatch(&events);

        if revealed {
            let tx = self.timer_tx.clone();
            let delay = self.game.rules().round_advance_delay();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = tx.send(LobbyCommand::AdvanceRound).await;
            });
        }
    }
}

/// Spawns a new lobby actor task and returns a handle to it.
pub(crate) fn spawn_lobby(code: &str, rules: Rules, questions: QuestionSet) -> LobbyHandle {
    let (tx, rx) = mpsc::channel(64);

    let game = Game::new(code, rules, questions);
    let dispatcher = Dispatcher::new(code, game.rules().config_payload());
    let actor = LobbyActor {
        code: code.to_string(),
        game,
        dispatcher,
        receiver: rx,
        timer_tx: tx.clone(),
    };

    tokio::spawn(actor.run());

    LobbyHandle {
        code: code.to_string(),
        sender: tx,
    }
}
