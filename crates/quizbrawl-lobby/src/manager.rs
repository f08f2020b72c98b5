//! Lobby manager: creates lobbies on first join and deletes empty ones.

use std::collections::HashMap;

use tokio::sync::Mutex;

use quizbrawl_game::Rules;
use quizbrawl_protocol::PlayerId;
use quizbrawl_questions::{QuestionRequest, QuestionSource, fallback_question_set};

use crate::actor::{LobbyHandle, spawn_lobby};
use crate::dispatch::PlayerSender;
use crate::error::LobbyError;

/// Tracks all active lobbies on this server.
///
/// Joining a code that has no lobby creates one: the manager fetches a
/// question set from its [`QuestionSource`], falling back to the local
/// stock questions when the service is unreachable, then spawns the
/// lobby actor. Lobby creation never fails because of the question
/// service.
///
/// The registry lock is internal and is never held across the question
/// fetch, so one lobby's slow fetch cannot stall joins or disconnect
/// cleanup on any other lobby.
pub struct LobbyManager<Q: QuestionSource> {
    lobbies: Mutex<HashMap<String, LobbyHandle>>,
    source: Q,
    rules: Rules,
}

impl<Q: QuestionSource> LobbyManager<Q> {
    pub fn new(source: Q, rules: Rules) -> Self {
        Self {
            lobbies: Mutex::new(HashMap::new()),
            source,
            rules,
        }
    }

    /// Joins `player_id` to the lobby with this code, creating the lobby
    /// if it does not exist yet. Returns a handle the connection uses to
    /// route messages without going through the manager again.
    pub async fn join(
        &self,
        code: &str,
        player_id: PlayerId,
        name: &str,
        sender: PlayerSender,
    ) -> Result<LobbyHandle, LobbyError> {
        if let Some(handle) = self.get(code).await {
            handle.join(player_id, name, sender).await?;
            return Ok(handle);
        }

        // Fetched without holding the registry lock: the service can
        // take seconds, and other lobbies must keep joining and leaving
        // while it does.
        let questions = match self
            .source
            .generate(QuestionRequest::from(&self.rules.questions))
            .await
        {
            Ok(set) => set,
            Err(err) => {
                tracing::error!(
                    lobby = %code,
                    %err,
                    "question service failed, using fallback questions"
                );
                fallback_question_set(self.rules.questions.count)
            }
        };

        let mut lobbies = self.lobbies.lock().await;
        // Another connection may have created this lobby during the
        // fetch; its question set wins and ours is dropped.
        if let Some(handle) = lobbies.get(code) {
            let handle = handle.clone();
            drop(lobbies);
            handle.join(player_id, name, sender).await?;
            return Ok(handle);
        }
        let handle = spawn_lobby(code, self.rules.clone(), questions);
        handle.join(player_id, name, sender).await?;
        lobbies.insert(code.to_string(), handle.clone());
        tracing::info!(lobby = %code, "lobby created");
        Ok(handle)
    }

    /// Removes a player from a lobby. The lobby is deleted once its last
    /// player leaves. Unknown lobby codes are a no-op, so disconnect
    /// handlers can call this unconditionally.
    pub async fn leave(&self, code: &str, player_id: PlayerId) {
        let mut lobbies = self.lobbies.lock().await;
        let Some(handle) = lobbies.get(code).cloned() else {
            return;
        };
        let remaining = match handle.leave(player_id).await {
            Ok(remaining) => remaining,
            Err(err) => {
                tracing::warn!(lobby = %code, %player_id, %err, "leave failed");
                0
            }
        };
        if remaining == 0 {
            lobbies.remove(code);
            let _ = handle.shutdown().await;
            tracing::info!(lobby = %code, "lobby deleted");
        }
    }

    /// Shuts a lobby down and forgets it. Idempotent.
    pub async fn delete(&self, code: &str) {
        let handle = self.lobbies.lock().await.remove(code);
        if let Some(handle) = handle {
            let _ = handle.shutdown().await;
            tracing::info!(lobby = %code, "lobby deleted");
        }
    }

    /// Returns a handle to an existing lobby, if any.
    pub async fn get(&self, code: &str) -> Option<LobbyHandle> {
        self.lobbies.lock().await.get(code).cloned()
    }

    /// Number of active lobbies.
    pub async fn lobby_count(&self) -> usize {
        self.lobbies.lock().await.len()
    }
}
