//! The per-lobby game state machine.
//!
//! A [`Game`] owns its roster, the question list, and the answer key. It
//! never touches the network and never spawns tasks; callers drive it and
//! forward the returned [`GameEvent`]s. The single time-based behavior
//! (advancing to the next question after a reveal) is the caller's job,
//! which is what keeps this crate testable without a runtime.

use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use quizbrawl_protocol::{ActionKind, AnswerId, Player, PlayerId, QuestionId};
use uuid::Uuid;

use crate::error::GameError;
use crate::event::GameEvent;
use crate::question::{Question, QuestionSet};
use crate::rules::{PowerPointRules, Rules};

/// Lifecycle of a session.
///
/// `Started` only exists for the instant between the ready-check passing
/// and the first question going out; observers will almost always see
/// `Waiting`, `AwaitingAnswer`, or `Finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Waiting,
    Started,
    AwaitingAnswer,
    Finished,
    /// Terminal state for a session abandoned before it finished.
    Cancelled,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GameStatus::Waiting => "waiting",
            GameStatus::Started => "started",
            GameStatus::AwaitingAnswer => "awaitingAnswer",
            GameStatus::Finished => "finished",
            GameStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Power points earned for a correct answer after `elapsed_secs`.
///
/// Linear from `max` at zero seconds down to `min` at the threshold, flat
/// `min` beyond it, rounded to the nearest whole point.
pub fn power_points_earned(elapsed_secs: f64, rules: &PowerPointRules) -> u32 {
    if elapsed_secs > rules.time_threshold {
        rules.min
    } else {
        (rules.max as f64 - elapsed_secs).max(rules.min as f64).round() as u32
    }
}

/// One lobby's trivia battle royale.
pub struct Game {
    id: Uuid,
    lobby_code: String,
    status: GameStatus,
    rules: Rules,
    questions: Vec<Question>,
    answer_key: HashMap<QuestionId, AnswerId>,
    /// Index of the live question. `None` until the game starts.
    current: Option<usize>,
    question_started_at: Option<Instant>,
    answer_times: HashMap<PlayerId, Instant>,
    /// Set when the live round has been resolved, so a leave during the
    /// reveal delay cannot resolve (and score) it a second time.
    round_resolved: bool,
    players: Vec<Player>,
}

impl Game {
    pub fn new(lobby_code: impl Into<String>, rules: Rules, set: QuestionSet) -> Self {
        Self {
            id: Uuid::new_v4(),
            lobby_code: lobby_code.into(),
            status: GameStatus::Waiting,
            rules,
            questions: set.questions,
            answer_key: set.answer_key,
            current: None,
            question_started_at: None,
            answer_times: HashMap::new(),
            round_resolved: false,
            players: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn lobby_code(&self) -> &str {
        &self.lobby_code
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    fn snapshot(&self) -> Vec<Player> {
        self.players.clone()
    }

    /// Adds a player to the roster. Only allowed before the game starts.
    /// A blank name falls back to "Player".
    pub fn add_player(
        &mut self,
        player_id: PlayerId,
        name: &str,
    ) -> Result<Vec<GameEvent>, GameError> {
        if self.status != GameStatus::Waiting {
            return Err(GameError::AlreadyStarted);
        }
        if self.players.len() >= self.rules.lobby.max_players {
            return Err(GameError::GameFull(self.rules.lobby.max_players));
        }
        if self.players.iter().any(|p| p.id == player_id) {
            return Err(GameError::DuplicatePlayer(player_id));
        }

        let name = if name.trim().is_empty() { "Player" } else { name };
        let player = Player {
            id: player_id,
            name: name.to_string(),
            score: self.rules.starting_health,
            power_points: 0,
            shields: 0,
            skip_next_question: false,
            is_ready: false,
        };
        tracing::debug!(lobby = %self.lobby_code, %player_id, name, "player joined");
        self.players.push(player.clone());

        Ok(vec![GameEvent::PlayerJoined {
            player,
            players: self.snapshot(),
        }])
    }

    pub fn remove_player(&mut self, player_id: PlayerId) -> Result<Vec<GameEvent>, GameError> {
        let idx = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(GameError::PlayerNotFound(player_id))?;
        tracing::debug!(lobby = %self.lobby_code, %player_id, "player left");
        let player = self.players.remove(idx);

        let mut events = vec![GameEvent::PlayerLeft {
            player,
            players: self.snapshot(),
        }];

        // The leaver may have been the only missing submission; the round
        // resolves for the players still here instead of stalling.
        if self.status == GameStatus::AwaitingAnswer && self.round_complete() {
            events.extend(self.resolve_round()?);
        }
        Ok(events)
    }

    /// Flips a player's ready state. When everyone is ready and the lobby
    /// meets the minimum size, the game starts in the same call.
    pub fn toggle_ready(&mut self, player_id: PlayerId) -> Result<Vec<GameEvent>, GameError> {
        let player = self
            .players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or(GameError::PlayerNotFound(player_id))?;
        player.is_ready = !player.is_ready;

        let mut events = vec![GameEvent::PlayersUpdated {
            players: self.snapshot(),
        }];

        let all_ready = self.players.iter().all(|p| p.is_ready);
        if self.status == GameStatus::Waiting
            && all_ready
            && self.players.len() >= self.rules.lobby.min_players
        {
            tracing::debug!(lobby = %self.lobby_code, "all players ready, starting game");
            events.extend(self.start()?);
        }
        Ok(events)
    }

    /// Abandons the session. Terminal: every subsequent state-gated
    /// operation is rejected. Used when a lobby is torn down mid-game.
    pub fn cancel(&mut self) {
        if self.status != GameStatus::Finished {
            tracing::info!(lobby = %self.lobby_code, "game cancelled");
            self.status = GameStatus::Cancelled;
        }
    }

    /// Starts the session and puts the first question live.
    pub fn start(&mut self) -> Result<Vec<GameEvent>, GameError> {
        if self.status != GameStatus::Waiting {
            return Err(GameError::AlreadyStarted);
        }
        if self.questions.is_empty() {
            return Err(GameError::NoQuestions);
        }
        self.status = GameStatus::Started;
        let mut events = vec![GameEvent::GameStarted];
        events.extend(self.advance_question()?);
        Ok(events)
    }

    /// Moves to the next question, or finishes the game when the list is
    /// exhausted. Pending skip flags are consumed here: a flag set during
    /// one question never carries into the next.
    pub fn advance_question(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let next = self.current.map_or(0, |i| i + 1);
        self.answer_times.clear();
        self.round_resolved = false;
        for player in &mut self.players {
            if player.skip_next_question {
                player.skip_next_question = false;
                tracing::debug!(lobby = %self.lobby_code, player_id = %player.id, "skip flag consumed");
            }
        }

        let Some(question) = self.questions.get(next) else {
            self.status = GameStatus::Finished;
            tracing::info!(lobby = %self.lobby_code, "game finished");
            return Ok(vec![GameEvent::GameFinished {
                players: self.snapshot(),
            }]);
        };

        let view = question.view();
        self.current = Some(next);
        self.question_started_at = Some(Instant::now());
        self.status = GameStatus::AwaitingAnswer;
        Ok(vec![GameEvent::QuestionChanged { question: view }])
    }

    /// Records a player's answer to the live question.
    ///
    /// A skip-flagged player is marked as having answered but earns
    /// nothing. Answers for a question other than the live one, and
    /// repeated answers, are silent no-ops. The round resolves the moment
    /// the last player has answered.
    pub fn answer_question(
        &mut self,
        player_id: PlayerId,
        question_id: QuestionId,
        answer_id: AnswerId,
    ) -> Result<Vec<GameEvent>, GameError> {
        if self.status != GameStatus::AwaitingAnswer {
            return Err(GameError::NotAwaitingAnswer);
        }
        let skipping = self
            .players
            .iter()
            .find(|p| p.id == player_id)
            .map(|p| p.skip_next_question)
            .ok_or(GameError::PlayerNotFound(player_id))?;

        let idx = self.current.ok_or(GameError::NotAwaitingAnswer)?;
        let question = &mut self.questions[idx];
        if question.id != question_id {
            tracing::warn!(
                lobby = %self.lobby_code,
                %player_id,
                %question_id,
                "answer for a question that is not live, ignoring"
            );
            return Ok(Vec::new());
        }
        if question.submissions.contains_key(&player_id) {
            tracing::warn!(lobby = %self.lobby_code, %player_id, "player already answered, ignoring");
            return Ok(Vec::new());
        }

        if skipping {
            tracing::debug!(lobby = %self.lobby_code, %player_id, "player is skipping this question");
            question.submissions.insert(player_id, None);
        } else {
            question.submissions.insert(player_id, Some(answer_id));
            self.answer_times.insert(player_id, Instant::now());
            tracing::debug!(lobby = %self.lobby_code, %player_id, %answer_id, "answer recorded");
        }

        if self.round_complete() {
            self.resolve_round()
        } else {
            Ok(Vec::new())
        }
    }

    /// True when every player still in the lobby has submitted to the
    /// live question and the round has not already been resolved.
    /// Counted against the roster, not the submission map, because
    /// submissions from departed players linger in the map.
    fn round_complete(&self) -> bool {
        if self.round_resolved || self.players.is_empty() {
            return false;
        }
        let Some(idx) = self.current else {
            return false;
        };
        let submissions = &self.questions[idx].submissions;
        self.players.iter().all(|p| submissions.contains_key(&p.id))
    }

    /// Awards power points for correct answers and reveals the answer.
    /// The status stays `AwaitingAnswer`; the caller schedules
    /// [`advance_question`](Self::advance_question) after its reveal delay.
    fn resolve_round(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let idx = self.current.ok_or(GameError::NotAwaitingAnswer)?;
        let started_at = self.question_started_at.ok_or(GameError::NotAwaitingAnswer)?;
        let question = &self.questions[idx];
        let correct = self
            .answer_key
            .get(&question.id)
            .copied()
            .ok_or(GameError::AnswerKeyMissing(question.id))?;

        for player in &mut self.players {
            let Some(Some(answer)) = question.submissions.get(&player.id) else {
                continue;
            };
            if *answer != correct {
                continue;
            }
            let Some(answered_at) = self.answer_times.get(&player.id) else {
                tracing::warn!(player_id = %player.id, "answer time missing for correct answer");
                continue;
            };
            let elapsed = answered_at.duration_since(started_at).as_secs_f64();
            let earned = power_points_earned(elapsed, &self.rules.power_points);
            player.power_points += earned;
            tracing::debug!(
                player_id = %player.id,
                elapsed,
                earned,
                total = player.power_points,
                "power points awarded"
            );
        }

        self.round_resolved = true;
        Ok(vec![GameEvent::AnswerRevealed {
            question_id: question.id,
            answer_id: correct,
            players: self.snapshot(),
        }])
    }

    /// Resolves an attack, shield, or skip attempt.
    ///
    /// Rule failures (unknown actor, cost, targeting) are not errors:
    /// they come back as `ActionPerformed { success: false }` so everyone
    /// sees the attempt.
    pub fn perform_action(
        &mut self,
        actor_id: PlayerId,
        action: ActionKind,
        target_id: Option<PlayerId>,
    ) -> Result<Vec<GameEvent>, GameError> {
        let Some(actor_idx) = self.players.iter().position(|p| p.id == actor_id) else {
            return Ok(vec![self.failed_action(
                action,
                actor_id,
                target_id,
                "Actor not found".to_string(),
            )]);
        };

        let cost = self.rules.action_cost(action);
        let have = self.players[actor_idx].power_points;
        if have < cost {
            return Ok(vec![self.failed_action(
                action,
                actor_id,
                target_id,
                format!("Not enough power points! Need {cost}, have {have}"),
            )]);
        }

        let target_idx = match action {
            ActionKind::Shield => None,
            ActionKind::Attack | ActionKind::Skip => {
                let Some(target_id) = target_id else {
                    return Ok(vec![self.failed_action(
                        action,
                        actor_id,
                        None,
                        "Target player required for this action".to_string(),
                    )]);
                };
                let Some(idx) = self.players.iter().position(|p| p.id == target_id) else {
                    return Ok(vec![self.failed_action(
                        action,
                        actor_id,
                        Some(target_id),
                        "Target player not found".to_string(),
                    )]);
                };
                if target_id == actor_id {
                    return Ok(vec![self.failed_action(
                        action,
                        actor_id,
                        Some(target_id),
                        "Cannot target yourself".to_string(),
                    )]);
                }
                Some(idx)
            }
        };

        self.players[actor_idx].power_points -= cost;

        let message = match action {
            ActionKind::Attack => self.apply_attack(actor_id, target_idx.unwrap_or(actor_idx)),
            ActionKind::Shield => self.apply_shield(actor_idx),
            ActionKind::Skip => self.apply_skip(actor_id, target_idx.unwrap_or(actor_idx)),
        };

        Ok(vec![GameEvent::ActionPerformed {
            action,
            actor_id,
            target_id: match action {
                ActionKind::Shield => None,
                _ => target_id,
            },
            success: true,
            message,
            players: self.snapshot(),
        }])
    }

    fn failed_action(
        &self,
        action: ActionKind,
        actor_id: PlayerId,
        target_id: Option<PlayerId>,
        message: String,
    ) -> GameEvent {
        tracing::debug!(lobby = %self.lobby_code, %actor_id, %action, %message, "action rejected");
        GameEvent::ActionPerformed {
            action,
            actor_id,
            target_id,
            success: false,
            message,
            players: self.snapshot(),
        }
    }

    fn apply_attack(&mut self, actor_id: PlayerId, target_idx: usize) -> String {
        let attack = self.rules.power_ups.attack.clone();
        let target = &mut self.players[target_idx];

        // Each shield absorbs one hit and knocks a chunk off the damage.
        let mut damage = attack.base_damage;
        let mut shields_used = 0u32;
        while target.shields > 0 && damage > 0 {
            target.shields -= 1;
            shields_used += 1;
            damage = damage.saturating_sub(attack.shield_damage_reduction);
        }

        let mut message = if shields_used > 0 {
            format!(
                "{shields_used} shield{} absorbed damage! {} took {damage} damage!",
                if shields_used > 1 { "s" } else { "" },
                target.name
            )
        } else {
            format!("{} took {damage} damage!", target.name)
        };

        let drained = attack.power_points_drained.min(target.power_points);
        if drained > 0 {
            target.power_points -= drained;
            message.push_str(&format!(" Lost {drained} power points!"));
        }

        target.score = target.score.saturating_sub(damage);
        if target.score == 0 {
            message.push_str(&format!(" {} has been eliminated!", target.name));
        }

        tracing::debug!(
            lobby = %self.lobby_code,
            %actor_id,
            target_id = %target.id,
            damage,
            shields_used,
            target_score = target.score,
            "attack resolved"
        );
        message
    }

    fn apply_shield(&mut self, actor_idx: usize) -> String {
        let gained = self.rules.power_ups.shield.shields_gained;
        let actor = &mut self.players[actor_idx];
        actor.shields += gained;
        tracing::debug!(
            lobby = %self.lobby_code,
            actor_id = %actor.id,
            shields = actor.shields,
            "shield gained"
        );
        format!(
            "{} gained {gained} shield{}! (Total: {})",
            actor.name,
            if gained > 1 { "s" } else { "" },
            actor.shields
        )
    }

    fn apply_skip(&mut self, actor_id: PlayerId, target_idx: usize) -> String {
        let drained_max = self.rules.power_ups.skip.power_points_drained;
        let target = &mut self.players[target_idx];
        target.skip_next_question = true;
        let drained = drained_max.min(target.power_points);
        target.power_points -= drained;

        tracing::debug!(
            lobby = %self.lobby_code,
            %actor_id,
            target_id = %target.id,
            drained,
            "skip applied"
        );
        if drained > 0 {
            format!(
                "{} will skip the next question and lost {drained} power points!",
                target.name
            )
        } else {
            format!("{} will skip the next question!", target.name)
        }
    }
}
