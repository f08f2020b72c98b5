//! Rule configuration: every tunable number in one place.
//!
//! Loaded once at startup (see the server crate's config module) and shared
//! read-only by every lobby. Each section has serde defaults so a partial
//! config file only needs to name what it overrides.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use quizbrawl_protocol::{
    ActionKind, AttackConfig, GameConfigPayload, PlayerConfig, PowerUpsConfig,
    ShieldConfig, SkipConfig,
};

/// All rule parameters for a game session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Health every player starts with. Score doubles as health.
    pub starting_health: u32,

    /// The scoring curve for answering questions.
    pub power_points: PowerPointRules,

    /// Costs and effect parameters for the three actions.
    pub power_ups: PowerUpsConfig,

    /// Player-count bounds for a lobby.
    pub lobby: LobbyRules,

    /// What to request from the question service.
    pub questions: QuestionRules,

    /// Delay between the answer reveal and the next question, in
    /// milliseconds.
    pub round_advance_ms: u64,
}

/// Power points earned per question: linear from `max` (instant answer)
/// down to `min` at `time_threshold` seconds, flat `min` beyond that.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerPointRules {
    pub max: u32,
    pub min: u32,
    pub time_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LobbyRules {
    /// Minimum players before the ready-check can start the game.
    pub min_players: usize,
    /// Maximum players a lobby accepts.
    pub max_players: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionRules {
    pub count: usize,
    pub category: String,
    pub provider: String,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            starting_health: 100,
            power_points: PowerPointRules::default(),
            power_ups: PowerUpsConfig {
                attack: AttackConfig {
                    cost: 15,
                    base_damage: 30,
                    power_points_drained: 5,
                    shield_damage_reduction: 10,
                },
                shield: ShieldConfig {
                    cost: 10,
                    shields_gained: 1,
                },
                skip: SkipConfig {
                    cost: 20,
                    power_points_drained: 5,
                },
            },
            lobby: LobbyRules::default(),
            questions: QuestionRules::default(),
            round_advance_ms: 3_000,
        }
    }
}

impl Default for PowerPointRules {
    fn default() -> Self {
        Self {
            max: 20,
            min: 5,
            time_threshold: 15.0,
        }
    }
}

impl Default for LobbyRules {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 8,
        }
    }
}

impl Default for QuestionRules {
    fn default() -> Self {
        Self {
            count: 5,
            category: "general".into(),
            provider: "openai".into(),
        }
    }
}

impl Rules {
    /// The power-point cost of an action.
    pub fn action_cost(&self, action: ActionKind) -> u32 {
        match action {
            ActionKind::Attack => self.power_ups.attack.cost,
            ActionKind::Shield => self.power_ups.shield.cost,
            ActionKind::Skip => self.power_ups.skip.cost,
        }
    }

    /// The wait between the answer reveal and the next question.
    pub fn round_advance_delay(&self) -> Duration {
        Duration::from_millis(self.round_advance_ms)
    }

    /// The subset of the rules that clients need, in wire form.
    pub fn config_payload(&self) -> GameConfigPayload {
        GameConfigPayload {
            player: PlayerConfig {
                starting_health: self.starting_health,
            },
            power_ups: self.power_ups.clone(),
        }
    }
}
