//! Server configuration, layered from an optional file and environment
//! variables.

use serde::Deserialize;

use quizbrawl_game::Rules;

/// Everything the server binary needs at startup.
///
/// Every field has a default, so the server runs with no config file at
/// all. A `quizbrawl.toml` next to the binary overrides the defaults,
/// and `QUIZBRAWL__*` environment variables override the file (nested
/// keys separated by `__`, e.g. `QUIZBRAWL__QUESTION_SERVICE__URL`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,

    /// Where to fetch question sets from.
    pub question_service: QuestionServiceConfig,

    /// Game rule overrides, applied to every lobby.
    pub rules: Rules,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuestionServiceConfig {
    /// Base URL of the question service.
    pub url: String,

    /// Request timeout in seconds. Generation calls an LLM upstream, so
    /// this is generous.
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".into(),
            question_service: QuestionServiceConfig::default(),
            rules: Rules::default(),
        }
    }
}

impl Default for QuestionServiceConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:3000".into(),
            timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Loads the configuration from `quizbrawl.{toml,json,yaml}` (if
    /// present) and the `QUIZBRAWL__*` environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("quizbrawl").required(false))
            .add_source(config::Environment::with_prefix("QUIZBRAWL").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(toml: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080");
        assert_eq!(cfg.rules.starting_health, 100);
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let cfg = from_toml("");
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080");
        assert_eq!(cfg.question_service.timeout_secs, 30);
    }

    #[test]
    fn test_partial_file_overrides_only_named_keys() {
        let cfg = from_toml(
            r#"
            bind_addr = "127.0.0.1:9999"

            [question_service]
            url = "http://questions.internal:3000/"

            [rules]
            starting_health = 50

            [rules.lobby]
            max_players = 4
            "#,
        );
        assert_eq!(cfg.bind_addr, "127.0.0.1:9999");
        assert_eq!(cfg.question_service.url, "http://questions.internal:3000/");
        assert_eq!(cfg.question_service.timeout_secs, 30);
        assert_eq!(cfg.rules.starting_health, 50);
        assert_eq!(cfg.rules.lobby.max_players, 4);
        // Untouched sections keep their defaults.
        assert_eq!(cfg.rules.lobby.min_players, 2);
        assert_eq!(cfg.rules.power_points.max, 20);
    }
}
