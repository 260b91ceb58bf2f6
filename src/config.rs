//! Configuration file structures and loading.
//!
//! The bot reads a YAML file, with every value overridable through
//! `BLANKS_`-prefixed environment variables (`__` separates sections, e.g.
//! `BLANKS_MATRIX__PASSWORD`).
//!
//! ```yaml
//! matrix:
//!   user_id: "@blanks:matrix.org"
//!   password: "secret-password"
//!
//! # Optional; the defaults below apply when omitted.
//! game:
//!   hand_size: 10
//!   min_players: 3
//!   max_idle_rounds: 2
//! ```

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::Deserialize;

/// Root configuration for the bot.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Matrix account configuration
    pub matrix: Matrix,
    /// Game tuning, all defaulted
    #[serde(default)]
    pub game: GameSettings,
}

/// Matrix account configuration.
#[derive(Debug, Deserialize)]
pub struct Matrix {
    /// Fully qualified Matrix user ID of the bot account, `@name:server`.
    pub user_id: String,
    /// Matrix account password. Only used for the first login; afterwards
    /// the persisted session is restored instead.
    pub password: String,
}

/// Tuning knobs of the card game.
#[derive(Debug, Clone, Deserialize)]
pub struct GameSettings {
    /// Answer cards each player holds.
    #[serde(default = "default_hand_size")]
    pub hand_size: usize,
    /// Players needed before rounds start.
    #[serde(default = "default_min_players")]
    pub min_players: usize,
    /// Completed rounds a player may sit out before being removed.
    #[serde(default = "default_max_idle_rounds")]
    pub max_idle_rounds: u32,
}

fn default_hand_size() -> usize {
    10
}

fn default_min_players() -> usize {
    3
}

fn default_max_idle_rounds() -> u32 {
    2
}

impl Default for GameSettings {
    fn default() -> Self {
        GameSettings {
            hand_size: default_hand_size(),
            min_players: default_min_players(),
            max_idle_rounds: default_max_idle_rounds(),
        }
    }
}

impl Config {
    /// Loads the configuration from `path`, merged with `BLANKS_`
    /// environment variable overrides.
    pub fn load(path: &str) -> Result<Self, anyhow::Error> {
        let config = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("BLANKS_").split("__"))
            .extract()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_minimal_config_uses_game_defaults() {
        let file = write_config(
            "matrix:\n  user_id: \"@blanks:example.org\"\n  password: \"hunter2\"\n",
        );

        let config = Config::load(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.matrix.user_id, "@blanks:example.org");
        assert_eq!(config.game.hand_size, 10);
        assert_eq!(config.game.min_players, 3);
        assert_eq!(config.game.max_idle_rounds, 2);
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            "matrix:\n  user_id: \"@blanks:example.org\"\n  password: \"hunter2\"\n\
             game:\n  hand_size: 7\n  min_players: 4\n  max_idle_rounds: 1\n",
        );

        let config = Config::load(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.game.hand_size, 7);
        assert_eq!(config.game.min_players, 4);
        assert_eq!(config.game.max_idle_rounds, 1);
    }

    #[test]
    fn test_load_missing_matrix_section_fails() {
        let file = write_config("game:\n  hand_size: 7\n");
        assert!(Config::load(file.path().to_str().unwrap()).is_err());
    }
}
