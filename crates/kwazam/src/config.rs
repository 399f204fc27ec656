//! Game configuration loaded from TOML.

use derive_getters::Getters;
use derive_more::{Display, Error};
use kwazam_rules::{KwazamRules, Player};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Settings for a terminal game session.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// Player ids in turn order. The first one plays from the bottom.
    #[serde(default = "default_players")]
    players: Vec<String>,

    /// Turns between Tor/Xor switches. Zero disables switching.
    #[serde(default = "default_switch_interval")]
    switch_interval: u32,

    /// Where `save` and `load` read and write.
    #[serde(default = "default_save_path")]
    save_path: PathBuf,
}

#[instrument]
fn default_players() -> Vec<String> {
    vec!["1".to_string(), "2".to_string()]
}

#[instrument]
fn default_switch_interval() -> u32 {
    KwazamRules::DEFAULT_SWITCH_INTERVAL
}

#[instrument]
fn default_save_path() -> PathBuf {
    PathBuf::from("kwazam_save.txt")
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            players: default_players(),
            switch_interval: default_switch_interval(),
            save_path: default_save_path(),
        }
    }
}

impl GameConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;

        info!(players = ?config.players, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Players as engine values.
    pub fn player_list(&self) -> Vec<Player> {
        self.players.iter().map(Player::new).collect()
    }

    /// Rules with the configured switch interval.
    pub fn rules(&self) -> KwazamRules {
        KwazamRules::new(self.switch_interval)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.players.len() != 2 {
            return Err(ConfigError::new(format!(
                "Kwazam needs exactly two players, got {}",
                self.players.len()
            )));
        }
        if let Some(bad) = self.players.iter().find(|id| id.is_empty() || id.contains(['_', ','])) {
            return Err(ConfigError::new(format!("Invalid player id: {:?}", bad)));
        }
        let mut seen = std::collections::HashSet::new();
        if let Some(duplicate) = self.players.iter().find(|id| !seen.insert(id.as_str())) {
            return Err(ConfigError::new(format!("Duplicate player id: {}", duplicate)));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let file = write_config("switch_interval = 3\n");
        let config = GameConfig::from_file(file.path()).unwrap();
        assert_eq!(config.players(), &vec!["1".to_string(), "2".to_string()]);
        assert_eq!(*config.switch_interval(), 3);
        assert_eq!(config.save_path(), &PathBuf::from("kwazam_save.txt"));
        assert_eq!(config.rules().switch_interval(), 3);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = GameConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_rejects_single_player() {
        let file = write_config("players = [\"solo\"]\n");
        let err = GameConfig::from_file(file.path()).unwrap_err();
        assert!(err.message.contains("exactly two players"));
    }

    #[test]
    fn test_rejects_three_players() {
        let file = write_config("players = [\"1\", \"2\", \"3\"]\n");
        let err = GameConfig::from_file(file.path()).unwrap_err();
        assert_eq!(err.message, "Kwazam needs exactly two players, got 3");
    }

    #[test]
    fn test_rejects_ids_that_break_save_format() {
        let file = write_config("players = [\"a_b\", \"c\"]\n");
        assert!(GameConfig::from_file(file.path()).is_err());

        let file = write_config("players = [\"a\", \"a\"]\n");
        assert!(GameConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_parse_error_reported() {
        let file = write_config("players = 7\n");
        let err = GameConfig::from_file(file.path()).unwrap_err();
        assert!(err.message.starts_with("Failed to parse config"));
    }
}
