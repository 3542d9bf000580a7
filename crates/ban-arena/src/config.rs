//! Configuration file loading for the arena.
//!
//! Settings come from `arena.toml` in the current directory. Every field has
//! a default, so a missing file or an empty one is a valid configuration.
//! Command-line flags override file values.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Arena settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Number of games per run. Defaults to 10.
    #[serde(default = "default_games")]
    pub games: u32,
    /// Plies (bans plus moves) after which a game stops unfinished.
    /// Defaults to 400.
    #[serde(default = "default_max_plies")]
    pub max_plies: u32,
    /// RNG seed. A random seed is drawn when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Directory for game files. Nothing is written when absent.
    #[serde(default)]
    pub out_dir: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub write_pgn: bool,
    #[serde(default = "default_true")]
    pub write_json: bool,
    /// PGN `Event` tag.
    #[serde(default = "default_event")]
    pub event: String,
    /// FEN or serialized state every game starts from. Defaults to the
    /// standard starting position.
    #[serde(default)]
    pub start: Option<String>,
}

fn default_games() -> u32 {
    10
}

fn default_max_plies() -> u32 {
    400
}

fn default_true() -> bool {
    true
}

fn default_event() -> String {
    "Ban Chess Self-Play".to_string()
}

impl Default for ArenaConfig {
    fn default() -> Self {
        ArenaConfig {
            games: default_games(),
            max_plies: default_max_plies(),
            seed: None,
            out_dir: None,
            write_pgn: true,
            write_json: true,
            event: default_event(),
            start: None,
        }
    }
}

impl ArenaConfig {
    /// Loads the configuration from [`Self::config_path()`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads the configuration from `path`, or the defaults if the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// or [`ConfigError::ParseError`] if the file contains invalid TOML.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns `arena.toml` in the current working directory.
    pub fn config_path() -> PathBuf {
        PathBuf::from("arena.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
games = 25
max_plies = 120
seed = 42
out_dir = "data/games"
write_pgn = false
event = "Nightly"
start = "8/P6k/8/8/8/8/8/K7 w - - 0 1"
"#;

        let config: ArenaConfig = toml::from_str(toml_content).unwrap();

        assert_eq!(config.games, 25);
        assert_eq!(config.max_plies, 120);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.out_dir, Some(PathBuf::from("data/games")));
        assert!(!config.write_pgn);
        assert!(config.write_json);
        assert_eq!(config.event, "Nightly");
        assert_eq!(
            config.start.as_deref(),
            Some("8/P6k/8/8/8/8/8/K7 w - - 0 1")
        );
    }

    #[test]
    fn test_empty_config_defaults() {
        let config: ArenaConfig = toml::from_str("").unwrap();
        assert_eq!(config, ArenaConfig::default());
        assert_eq!(config.games, 10);
        assert_eq!(config.max_plies, 400);
        assert!(config.seed.is_none());
        assert!(config.out_dir.is_none());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ArenaConfig::load_from(&dir.path().join("arena.toml")).unwrap();
        assert_eq!(config, ArenaConfig::default());
    }

    #[test]
    fn test_load_uses_working_directory() {
        // Tests run from the crate directory, which has no arena.toml.
        assert_eq!(ArenaConfig::config_path(), PathBuf::from("arena.toml"));
        assert_eq!(ArenaConfig::load().unwrap(), ArenaConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "games = 3").unwrap();
        let config = ArenaConfig::load_from(file.path()).unwrap();
        assert_eq!(config.games, 3);
        assert_eq!(config.max_plies, 400);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "games = \"many\"").unwrap();
        match ArenaConfig::load_from(file.path()) {
            Err(ConfigError::ParseError(_)) => {}
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }
}
