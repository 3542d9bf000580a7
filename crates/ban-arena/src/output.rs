//! Game files: JSON records and PGN.
//!
//! A JSON game file is a [`GameRecord`] with extra metadata next to it, so
//! any game file can be read back as a record and replayed.

use crate::runner::PlayedGame;
use ban_core::Outcome;
use ban_engine::{GameRecord, PgnTags};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when reading or writing game files.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid game file: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSON layout of a saved game.
#[derive(Debug, Serialize, Deserialize)]
pub struct GameFile {
    pub id: String,
    pub event: String,
    /// Ply count when the game stopped.
    pub plies: usize,
    /// Serialized final state.
    pub final_state: String,
    #[serde(flatten)]
    pub record: GameRecord,
    /// ISO 8601 timestamp when the file was created.
    pub created_at: String,
}

/// Writes a played game as JSON.
pub fn write_json<P: AsRef<Path>>(
    path: P,
    id: &str,
    event: &str,
    game: &PlayedGame,
) -> Result<(), OutputError> {
    let file = GameFile {
        id: id.to_string(),
        event: event.to_string(),
        plies: game.plies(),
        final_state: game.engine.serialize(),
        record: game.engine.record(),
        created_at: Utc::now().to_rfc3339(),
    };
    let json = serde_json::to_string_pretty(&file)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Writes a played game as PGN, bans as comments.
pub fn write_pgn<P: AsRef<Path>>(path: P, event: &str, game: &PlayedGame) -> std::io::Result<()> {
    let tags = PgnTags {
        event: event.to_string(),
        date: Utc::now().format("%Y.%m.%d").to_string(),
        white: "random".to_string(),
        black: "random".to_string(),
        ..Default::default()
    };
    std::fs::write(path, game.engine.to_pgn(&tags))
}

/// Reads a game record from a JSON file. Metadata next to the record is
/// ignored.
pub fn read_record<P: AsRef<Path>>(path: P) -> Result<GameRecord, OutputError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Short label for logs and summaries.
pub fn describe(outcome: Option<Outcome>) -> String {
    outcome.map_or_else(|| "unfinished".to_string(), |o| o.to_string())
}
