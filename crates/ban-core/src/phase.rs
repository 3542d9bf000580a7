//! Turn segments of a Ban Chess game.

use crate::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which action the game is waiting for.
///
/// Every chess turn is split in two: the opponent of the side to move first
/// bans one of its legal moves, then the side to move plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[serde(alias = "awaitingBan", alias = "AwaitingBan", alias = "ban")]
    AwaitingBan,
    #[serde(alias = "awaitingMove", alias = "AwaitingMove", alias = "move")]
    AwaitingMove,
}

impl Phase {
    /// Returns the player who acts in this phase when `turn` is to move.
    #[inline]
    pub const fn actor(self, turn: Color) -> Color {
        match self {
            Phase::AwaitingBan => turn.opposite(),
            Phase::AwaitingMove => turn,
        }
    }

    /// Short token used by the compact state notation.
    pub const fn token(self) -> &'static str {
        match self {
            Phase::AwaitingBan => "ban",
            Phase::AwaitingMove => "move",
        }
    }

    /// Parses a short notation token.
    pub fn from_token(s: &str) -> Option<Self> {
        match s {
            "ban" => Some(Phase::AwaitingBan),
            "move" => Some(Phase::AwaitingMove),
            _ => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
