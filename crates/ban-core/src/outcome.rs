//! Finished-game results.

use crate::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    #[serde(alias = "whiteWins", alias = "WhiteWins")]
    WhiteWins,
    #[serde(alias = "blackWins", alias = "BlackWins")]
    BlackWins,
    #[serde(alias = "Draw")]
    Draw,
}

impl GameResult {
    /// The win for `color`.
    #[inline]
    pub const fn win_for(color: Color) -> Self {
        match color {
            Color::White => GameResult::WhiteWins,
            Color::Black => GameResult::BlackWins,
        }
    }

    /// Returns the winning color, or `None` for a draw.
    #[inline]
    pub const fn winner(self) -> Option<Color> {
        match self {
            GameResult::WhiteWins => Some(Color::White),
            GameResult::BlackWins => Some(Color::Black),
            GameResult::Draw => None,
        }
    }

    /// PGN result token.
    pub const fn pgn(self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "1/2-1/2",
        }
    }

    /// Parses a PGN result token.
    pub fn from_pgn(s: &str) -> Option<Self> {
        match s {
            "1-0" => Some(GameResult::WhiteWins),
            "0-1" => Some(GameResult::BlackWins),
            "1/2-1/2" => Some(GameResult::Draw),
            _ => None,
        }
    }
}

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    #[serde(alias = "Checkmate")]
    Checkmate,
    #[serde(alias = "Stalemate")]
    Stalemate,
    #[serde(alias = "insufficientMaterial", alias = "InsufficientMaterial")]
    InsufficientMaterial,
    #[serde(alias = "threefoldRepetition", alias = "ThreefoldRepetition")]
    ThreefoldRepetition,
    #[serde(alias = "fiftyMoveRule", alias = "FiftyMoveRule")]
    FiftyMoveRule,
    /// Assigned by the host, never detected by the engine.
    #[serde(alias = "Resignation")]
    Resignation,
    /// Assigned by the host's clock, never detected by the engine.
    #[serde(alias = "Timeout")]
    Timeout,
    /// Assigned by the host, never detected by the engine.
    #[serde(alias = "drawAgreement", alias = "DrawAgreement")]
    DrawAgreement,
}

impl Reason {
    pub const ALL: [Reason; 8] = [
        Reason::Checkmate,
        Reason::Stalemate,
        Reason::InsufficientMaterial,
        Reason::ThreefoldRepetition,
        Reason::FiftyMoveRule,
        Reason::Resignation,
        Reason::Timeout,
        Reason::DrawAgreement,
    ];

    /// Kebab-case token used by the compact state notation.
    pub const fn token(self) -> &'static str {
        match self {
            Reason::Checkmate => "checkmate",
            Reason::Stalemate => "stalemate",
            Reason::InsufficientMaterial => "insufficient-material",
            Reason::ThreefoldRepetition => "threefold-repetition",
            Reason::FiftyMoveRule => "fifty-move-rule",
            Reason::Resignation => "resignation",
            Reason::Timeout => "timeout",
            Reason::DrawAgreement => "draw-agreement",
        }
    }

    pub fn from_token(s: &str) -> Option<Self> {
        Reason::ALL.into_iter().find(|r| r.token() == s)
    }

    /// Returns true for reasons the engine detects on its own.
    pub const fn is_detected(self) -> bool {
        !matches!(
            self,
            Reason::Resignation | Reason::Timeout | Reason::DrawAgreement
        )
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// How and why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Outcome {
    pub result: GameResult,
    pub reason: Reason,
}

impl Outcome {
    #[inline]
    pub const fn new(result: GameResult, reason: Reason) -> Self {
        Outcome { result, reason }
    }

    /// A decisive result for `winner`.
    #[inline]
    pub const fn win(winner: Color, reason: Reason) -> Self {
        Outcome::new(GameResult::win_for(winner), reason)
    }

    #[inline]
    pub const fn draw(reason: Reason) -> Self {
        Outcome::new(GameResult::Draw, reason)
    }

    /// Compact `<result>:<reason>` token, e.g. `1-0:checkmate`.
    pub fn token(self) -> String {
        format!("{}:{}", self.result.pgn(), self.reason.token())
    }

    pub fn from_token(s: &str) -> Option<Self> {
        let (result, reason) = s.split_once(':')?;
        Some(Outcome::new(
            GameResult::from_pgn(result)?,
            Reason::from_token(reason)?,
        ))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.result.winner() {
            Some(color) => write!(f, "{} wins by {}", color, self.reason),
            None => write!(f, "draw by {}", self.reason),
        }
    }
}
