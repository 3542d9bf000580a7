//! Player color representation.

use serde::{Deserialize, Serialize};

/// Represents the two players.
///
/// In Ban Chess the color also names the turn: the side whose move it is in
/// the underlying chess sense, even while the opponent is choosing a ban.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Color {
    #[serde(alias = "w", alias = "White")]
    White = 0,
    #[serde(alias = "b", alias = "Black")]
    Black = 1,
}

impl Color {
    /// Returns the opposite color.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Returns the FEN side-to-move character (`'w'` or `'b'`).
    #[inline]
    pub const fn to_char(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    /// Parses a FEN side-to-move character.
    #[inline]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'w' | 'W' => Some(Color::White),
            'b' | 'B' => Some(Color::Black),
            _ => None,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}
