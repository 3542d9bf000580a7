//! Board square representation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a square name cannot be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid square: '{0}'")]
pub struct ParseSquareError(pub String);

/// A square on the chess board, indexed 0-63.
///
/// Squares are indexed in little-endian rank-file mapping:
/// - a1 = 0, b1 = 1, ..., h1 = 7
/// - a2 = 8, ..., h8 = 63
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square(u8);

impl Square {
    /// Creates a square from index (0-63).
    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 64 {
            Some(Square(index))
        } else {
            None
        }
    }

    /// Creates a square from zero-based file and rank coordinates.
    #[inline]
    pub const fn from_coords(file: u8, rank: u8) -> Option<Self> {
        if file < 8 && rank < 8 {
            Some(Square(rank * 8 + file))
        } else {
            None
        }
    }

    /// Parses a square from algebraic notation (e.g., "e4").
    ///
    /// The file letter may be upper or lower case.
    pub const fn from_algebraic(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = bytes[0].to_ascii_lowercase();
        let rank = bytes[1];
        if file < b'a' || file > b'h' || rank < b'1' || rank > b'8' {
            return None;
        }
        Self::from_coords(file - b'a', rank - b'1')
    }

    /// Returns the index (0-63).
    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Returns the zero-based file (0 = a).
    #[inline]
    pub const fn file(self) -> u8 {
        self.0 % 8
    }

    /// Returns the zero-based rank (0 = rank 1).
    #[inline]
    pub const fn rank(self) -> u8 {
        self.0 / 8
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            (b'a' + self.file()) as char,
            (b'1' + self.rank()) as char
        )
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Square({})", self)
    }
}

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Square::from_algebraic(s).ok_or_else(|| ParseSquareError(s.to_string()))
    }
}

impl TryFrom<String> for Square {
    type Error = ParseSquareError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Square> for String {
    fn from(sq: Square) -> Self {
        sq.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn corner_squares() {
        assert_eq!(Square::from_algebraic("a1").unwrap().index(), 0);
        assert_eq!(Square::from_algebraic("h1").unwrap().index(), 7);
        assert_eq!(Square::from_algebraic("a8").unwrap().index(), 56);
        assert_eq!(Square::from_algebraic("h8").unwrap().index(), 63);
    }

    #[test]
    fn uppercase_file_accepted() {
        assert_eq!(Square::from_algebraic("E4"), Square::from_algebraic("e4"));
    }

    #[test]
    fn rejects_malformed() {
        for bad in ["", "e", "e9", "i1", "e44", "4e"] {
            assert!(Square::from_algebraic(bad).is_none(), "{bad} accepted");
        }
        assert_eq!(
            "z0".parse::<Square>(),
            Err(ParseSquareError("z0".to_string()))
        );
    }

    #[test]
    fn out_of_range_index() {
        assert!(Square::from_index(64).is_none());
        assert!(Square::from_coords(8, 0).is_none());
    }

    #[test]
    fn serde_as_string() {
        let e4 = Square::from_algebraic("e4").unwrap();
        assert_eq!(serde_json::to_string(&e4).unwrap(), "\"e4\"");
        let back: Square = serde_json::from_str("\"e4\"").unwrap();
        assert_eq!(back, e4);
        assert!(serde_json::from_str::<Square>("\"k4\"").is_err());
    }

    proptest! {
        #[test]
        fn display_parses_back(index in 0u8..64) {
            let sq = Square::from_index(index).unwrap();
            prop_assert_eq!(sq.to_string().parse::<Square>(), Ok(sq));
        }
    }
}
