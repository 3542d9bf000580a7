//! Bans, moves and the actions that carry them.
//!
//! Both are written in UCI-style coordinate notation: a ban is a square pair
//! (`"e2e4"`), a move is a square pair with an optional promotion letter
//! (`"e7e8q"`). Castling is the king's two-square move (`"e1g1"`).

use crate::square::Square;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing action notation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseActionError {
    #[error("invalid action length: '{0}'")]
    InvalidLength(String),

    #[error("invalid square in '{0}'")]
    InvalidSquare(String),

    #[error("invalid promotion piece in '{0}'")]
    InvalidPromotion(String),
}

/// Piece a pawn may promote to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Promotion {
    #[serde(alias = "q")]
    Queen,
    #[serde(alias = "r")]
    Rook,
    #[serde(alias = "b")]
    Bishop,
    #[serde(alias = "n")]
    Knight,
}

impl Promotion {
    /// All promotion pieces, strongest first.
    pub const ALL: [Promotion; 4] = [
        Promotion::Queen,
        Promotion::Rook,
        Promotion::Bishop,
        Promotion::Knight,
    ];

    /// Returns the lowercase notation letter.
    #[inline]
    pub const fn to_char(self) -> char {
        match self {
            Promotion::Queen => 'q',
            Promotion::Rook => 'r',
            Promotion::Bishop => 'b',
            Promotion::Knight => 'n',
        }
    }

    /// Parses a notation letter (either case).
    #[inline]
    pub const fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'q' => Some(Promotion::Queen),
            'r' => Some(Promotion::Rook),
            'b' => Some(Promotion::Bishop),
            'n' => Some(Promotion::Knight),
            _ => None,
        }
    }
}

/// A forbidden square pair for the side about to move.
///
/// A ban ignores the promotion piece: banning `e7e8` forbids every promotion
/// on that pair.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ban {
    pub from: Square,
    pub to: Square,
}

impl Ban {
    #[inline]
    pub const fn new(from: Square, to: Square) -> Self {
        Ban { from, to }
    }

    /// Returns true if `mv` travels the banned square pair.
    #[inline]
    pub fn forbids(&self, mv: &Move) -> bool {
        self.from == mv.from && self.to == mv.to
    }

    /// Returns the UCI notation for this ban (e.g., "e2e4").
    pub fn to_uci(self) -> String {
        self.to_string()
    }

    /// Parses a ban from UCI notation.
    ///
    /// A trailing promotion letter is accepted and dropped, since a ban
    /// covers every promotion on its square pair.
    pub fn from_uci(s: &str) -> Result<Self, ParseActionError> {
        Move::from_uci(s).map(|mv| mv.as_ban())
    }
}

/// A move in coordinate notation, as submitted by a player.
///
/// `Move` carries no legality information; the engine validates it against
/// the current position.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Promotion>,
}

impl Move {
    /// Creates a move without promotion.
    #[inline]
    pub const fn new(from: Square, to: Square) -> Self {
        Move {
            from,
            to,
            promotion: None,
        }
    }

    /// Creates a promotion move.
    #[inline]
    pub const fn with_promotion(from: Square, to: Square, promotion: Promotion) -> Self {
        Move {
            from,
            to,
            promotion: Some(promotion),
        }
    }

    /// Returns the square pair of this move as a ban.
    #[inline]
    pub const fn as_ban(&self) -> Ban {
        Ban::new(self.from, self.to)
    }

    /// Returns the UCI notation for this move (e.g., "e2e4", "e7e8q").
    pub fn to_uci(self) -> String {
        self.to_string()
    }

    /// Parses a move from UCI notation.
    pub fn from_uci(s: &str) -> Result<Self, ParseActionError> {
        if (s.len() != 4 && s.len() != 5) || !s.is_ascii() {
            return Err(ParseActionError::InvalidLength(s.to_string()));
        }
        let (from, to) = parse_pair(s)?;
        let promotion = match s[4..].chars().next() {
            None => None,
            Some(c) => Some(
                Promotion::from_char(c)
                    .ok_or_else(|| ParseActionError::InvalidPromotion(s.to_string()))?,
            ),
        };
        Ok(Move {
            from,
            to,
            promotion,
        })
    }
}

fn parse_pair(s: &str) -> Result<(Square, Square), ParseActionError> {
    let from =
        Square::from_algebraic(&s[0..2]).ok_or_else(|| ParseActionError::InvalidSquare(s.into()))?;
    let to =
        Square::from_algebraic(&s[2..4]).ok_or_else(|| ParseActionError::InvalidSquare(s.into()))?;
    Ok((from, to))
}

impl fmt::Display for Ban {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

impl fmt::Debug for Ban {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ban({})", self)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(p) = self.promotion {
            write!(f, "{}", p.to_char())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({})", self)
    }
}

impl FromStr for Ban {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ban::from_uci(s)
    }
}

impl FromStr for Move {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Move::from_uci(s)
    }
}

impl TryFrom<String> for Ban {
    type Error = ParseActionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Ban::from_uci(&s)
    }
}

impl From<Ban> for String {
    fn from(ban: Ban) -> Self {
        ban.to_string()
    }
}

impl TryFrom<String> for Move {
    type Error = ParseActionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Move::from_uci(&s)
    }
}

impl From<Move> for String {
    fn from(mv: Move) -> Self {
        mv.to_string()
    }
}

/// One player action: a ban chosen by the opponent, or a move by the side
/// to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "uci", rename_all = "lowercase")]
pub enum Action {
    Ban(Ban),
    Move(Move),
}

impl Action {
    /// Returns the action's coordinate notation.
    pub fn to_uci(self) -> String {
        match self {
            Action::Ban(ban) => ban.to_uci(),
            Action::Move(mv) => mv.to_uci(),
        }
    }
}

impl From<Ban> for Action {
    fn from(ban: Ban) -> Self {
        Action::Ban(ban)
    }
}

impl From<Move> for Action {
    fn from(mv: Move) -> Self {
        Action::Move(mv)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Ban(ban) => write!(f, "ban {}", ban),
            Action::Move(mv) => write!(f, "{}", mv),
        }
    }
}
