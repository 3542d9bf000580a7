//! Chess positions, backed by `shakmaty`.
//!
//! [`Board`] is the only place the engine touches the move generator. It
//! speaks the coordinate vocabulary of `ban_core` on its surface, so the ban
//! layer never sees generator types.

use ban_core::{Color, Move, Promotion, Square};
use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::zobrist::Zobrist64;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Position, Role};
use std::fmt;
use thiserror::Error;

/// The standard starting position FEN.
pub const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Errors that can occur when building a position from FEN.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    #[error("illegal position: {0}")]
    IllegalPosition(String),
}

/// An immutable chess position.
///
/// Every mutation produces a new `Board`. Two boards are equal when they
/// render to the same FEN.
#[derive(Clone)]
pub struct Board {
    inner: Chess,
}

impl Board {
    /// Returns the standard starting position.
    pub fn startpos() -> Self {
        Board {
            inner: Chess::default(),
        }
    }

    /// Parses a position from FEN.
    pub fn from_fen(fen: &str) -> Result<Self, BoardError> {
        let parsed: Fen = fen
            .trim()
            .parse()
            .map_err(|e: shakmaty::fen::ParseFenError| BoardError::InvalidFen(e.to_string()))?;
        let inner = parsed
            .into_position::<Chess>(CastlingMode::Standard)
            .map_err(|e| BoardError::IllegalPosition(e.to_string()))?;
        Ok(Board { inner })
    }

    /// Returns the position as FEN. The en passant square is only written
    /// when a legal en passant capture exists.
    pub fn to_fen(&self) -> String {
        Fen::from_position(&self.inner, EnPassantMode::Legal).to_string()
    }

    /// Returns the side to move.
    pub fn turn(&self) -> Color {
        match self.inner.turn() {
            shakmaty::Color::White => Color::White,
            shakmaty::Color::Black => Color::Black,
        }
    }

    /// Returns all legal moves for the side to move.
    ///
    /// Promotions appear once per promotion piece.
    pub fn legal_moves(&self) -> Vec<Move> {
        self.inner.legal_moves().iter().filter_map(to_move).collect()
    }

    /// Returns true if the side to move has at least one legal move.
    pub fn has_legal_moves(&self) -> bool {
        !self.inner.legal_moves().is_empty()
    }

    /// Returns true if `mv` is legal, promotion piece included.
    pub fn is_legal(&self, mv: &Move) -> bool {
        self.find(mv).is_some()
    }

    /// Returns true if the side to move is in check.
    pub fn is_check(&self) -> bool {
        self.inner.is_check()
    }

    /// Returns true if neither side has sufficient material to checkmate.
    pub fn is_insufficient_material(&self) -> bool {
        self.inner.is_insufficient_material()
    }

    /// Half-moves since the last capture or pawn move.
    pub fn halfmove_clock(&self) -> u32 {
        self.inner.halfmoves()
    }

    /// The current full move number.
    pub fn fullmove_number(&self) -> u32 {
        self.inner.fullmoves().get()
    }

    /// Plays a legal move, returning the resulting position.
    ///
    /// Returns `None` if the move is illegal.
    pub fn play(&self, mv: &Move) -> Option<Board> {
        let m = self.find(mv)?;
        let inner = self.inner.clone().play(m).ok()?;
        Some(Board { inner })
    }

    /// Returns SAN (with check/mate suffix) for a legal move.
    pub fn san(&self, mv: &Move) -> Option<String> {
        let m = self.find(mv)?;
        Some(SanPlus::from_move(self.inner.clone(), m).to_string())
    }

    /// Key identifying the position for repetition detection: placement,
    /// side to move, castling rights and legal en passant square.
    pub fn repetition_key(&self) -> u64 {
        self.inner
            .zobrist_hash::<Zobrist64>(EnPassantMode::Legal)
            .0
    }

    /// Returns the FEN character of the piece on `square`, if any.
    pub fn piece_at(&self, square: Square) -> Option<char> {
        let sq: shakmaty::Square = square.to_string().parse().ok()?;
        self.inner.board().piece_at(sq).map(|p| p.char())
    }

    fn find(&self, mv: &Move) -> Option<shakmaty::Move> {
        self.inner
            .legal_moves()
            .into_iter()
            .find(|m| to_move(m).as_ref() == Some(mv))
    }
}

fn to_move(m: &shakmaty::Move) -> Option<Move> {
    match m.to_uci(CastlingMode::Standard) {
        UciMove::Normal {
            from,
            to,
            promotion,
        } => {
            let promotion = match promotion {
                None => None,
                Some(role) => Some(to_promotion(role)?),
            };
            Some(Move {
                from: to_square(from)?,
                to: to_square(to)?,
                promotion,
            })
        }
        _ => None,
    }
}

fn to_square(sq: shakmaty::Square) -> Option<Square> {
    Square::from_algebraic(&sq.to_string())
}

fn to_promotion(role: Role) -> Option<Promotion> {
    match role {
        Role::Queen => Some(Promotion::Queen),
        Role::Rook => Some(Promotion::Rook),
        Role::Bishop => Some(Promotion::Bishop),
        Role::Knight => Some(Promotion::Knight),
        _ => None,
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::startpos()
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.to_fen() == other.to_fen()
    }
}

impl Eq for Board {}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({})", self.to_fen())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fen())
    }
}
