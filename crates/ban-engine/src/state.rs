//! The serializable game state and its pure transitions.
//!
//! Every transition takes `&self` and returns a new [`GameState`]; a rejected
//! action leaves the original untouched.

use crate::board::{Board, BoardError};
use crate::error::{ActionError, BanError, GameError, MoveError};
use ban_core::{Action, Ban, Color, Move, Outcome, Phase, Reason};

/// Half-moves without capture or pawn move that draw the game.
pub const FIFTY_MOVE_PLIES: u32 = 100;

/// Occurrences of one position that draw the game.
pub const REPETITION_LIMIT: usize = 3;

/// Complete state of a Ban Chess game.
///
/// Invariants:
/// - `phase == AwaitingBan` implies no standing ban.
/// - `phase == AwaitingMove` implies a standing ban.
/// - `turn` is the position's side to move.
/// - once `outcome` is set no further action is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub(crate) position: Board,
    pub(crate) phase: Phase,
    pub(crate) turn: Color,
    pub(crate) banned: Option<Ban>,
    pub(crate) ply_count: u32,
    pub(crate) outcome: Option<Outcome>,
    /// Position keys since the last irreversible move, oldest first.
    pub(crate) repetitions: Vec<u64>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Creates a game from the standard starting position: Black bans first.
    pub fn new() -> Self {
        Self::from_board(Board::startpos())
    }

    /// Creates a game from a custom position, waiting for a ban against the
    /// side to move.
    ///
    /// A position that is already finished (no legal moves, insufficient
    /// material, exhausted fifty-move counter) starts with its outcome set.
    pub fn from_board(position: Board) -> Self {
        let mut state = GameState {
            turn: position.turn(),
            repetitions: vec![position.repetition_key()],
            position,
            phase: Phase::AwaitingBan,
            banned: None,
            ply_count: 0,
            outcome: None,
        };
        state.outcome = state.detect_after_move();
        state
    }

    /// Creates a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, BoardError> {
        Ok(Self::from_board(Board::from_fen(fen)?))
    }

    pub fn position(&self) -> &Board {
        &self.position
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The side whose move it is, or was when the game ended.
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// The player expected to act next: the opponent of `turn` while a ban
    /// is awaited, `turn` itself while a move is awaited.
    pub fn actor(&self) -> Color {
        self.phase.actor(self.turn)
    }

    /// The standing ban, if any.
    pub fn banned(&self) -> Option<Ban> {
        self.banned
    }

    /// Bans plus moves taken so far.
    pub fn ply_count(&self) -> u32 {
        self.ply_count
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn repetitions(&self) -> &[u64] {
        &self.repetitions
    }

    /// How many times the current position has occurred since the last
    /// irreversible move.
    pub fn repetition_count(&self) -> usize {
        let key = self.position.repetition_key();
        self.repetitions.iter().filter(|&&k| k == key).count()
    }

    /// Returns every action the current actor may take.
    pub fn legal_actions(&self) -> Vec<Action> {
        match self.phase {
            Phase::AwaitingBan => self.legal_bans().into_iter().map(Action::Ban).collect(),
            Phase::AwaitingMove => self.legal_moves().into_iter().map(Action::Move).collect(),
        }
    }

    /// Ban candidates: one per legal square pair of the side to move.
    ///
    /// Empty unless the game is ongoing and waiting for a ban.
    pub fn legal_bans(&self) -> Vec<Ban> {
        if self.is_over() || self.phase != Phase::AwaitingBan {
            return Vec::new();
        }
        let mut bans: Vec<Ban> = Vec::new();
        for mv in self.position.legal_moves() {
            let ban = mv.as_ban();
            if !bans.contains(&ban) {
                bans.push(ban);
            }
        }
        bans
    }

    /// Legal moves of the side to move minus every move on the banned pair.
    ///
    /// Empty unless the game is ongoing and waiting for a move.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.is_over() || self.phase != Phase::AwaitingMove {
            return Vec::new();
        }
        self.position
            .legal_moves()
            .into_iter()
            .filter(|mv| !self.banned.is_some_and(|ban| ban.forbids(mv)))
            .collect()
    }

    /// Returns the state after the opponent of the side to move bans `ban`.
    ///
    /// If no move remains once the ban is in place the game ends: checkmate
    /// when the side to move is in check, stalemate otherwise.
    pub fn after_ban(&self, ban: Ban) -> Result<GameState, BanError> {
        self.ensure_ongoing()?;
        if self.phase != Phase::AwaitingBan {
            return Err(BanError::NotBanPhase);
        }
        if !self
            .position
            .legal_moves()
            .iter()
            .any(|mv| ban.forbids(mv))
        {
            return Err(BanError::IllegalBan(ban.to_uci()));
        }

        let ply_count = self.next_ply()?;
        let mut next = self.clone();
        next.banned = Some(ban);
        next.phase = Phase::AwaitingMove;
        next.ply_count = ply_count;

        if next.legal_moves().is_empty() {
            next.outcome = Some(if next.position.is_check() {
                Outcome::win(next.turn.opposite(), Reason::Checkmate)
            } else {
                Outcome::draw(Reason::Stalemate)
            });
        }
        Ok(next)
    }

    /// Returns the state after the side to move plays `mv`.
    pub fn after_move(&self, mv: Move) -> Result<GameState, MoveError> {
        self.ensure_ongoing()?;
        if self.phase != Phase::AwaitingMove {
            return Err(MoveError::NotMovePhase);
        }
        if let Some(ban) = self.banned {
            if ban.forbids(&mv) {
                return Err(MoveError::MoveBanned(ban));
            }
        }
        let ply_count = self.next_ply()?;
        let position = self
            .position
            .play(&mv)
            .ok_or_else(|| MoveError::IllegalMove(mv.to_uci()))?;

        let mut repetitions = if position.halfmove_clock() == 0 {
            Vec::new()
        } else {
            self.repetitions.clone()
        };
        repetitions.push(position.repetition_key());

        let mut next = GameState {
            turn: position.turn(),
            position,
            phase: Phase::AwaitingBan,
            banned: None,
            ply_count,
            outcome: None,
            repetitions,
        };
        next.outcome = next.detect_after_move();
        Ok(next)
    }

    /// Applies either kind of action.
    pub fn apply(&self, action: Action) -> Result<GameState, ActionError> {
        match action {
            Action::Ban(ban) => Ok(self.after_ban(ban)?),
            Action::Move(mv) => Ok(self.after_move(mv)?),
        }
    }

    /// Returns the state with an outcome decided outside the board.
    pub fn concluded(&self, outcome: Outcome) -> Result<GameState, GameError> {
        self.ensure_ongoing()?;
        let mut next = self.clone();
        next.outcome = Some(outcome);
        Ok(next)
    }

    fn next_ply(&self) -> Result<u32, GameError> {
        self.ply_count.checked_add(1).ok_or(GameError::PlyLimit)
    }

    fn ensure_ongoing(&self) -> Result<(), GameError> {
        match self.outcome {
            Some(_) => Err(GameError::GameOver),
            None => Ok(()),
        }
    }

    /// Terminal conditions that do not depend on the next ban.
    pub(crate) fn detect_after_move(&self) -> Option<Outcome> {
        let board = &self.position;
        if !board.has_legal_moves() {
            // Nothing to ban: the position is already decided.
            return Some(if board.is_check() {
                Outcome::win(self.turn.opposite(), Reason::Checkmate)
            } else {
                Outcome::draw(Reason::Stalemate)
            });
        }
        if board.is_insufficient_material() {
            return Some(Outcome::draw(Reason::InsufficientMaterial));
        }
        if board.halfmove_clock() >= FIFTY_MOVE_PLIES {
            return Some(Outcome::draw(Reason::FiftyMoveRule));
        }
        if self.repetition_count() >= REPETITION_LIMIT {
            return Some(Outcome::draw(Reason::ThreefoldRepetition));
        }
        None
    }
}
