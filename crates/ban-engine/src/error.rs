//! Rejections returned by the rules engine.
//!
//! Every variant is a routine, caller-recoverable condition. A rejected
//! action never changes the game state, so the same rejection can be
//! reproduced and compared.

use ban_core::Ban;
use thiserror::Error;

/// Errors common to every action.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("game has already ended")]
    GameOver,

    /// The ply counter cannot advance any further.
    #[error("ply counter exhausted")]
    PlyLimit,
}

/// Errors returned by [`apply_ban`](crate::RulesEngine::apply_ban).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BanError {
    #[error(transparent)]
    Game(#[from] GameError),

    #[error("cannot ban: the game is waiting for a move")]
    NotBanPhase,

    #[error("illegal ban: {0}")]
    IllegalBan(String),
}

/// Errors returned by [`apply_move`](crate::RulesEngine::apply_move).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MoveError {
    #[error(transparent)]
    Game(#[from] GameError),

    #[error("cannot move: the game is waiting for a ban")]
    NotMovePhase,

    #[error("move is banned: {0}")]
    MoveBanned(Ban),

    #[error("illegal move: {0}")]
    IllegalMove(String),
}

/// Either kind of action rejection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error(transparent)]
    Ban(#[from] BanError),

    #[error(transparent)]
    Move(#[from] MoveError),
}
