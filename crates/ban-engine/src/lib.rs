//! Ban Chess rules engine.
//!
//! In Ban Chess every chess move is preceded by a ban: the opponent of the
//! side to move forbids one `{from, to}` square pair, then the side to move
//! plays any other legal move. A player left with no move once the ban is in
//! place is checkmated when in check and stalemated otherwise.
//!
//! This crate provides:
//! - [`GameState`] - the complete, serializable game state with pure transitions
//! - [`RulesEngine`] - game management with an action log
//! - [`Board`] - chess positions, backed by `shakmaty`
//! - Compact state notation ([`GameState::serialize`] / [`GameState::deserialize`])
//! - [`GameRecord`] replay and PGN export
//! - [`payload`] normalization for JSON transports and [`Snapshot`] output
//! - [`Reconciler`] for optimistic play against an authoritative state
//!
//! # Example
//!
//! ```
//! use ban_engine::{Color, Outcome, Phase, Reason, RulesEngine};
//!
//! let mut game = RulesEngine::new();
//! assert_eq!(game.state().actor(), Color::Black);
//! assert_eq!(game.legal_bans().len(), 20);
//!
//! game.apply_ban_uci("e2e4").unwrap();
//! assert!(game.apply_move_uci("e2e4").is_err());
//! game.apply_move_uci("d2d4").unwrap();
//! assert_eq!(game.state().phase(), Phase::AwaitingBan);
//!
//! let saved = game.serialize();
//! let mut resumed = RulesEngine::deserialize(&saved).unwrap();
//! resumed.resign(Color::Black).unwrap();
//! assert_eq!(
//!     resumed.outcome(),
//!     Some(Outcome::win(Color::White, Reason::Resignation))
//! );
//! ```

mod board;
mod engine;
mod error;
mod notation;
pub mod payload;
mod record;
mod state;
mod sync;

pub use board::{Board, BoardError, STARTPOS};
pub use engine::{ActionRecord, RulesEngine};
pub use error::{ActionError, BanError, GameError, MoveError};
pub use notation::{StateParseError, StateParts};
pub use payload::{PayloadError, Snapshot};
pub use record::{GameRecord, PgnTags, ReplayError};
pub use state::{GameState, FIFTY_MOVE_PLIES, REPETITION_LIMIT};
pub use sync::{Reconciler, Reconciliation};

pub use ban_core::{
    Action, Ban, Color, GameResult, Move, Outcome, ParseActionError, Phase, Promotion, Reason,
    Square,
};
