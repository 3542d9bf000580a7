//! Core types for Ban Chess.
//!
//! This crate provides the vocabulary shared by the rules engine and its
//! adapters, independent of any chess move generator:
//! - [`Color`] for players and turns
//! - [`Square`] for board coordinates
//! - [`Ban`], [`Move`] and [`Action`] for player input
//! - [`Phase`] for the ban/move turn segments
//! - [`Outcome`] for finished games

mod action;
mod color;
mod outcome;
mod phase;
mod square;

pub use action::{Action, Ban, Move, ParseActionError, Promotion};
pub use color::Color;
pub use outcome::{GameResult, Outcome, Reason};
pub use phase::Phase;
pub use square::{ParseSquareError, Square};
