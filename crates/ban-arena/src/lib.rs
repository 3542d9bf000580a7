//! Ban Arena - self-play harness for the Ban Chess rules engine.
//!
//! Plays random games through the public engine API, tallies results and
//! exports game records.
//!
//! # Modules
//!
//! - [`config`] - `arena.toml` loading
//! - [`runner`] - random self-play and session summaries
//! - [`output`] - JSON records and PGN files

pub mod config;
pub mod output;
pub mod runner;
