//! Random self-play.
//!
//! Both sides pick uniformly among their legal actions: a random ban, then a
//! random move among those the ban leaves. Games that run past the ply limit
//! stop unfinished.

use crate::output::describe;
use ban_core::{GameResult, Outcome};
use ban_engine::{ActionError, BoardError, RulesEngine, StateParseError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while running self-play games.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("invalid start position: {0}")]
    Fen(#[from] BoardError),

    #[error("invalid start state: {0}")]
    State(#[from] StateParseError),

    /// The engine rejected an action it listed as legal.
    #[error("listed action rejected: {0}")]
    Rejected(#[from] ActionError),
}

/// A game played by [`SelfPlay`].
#[derive(Debug, Clone)]
pub struct PlayedGame {
    pub engine: RulesEngine,
}

impl PlayedGame {
    pub fn outcome(&self) -> Option<Outcome> {
        self.engine.outcome()
    }

    /// Plies played in this game.
    pub fn plies(&self) -> usize {
        self.engine.history().len()
    }
}

/// Plays random games from a fixed start.
pub struct SelfPlay {
    rng: StdRng,
    max_plies: u32,
    start: RulesEngine,
}

impl SelfPlay {
    /// Creates a runner from the standard starting position.
    pub fn new(seed: u64, max_plies: u32) -> Self {
        SelfPlay {
            rng: StdRng::seed_from_u64(seed),
            max_plies,
            start: RulesEngine::new(),
        }
    }

    /// Starts every game from `start`: a FEN or a serialized state.
    pub fn with_start(mut self, start: &str) -> Result<Self, RunnerError> {
        self.start = if start.contains('|') {
            RulesEngine::deserialize(start)?
        } else {
            RulesEngine::from_fen(start)?
        };
        Ok(self)
    }

    /// Plays one game to its end or to the ply limit.
    pub fn play_game(&mut self) -> Result<PlayedGame, RunnerError> {
        let mut engine = self.start.clone();
        while !engine.is_over() && (engine.history().len() as u32) < self.max_plies {
            let actions = engine.legal_actions();
            let Some(&action) = actions.choose(&mut self.rng) else {
                break;
            };
            engine.apply(action)?;
        }
        match engine.outcome() {
            Some(outcome) => debug!(%outcome, plies = engine.history().len(), "game finished"),
            None => debug!(plies = engine.history().len(), "ply limit reached"),
        }
        Ok(PlayedGame { engine })
    }
}

/// Running totals over a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub white_wins: u32,
    pub black_wins: u32,
    pub draws: u32,
    pub unfinished: u32,
}

impl Summary {
    pub fn add(&mut self, game: &PlayedGame) {
        match game.outcome().map(|o| o.result) {
            Some(GameResult::WhiteWins) => self.white_wins += 1,
            Some(GameResult::BlackWins) => self.black_wins += 1,
            Some(GameResult::Draw) => self.draws += 1,
            None => self.unfinished += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.white_wins + self.black_wins + self.draws + self.unfinished
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "W:{} B:{} D:{} unfinished:{}",
            self.white_wins, self.black_wins, self.draws, self.unfinished
        )
    }
}

/// Plays `games` games, calling `on_game` after each one.
pub fn run_session(
    runner: &mut SelfPlay,
    games: u32,
    mut on_game: impl FnMut(u32, &PlayedGame),
) -> Result<Summary, RunnerError> {
    let mut summary = Summary::default();
    for index in 1..=games {
        let game = runner.play_game()?;
        summary.add(&game);
        info!(
            game = index,
            plies = game.plies(),
            outcome = %describe(game.outcome()),
            "game complete"
        );
        on_game(index, &game);
    }
    Ok(summary)
}
