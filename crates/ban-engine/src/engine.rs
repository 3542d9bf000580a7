//! Game management with an action log.
//!
//! [`RulesEngine`] owns the current [`GameState`] and records every accepted
//! ban and move. Rejected actions leave both the state and the log untouched.

use crate::board::BoardError;
use crate::error::{ActionError, BanError, GameError, MoveError};
use crate::notation::StateParseError;
use crate::state::GameState;
use ban_core::{Action, Ban, Color, Move, Outcome, Reason};
use serde::Serialize;
use tracing::{debug, info};

/// An accepted action in the game log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRecord {
    /// Ply count after the action was applied.
    pub ply: u32,
    /// The player who took the action.
    pub actor: Color,
    pub action: Action,
    /// SAN of the move in the position it was played from. Bans have none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub san: Option<String>,
}

/// A Ban Chess game.
///
/// ```
/// use ban_engine::{Ban, Move, Phase, RulesEngine};
///
/// let mut game = RulesEngine::new();
/// game.apply_ban(Ban::from_uci("e2e4").unwrap()).unwrap();
/// assert!(game.apply_move(Move::from_uci("e2e4").unwrap()).is_err());
/// game.apply_move(Move::from_uci("d2d4").unwrap()).unwrap();
/// assert_eq!(game.state().phase(), Phase::AwaitingBan);
/// ```
#[derive(Debug, Clone)]
pub struct RulesEngine {
    state: GameState,
    /// State the log starts from.
    origin: GameState,
    log: Vec<ActionRecord>,
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesEngine {
    /// Creates a game from the standard starting position.
    pub fn new() -> Self {
        Self::from_state(GameState::new())
    }

    /// Creates a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, BoardError> {
        Ok(Self::from_state(GameState::from_fen(fen)?))
    }

    /// Resumes a game from a stored state. The log starts empty.
    pub fn from_state(state: GameState) -> Self {
        RulesEngine {
            origin: state.clone(),
            state,
            log: Vec::new(),
        }
    }

    /// Resumes a game from its serialized form.
    pub fn deserialize(s: &str) -> Result<Self, StateParseError> {
        Ok(Self::from_state(GameState::deserialize(s)?))
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// The state the action log starts from.
    pub fn origin(&self) -> &GameState {
        &self.origin
    }

    /// Accepted actions, oldest first.
    pub fn history(&self) -> &[ActionRecord] {
        &self.log
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.state.outcome()
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    pub fn legal_actions(&self) -> Vec<Action> {
        self.state.legal_actions()
    }

    pub fn legal_bans(&self) -> Vec<Ban> {
        self.state.legal_bans()
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.state.legal_moves()
    }

    /// Bans a square pair for the side to move.
    pub fn apply_ban(&mut self, ban: Ban) -> Result<&GameState, BanError> {
        let next = self.state.after_ban(ban)?;
        self.commit(next, Action::Ban(ban), None);
        Ok(&self.state)
    }

    /// Plays a move for the side to move.
    pub fn apply_move(&mut self, mv: Move) -> Result<&GameState, MoveError> {
        let next = self.state.after_move(mv)?;
        let san = self.state.position().san(&mv);
        self.commit(next, Action::Move(mv), san);
        Ok(&self.state)
    }

    /// Bans a square pair given as text (`e2e4`).
    pub fn apply_ban_uci(&mut self, uci: &str) -> Result<&GameState, BanError> {
        let ban = Ban::from_uci(uci.trim()).map_err(|_| BanError::IllegalBan(uci.to_string()))?;
        self.apply_ban(ban)
    }

    /// Plays a move given as text (`e7e8q`).
    pub fn apply_move_uci(&mut self, uci: &str) -> Result<&GameState, MoveError> {
        let mv = Move::from_uci(uci.trim()).map_err(|_| MoveError::IllegalMove(uci.to_string()))?;
        self.apply_move(mv)
    }

    /// Applies either kind of action.
    pub fn apply(&mut self, action: Action) -> Result<&GameState, ActionError> {
        match action {
            Action::Ban(ban) => Ok(self.apply_ban(ban)?),
            Action::Move(mv) => Ok(self.apply_move(mv)?),
        }
    }

    /// Ends the game with `color` resigning.
    pub fn resign(&mut self, color: Color) -> Result<&GameState, GameError> {
        self.conclude(Outcome::win(color.opposite(), Reason::Resignation))
    }

    /// Ends the game with `color` out of time. Clocks are kept by the host.
    pub fn flag_timeout(&mut self, color: Color) -> Result<&GameState, GameError> {
        self.conclude(Outcome::win(color.opposite(), Reason::Timeout))
    }

    /// Ends the game as a draw by agreement.
    pub fn agree_draw(&mut self) -> Result<&GameState, GameError> {
        self.conclude(Outcome::draw(Reason::DrawAgreement))
    }

    pub(crate) fn conclude(&mut self, outcome: Outcome) -> Result<&GameState, GameError> {
        self.state = self.state.concluded(outcome)?;
        info!(%outcome, ply = self.state.ply_count(), "game concluded");
        Ok(&self.state)
    }

    /// Serializes the current state.
    pub fn serialize(&self) -> String {
        self.state.serialize()
    }

    fn commit(&mut self, next: GameState, action: Action, san: Option<String>) {
        let actor = self.state.actor();
        debug!(%actor, %action, ply = next.ply_count(), "action accepted");
        self.log.push(ActionRecord {
            ply: next.ply_count(),
            actor,
            action,
            san,
        });
        self.state = next;
        if let Some(outcome) = self.state.outcome() {
            info!(%outcome, ply = self.state.ply_count(), "game over");
        }
    }
}
