//! WebAssembly bindings for the Ban Chess rules engine.
//!
//! Each [`BanChessGame`] owns one engine instance. There is no module-level
//! game store: the host creates, keeps and drops games itself.
//!
//! # Usage
//!
//! ```javascript
//! import init, { BanChessGame } from 'ban-wasm';
//!
//! await init();
//!
//! const game = new BanChessGame();
//! console.log(game.actor());          // "black": Black bans first
//! game.applyBan("e2e4");
//! game.applyMove("d2d4");
//!
//! localStorage.setItem("game", game.state());
//! const resumed = BanChessGame.fromState(localStorage.getItem("game"));
//! console.log(resumed.snapshot());
//! ```

use ban_core::{Color, Outcome, Phase};
use ban_engine::payload::{ActionPayload, Snapshot};
use ban_engine::{PgnTags, RulesEngine};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// A Ban Chess game that can be driven from JavaScript.
#[wasm_bindgen]
pub struct BanChessGame {
    engine: RulesEngine,
}

/// Outcome as handed to JavaScript.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutcomeJs {
    /// `"white_wins"`, `"black_wins"` or `"draw"`.
    result: ban_core::GameResult,
    reason: ban_core::Reason,
    /// `"white"`, `"black"` or absent for draws.
    #[serde(skip_serializing_if = "Option::is_none")]
    winner: Option<Color>,
    /// Compact token, e.g. `"1-0:checkmate"`.
    token: String,
    description: String,
}

impl From<Outcome> for OutcomeJs {
    fn from(outcome: Outcome) -> Self {
        OutcomeJs {
            result: outcome.result,
            reason: outcome.reason,
            winner: outcome.result.winner(),
            token: outcome.token(),
            description: outcome.to_string(),
        }
    }
}

fn js_error(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

fn color_name(color: Color) -> String {
    match color {
        Color::White => "white".to_string(),
        Color::Black => "black".to_string(),
    }
}

fn parse_color(s: &str) -> Option<Color> {
    match s.trim().to_ascii_lowercase().as_str() {
        "white" | "w" => Some(Color::White),
        "black" | "b" => Some(Color::Black),
        _ => None,
    }
}

#[wasm_bindgen]
impl BanChessGame {
    /// Creates a game from the standard starting position.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        BanChessGame {
            engine: RulesEngine::new(),
        }
    }

    /// Creates a game from a FEN string, waiting for a ban.
    #[wasm_bindgen(js_name = fromFen)]
    pub fn from_fen(fen: &str) -> Result<BanChessGame, JsError> {
        let engine = RulesEngine::from_fen(fen).map_err(js_error)?;
        Ok(BanChessGame { engine })
    }

    /// Resumes a game from a string produced by [`state`](Self::state).
    #[wasm_bindgen(js_name = fromState)]
    pub fn from_state(state: &str) -> Result<BanChessGame, JsError> {
        let engine = RulesEngine::deserialize(state).map_err(js_error)?;
        Ok(BanChessGame { engine })
    }

    /// Returns the serialized game state.
    pub fn state(&self) -> String {
        self.engine.serialize()
    }

    /// Returns the current position as FEN.
    pub fn fen(&self) -> String {
        self.engine.state().position().to_fen()
    }

    /// Returns `"ban"` or `"move"`.
    pub fn phase(&self) -> String {
        self.engine.state().phase().token().to_string()
    }

    /// Returns the side to move (`"white"` or `"black"`).
    pub fn turn(&self) -> String {
        color_name(self.engine.state().turn())
    }

    /// Returns the player expected to act next.
    pub fn actor(&self) -> String {
        color_name(self.engine.state().actor())
    }

    /// Returns the standing ban (e.g. `"e2e4"`), or null.
    #[wasm_bindgen(js_name = bannedAction)]
    pub fn banned_action(&self) -> Option<String> {
        self.engine.state().banned().map(|b| b.to_uci())
    }

    #[wasm_bindgen(js_name = plyCount)]
    pub fn ply_count(&self) -> u32 {
        self.engine.state().ply_count()
    }

    /// Returns the legal bans or moves for the current phase, in UCI.
    #[wasm_bindgen(js_name = legalActions)]
    pub fn legal_actions(&self) -> Vec<String> {
        self.engine
            .legal_actions()
            .into_iter()
            .map(|a| a.to_uci())
            .collect()
    }

    #[wasm_bindgen(js_name = isCheck)]
    pub fn is_check(&self) -> bool {
        self.engine.state().position().is_check()
    }

    #[wasm_bindgen(js_name = isGameOver)]
    pub fn is_game_over(&self) -> bool {
        self.engine.is_over()
    }

    /// Returns the piece on a square as a FEN letter, or null.
    #[wasm_bindgen(js_name = pieceAt)]
    pub fn piece_at(&self, square: &str) -> Option<String> {
        let sq = ban_core::Square::from_algebraic(square)?;
        self.engine
            .state()
            .position()
            .piece_at(sq)
            .map(|c| c.to_string())
    }

    /// Bans a square pair (e.g. `"e2e4"`) for the side to move.
    #[wasm_bindgen(js_name = applyBan)]
    pub fn apply_ban(&mut self, uci: &str) -> Result<(), JsError> {
        self.engine.apply_ban_uci(uci).map_err(js_error)?;
        Ok(())
    }

    /// Plays a move (e.g. `"e7e8q"`) for the side to move.
    #[wasm_bindgen(js_name = applyMove)]
    pub fn apply_move(&mut self, uci: &str) -> Result<(), JsError> {
        self.engine.apply_move_uci(uci).map_err(js_error)?;
        Ok(())
    }

    /// Applies an action object such as `{ from: "e2", to: "e4" }` or
    /// `{ type: "ban", uci: "e2e4" }`.
    #[wasm_bindgen(js_name = applyAction)]
    pub fn apply_action(&mut self, payload: JsValue) -> Result<(), JsError> {
        let payload: ActionPayload = serde_wasm_bindgen::from_value(payload).map_err(js_error)?;
        let action = payload
            .into_action(self.engine.state().phase())
            .map_err(js_error)?;
        self.engine.apply(action).map_err(js_error)?;
        Ok(())
    }

    /// Ends the game with `color` resigning.
    pub fn resign(&mut self, color: &str) -> Result<(), JsError> {
        let color = parse_color(color).ok_or_else(|| js_error(format!("invalid color: {color}")))?;
        self.engine.resign(color).map_err(js_error)?;
        Ok(())
    }

    /// Ends the game with `color` out of time.
    #[wasm_bindgen(js_name = flagTimeout)]
    pub fn flag_timeout(&mut self, color: &str) -> Result<(), JsError> {
        let color = parse_color(color).ok_or_else(|| js_error(format!("invalid color: {color}")))?;
        self.engine.flag_timeout(color).map_err(js_error)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = agreeDraw)]
    pub fn agree_draw(&mut self) -> Result<(), JsError> {
        self.engine.agree_draw().map_err(js_error)?;
        Ok(())
    }

    /// Returns `{ result, reason, winner, token, description }`, or null
    /// while the game is ongoing.
    pub fn outcome(&self) -> Result<JsValue, JsError> {
        match self.engine.outcome() {
            None => Ok(JsValue::NULL),
            Some(outcome) => {
                serde_wasm_bindgen::to_value(&OutcomeJs::from(outcome)).map_err(js_error)
            }
        }
    }

    /// Returns the outbound snapshot object (camelCase fields).
    pub fn snapshot(&self) -> Result<JsValue, JsError> {
        serde_wasm_bindgen::to_value(&Snapshot::of(self.engine.state())).map_err(js_error)
    }

    /// Returns the accepted actions with actor and SAN.
    pub fn history(&self) -> Result<JsValue, JsError> {
        serde_wasm_bindgen::to_value(self.engine.history()).map_err(js_error)
    }

    /// Returns the game as PGN with bans as comments.
    #[wasm_bindgen(js_name = toPgn)]
    pub fn to_pgn(&self, white: Option<String>, black: Option<String>) -> String {
        let defaults = PgnTags::default();
        let tags = PgnTags {
            white: white.unwrap_or(defaults.white.clone()),
            black: black.unwrap_or(defaults.black.clone()),
            ..defaults
        };
        self.engine.to_pgn(&tags)
    }

    /// Whether the game waits for a ban.
    #[wasm_bindgen(js_name = isBanPhase)]
    pub fn is_ban_phase(&self) -> bool {
        self.engine.state().phase() == Phase::AwaitingBan
    }
}

impl Default for BanChessGame {
    fn default() -> Self {
        Self::new()
    }
}
