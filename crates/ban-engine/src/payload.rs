//! JSON boundary for transports and storage.
//!
//! Inbound payloads come from clients and databases that disagree on field
//! naming (`bannedAction` vs `banned_action`, `fen` vs `position`, ...). They
//! are normalized here, once, into validated [`Action`] and [`GameState`]
//! values. Outbound, [`Snapshot`] is the camelCase view sent after each
//! accepted action.

use crate::board::Board;
use crate::notation::{StateParseError, StateParts};
use crate::state::GameState;
use ban_core::{Action, Ban, Color, Move, Outcome, ParseActionError, Phase, Promotion};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when normalizing an inbound payload.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("malformed payload: {0}")]
    Json(String),

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("unknown action kind: '{0}'")]
    UnknownKind(String),

    #[error("invalid promotion piece: '{0}'")]
    InvalidPromotion(String),

    #[error(transparent)]
    Action(#[from] ParseActionError),

    #[error(transparent)]
    State(#[from] StateParseError),
}

/// An action as sent by a client.
///
/// Either `uci` or `from`/`to` must be present. Without `kind`, the action is
/// read as whatever the game's phase expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ActionPayload {
    #[serde(default, alias = "type", alias = "actionType", alias = "action_type")]
    pub kind: Option<String>,
    #[serde(default, alias = "move", alias = "ban", alias = "action")]
    pub uci: Option<String>,
    #[serde(default, alias = "fromSquare", alias = "from_square")]
    pub from: Option<String>,
    #[serde(default, alias = "toSquare", alias = "to_square")]
    pub to: Option<String>,
    #[serde(default, alias = "promotionPiece", alias = "promotion_piece")]
    pub promotion: Option<String>,
}

impl ActionPayload {
    /// Builds the action, using `phase` when the payload names no kind.
    pub fn into_action(self, phase: Phase) -> Result<Action, PayloadError> {
        let phase = match self.kind.as_deref().map(str::trim) {
            None | Some("") => phase,
            Some(kind) => Phase::from_token(&kind.to_ascii_lowercase())
                .ok_or_else(|| PayloadError::UnknownKind(kind.to_string()))?,
        };

        let text = match self.uci {
            Some(uci) => uci.trim().to_string(),
            None => {
                let from = self.from.ok_or(PayloadError::MissingField("from"))?;
                let to = self.to.ok_or(PayloadError::MissingField("to"))?;
                let mut text = format!("{}{}", from.trim(), to.trim());
                if let Some(piece) = self.promotion.as_deref().map(str::trim) {
                    if !piece.is_empty() {
                        text.push(promotion_letter(piece)?.to_char());
                    }
                }
                text
            }
        };

        Ok(match phase {
            Phase::AwaitingBan => Action::Ban(Ban::from_uci(&text)?),
            Phase::AwaitingMove => Action::Move(Move::from_uci(&text)?),
        })
    }
}

fn promotion_letter(piece: &str) -> Result<Promotion, PayloadError> {
    let lower = piece.to_ascii_lowercase();
    let promotion = match lower.as_str() {
        "queen" => Some(Promotion::Queen),
        "rook" => Some(Promotion::Rook),
        "bishop" => Some(Promotion::Bishop),
        "knight" => Some(Promotion::Knight),
        _ if lower.chars().count() == 1 => lower.chars().next().and_then(Promotion::from_char),
        _ => None,
    };
    promotion.ok_or_else(|| PayloadError::InvalidPromotion(piece.to_string()))
}

/// A standing ban given either as text or as squares.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BanPayload {
    Text(String),
    Squares { from: String, to: String },
}

impl BanPayload {
    fn into_ban(self) -> Result<Ban, StateParseError> {
        let text = match self {
            BanPayload::Text(text) => text,
            BanPayload::Squares { from, to } => format!("{}{}", from.trim(), to.trim()),
        };
        Ban::from_uci(text.trim()).map_err(|_| StateParseError::InvalidBan(text))
    }
}

/// An outcome given either as a compact token (`1-0:checkmate`) or as fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OutcomePayload {
    Token(String),
    Fields(Outcome),
}

/// A stored or transmitted game state.
///
/// A serialized `state` string wins over every other field. Otherwise the
/// state is assembled from the position and the optional ban-chess fields.
/// A bare position starts a fresh game in it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StatePayload {
    #[serde(
        default,
        alias = "serialized",
        alias = "engineState",
        alias = "engine_state"
    )]
    pub state: Option<String>,
    #[serde(default, alias = "position")]
    pub fen: Option<String>,
    #[serde(default)]
    pub phase: Option<Phase>,
    #[serde(default)]
    pub turn: Option<Color>,
    #[serde(default, alias = "bannedAction", alias = "banned", alias = "ban")]
    pub banned_action: Option<BanPayload>,
    #[serde(default, alias = "plyCount")]
    pub ply_count: Option<u32>,
    #[serde(default)]
    pub outcome: Option<OutcomePayload>,
    #[serde(default, alias = "repetitionKeys", alias = "repetitions")]
    pub repetition_keys: Option<Vec<String>>,
}

impl StatePayload {
    pub fn into_state(self) -> Result<GameState, PayloadError> {
        if let Some(text) = self.state {
            return Ok(GameState::deserialize(&text)?);
        }

        let fen = self.fen.ok_or(PayloadError::MissingField("fen"))?;
        let position = Board::from_fen(&fen).map_err(StateParseError::from)?;
        if let Some(stated) = self.turn {
            if stated != position.turn() {
                return Err(StateParseError::TurnMismatch {
                    stated,
                    actual: position.turn(),
                }
                .into());
            }
        }

        let fresh = self.phase.is_none()
            && self.banned_action.is_none()
            && self.ply_count.is_none()
            && self.outcome.is_none()
            && self.repetition_keys.is_none();
        if fresh {
            return Ok(GameState::from_board(position));
        }

        let banned = self.banned_action.map(BanPayload::into_ban).transpose()?;
        let phase = self.phase.unwrap_or(match banned {
            Some(_) => Phase::AwaitingMove,
            None => Phase::AwaitingBan,
        });
        let outcome = match self.outcome {
            None => None,
            Some(OutcomePayload::Fields(outcome)) => Some(outcome),
            Some(OutcomePayload::Token(token)) => Some(
                Outcome::from_token(token.trim())
                    .ok_or(StateParseError::InvalidOutcome(token))?,
            ),
        };
        let repetitions = self
            .repetition_keys
            .map(|keys| {
                keys.iter()
                    .map(|k| {
                        u64::from_str_radix(k.trim(), 16)
                            .map_err(|_| StateParseError::InvalidKey(k.clone()))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        Ok(GameState::from_parts(StateParts {
            position,
            phase,
            banned,
            ply_count: self.ply_count.unwrap_or(0),
            outcome,
            repetitions,
        })?)
    }
}

/// Parses and normalizes a JSON action for a game in `phase`.
pub fn parse_action(json: &str, phase: Phase) -> Result<Action, PayloadError> {
    let payload: ActionPayload =
        serde_json::from_str(json).map_err(|e| PayloadError::Json(e.to_string()))?;
    payload.into_action(phase)
}

/// Parses and validates a JSON game state.
pub fn parse_state(json: &str) -> Result<GameState, PayloadError> {
    let payload: StatePayload =
        serde_json::from_str(json).map_err(|e| PayloadError::Json(e.to_string()))?;
    payload.into_state()
}

/// Outbound view of a game, sent after every accepted action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub fen: String,
    pub phase: Phase,
    pub turn: Color,
    pub actor: Color,
    pub banned_action: Option<Ban>,
    pub ply_count: u32,
    pub outcome: Option<Outcome>,
    pub in_check: bool,
    pub legal_actions: Vec<Action>,
    /// Serialized state for resuming the game.
    pub state: String,
}

impl Snapshot {
    pub fn of(state: &GameState) -> Self {
        Snapshot {
            fen: state.position().to_fen(),
            phase: state.phase(),
            turn: state.turn(),
            actor: state.actor(),
            banned_action: state.banned(),
            ply_count: state.ply_count(),
            outcome: state.outcome(),
            in_check: state.position().is_check(),
            legal_actions: state.legal_actions(),
            state: state.serialize(),
        }
    }
}

impl From<&GameState> for Snapshot {
    fn from(state: &GameState) -> Self {
        Snapshot::of(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ban_core::Reason;

    fn ban(uci: &str) -> Ban {
        Ban::from_uci(uci).unwrap()
    }

    #[test]
    fn action_from_uci_field_uses_phase() {
        let action = parse_action(r#"{"uci":"e2e4"}"#, Phase::AwaitingBan).unwrap();
        assert_eq!(action, Action::Ban(ban("e2e4")));
        let action = parse_action(r#"{"move":"e2e4"}"#, Phase::AwaitingMove).unwrap();
        assert_eq!(action, Action::Move(Move::from_uci("e2e4").unwrap()));
    }

    #[test]
    fn action_field_name_variants() {
        let camel = parse_action(
            r#"{"actionType":"move","fromSquare":"e7","toSquare":"e8","promotionPiece":"queen"}"#,
            Phase::AwaitingBan,
        )
        .unwrap();
        let snake = parse_action(
            r#"{"type":"move","from":"e7","to":"e8","promotion":"q"}"#,
            Phase::AwaitingBan,
        )
        .unwrap();
        assert_eq!(camel, snake);
        assert_eq!(camel, Action::Move(Move::from_uci("e7e8q").unwrap()));
    }

    #[test]
    fn action_errors() {
        assert_eq!(
            parse_action(r#"{"from":"e2"}"#, Phase::AwaitingBan),
            Err(PayloadError::MissingField("to"))
        );
        assert_eq!(
            parse_action(r#"{"kind":"castle","uci":"e1g1"}"#, Phase::AwaitingMove),
            Err(PayloadError::UnknownKind("castle".into()))
        );
        assert_eq!(
            parse_action(
                r#"{"from":"e7","to":"e8","promotion":"king"}"#,
                Phase::AwaitingMove
            ),
            Err(PayloadError::InvalidPromotion("king".into()))
        );
        assert!(matches!(
            parse_action(r#"{"uci":"e7e8x"}"#, Phase::AwaitingBan),
            Err(PayloadError::Action(ParseActionError::InvalidPromotion(_)))
        ));
        assert!(matches!(
            parse_action("not json", Phase::AwaitingBan),
            Err(PayloadError::Json(_))
        ));
    }

    #[test]
    fn state_from_serialized_string() {
        let state = GameState::new().after_ban(ban("e2e4")).unwrap();
        let json = serde_json::json!({ "engineState": state.serialize() }).to_string();
        assert_eq!(parse_state(&json).unwrap(), state);
    }

    #[test]
    fn state_from_camel_and_snake_fields() {
        let expected = GameState::new().after_ban(ban("e2e4")).unwrap();
        let camel = parse_state(
            r#"{"position":"rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
                "phase":"awaitingMove","turn":"white",
                "bannedAction":{"from":"e2","to":"e4"},"plyCount":1}"#,
        )
        .unwrap();
        let snake = parse_state(
            r#"{"fen":"rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
                "phase":"awaiting_move","turn":"w",
                "banned_action":"e2e4","ply_count":1}"#,
        )
        .unwrap();
        assert_eq!(camel, expected);
        assert_eq!(snake, expected);
    }

    #[test]
    fn bare_position_starts_fresh_game() {
        let state = parse_state(r#"{"fen":"7k/5Q2/6K1/8/8/8/8/8 b - - 0 1"}"#).unwrap();
        assert_eq!(state.outcome(), Some(Outcome::draw(Reason::Stalemate)));
    }

    #[test]
    fn state_validation_errors() {
        assert_eq!(parse_state("{}"), Err(PayloadError::MissingField("fen")));
        assert!(matches!(
            parse_state(
                r#"{"fen":"rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1","turn":"black"}"#
            ),
            Err(PayloadError::State(StateParseError::TurnMismatch { .. }))
        ));
        assert!(matches!(
            parse_state(
                r#"{"fen":"rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1","phase":"move"}"#
            ),
            Err(PayloadError::State(StateParseError::Inconsistent(_)))
        ));
        assert!(matches!(
            parse_state(
                r#"{"fen":"rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1","outcome":"1-0:oops"}"#
            ),
            Err(PayloadError::State(StateParseError::InvalidOutcome(_)))
        ));
        assert!(matches!(
            parse_state(r#"{"fen":"4k3/8/8/8/8/8/8/R3K3 w - - 120 80","phase":"ban","plyCount":40}"#),
            Err(PayloadError::State(StateParseError::Inconsistent(_)))
        ));
    }

    #[test]
    fn outcome_as_token_or_fields() {
        let fen = "R6k/8/5K2/8/8/8/8/8 b - - 0 1";
        let token = parse_state(&format!(
            r#"{{"fen":"{fen}","bannedAction":"h8h7","plyCount":1,"outcome":"1-0:checkmate"}}"#
        ))
        .unwrap();
        let fields = parse_state(&format!(
            r#"{{"fen":"{fen}","bannedAction":"h8h7","plyCount":1,
                 "outcome":{{"result":"whiteWins","reason":"checkmate"}}}}"#
        ))
        .unwrap();
        assert_eq!(token, fields);
        assert_eq!(
            token.outcome(),
            Some(Outcome::win(Color::White, Reason::Checkmate))
        );
    }

    #[test]
    fn snapshot_shape() {
        let state = GameState::new().after_ban(ban("e2e4")).unwrap();
        let value = serde_json::to_value(Snapshot::of(&state)).unwrap();
        assert_eq!(value["bannedAction"], "e2e4");
        assert_eq!(value["plyCount"], 1);
        assert_eq!(value["actor"], "white");
        assert_eq!(value["inCheck"], false);
        assert_eq!(value["legalActions"].as_array().unwrap().len(), 19);
        assert_eq!(value["legalActions"][0]["kind"], "move");
    }

    #[test]
    fn snapshot_feeds_back_into_state() {
        let state = GameState::new()
            .after_ban(ban("e2e4"))
            .unwrap()
            .after_move(Move::from_uci("d2d4").unwrap())
            .unwrap();
        let json = serde_json::to_string(&Snapshot::of(&state)).unwrap();
        assert_eq!(parse_state(&json).unwrap(), state);
    }
}
