//! Compact text form of a [`GameState`].
//!
//! A state is written as the position's FEN followed by two `|`-separated
//! segments:
//!
//! ```text
//! <fen>|<phase> <turn> <ban> <ply> <outcome>|<keys>
//! ```
//!
//! - `phase`: `ban` or `move`
//! - `turn`: `w` or `b`, and it must agree with the FEN
//! - `ban`: the standing ban (`e2e4`) or `-`
//! - `ply`: bans plus moves taken
//! - `outcome`: `*` while ongoing, otherwise `<result>:<reason>`
//!   (e.g. `1-0:checkmate`, `1/2-1/2:fifty-move-rule`)
//! - `keys`: comma-separated hex repetition keys. The segment may be left
//!   out on input; it then starts from the current position.
//!
//! ```
//! use ban_engine::GameState;
//!
//! let state = GameState::new();
//! let text = state.serialize();
//! assert!(text.starts_with("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1|ban w - 0 *|"));
//! assert_eq!(GameState::deserialize(&text).unwrap(), state);
//! ```

use crate::board::{Board, BoardError};
use crate::state::GameState;
use ban_core::{Ban, Color, Outcome, Phase};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when restoring a serialized state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StateParseError {
    #[error("malformed state: expected '<fen>|<phase> <turn> <ban> <ply> <outcome>[|<keys>]'")]
    Malformed,

    #[error(transparent)]
    Board(#[from] BoardError),

    #[error("invalid phase: '{0}'")]
    InvalidPhase(String),

    #[error("invalid turn: '{0}'")]
    InvalidTurn(String),

    #[error("turn {stated} does not match the position's side to move {actual}")]
    TurnMismatch { stated: Color, actual: Color },

    #[error("invalid ban: '{0}'")]
    InvalidBan(String),

    #[error("invalid ply count: '{0}'")]
    InvalidPly(String),

    #[error("invalid outcome: '{0}'")]
    InvalidOutcome(String),

    #[error("invalid repetition key: '{0}'")]
    InvalidKey(String),

    #[error("inconsistent state: {0}")]
    Inconsistent(&'static str),
}

/// The stored fields of a game, before validation.
///
/// [`GameState::from_parts`] checks the same invariants the engine keeps, so
/// states from any source pass through one gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateParts {
    pub position: Board,
    pub phase: Phase,
    pub banned: Option<Ban>,
    pub ply_count: u32,
    pub outcome: Option<Outcome>,
    /// `None` (or empty) starts the history at the current position.
    pub repetitions: Option<Vec<u64>>,
}

impl GameState {
    /// Builds a state from stored fields, rejecting combinations the engine
    /// can never reach.
    pub fn from_parts(parts: StateParts) -> Result<GameState, StateParseError> {
        let StateParts {
            position,
            phase,
            banned,
            ply_count,
            outcome,
            repetitions,
        } = parts;

        match (phase, banned) {
            (Phase::AwaitingBan, Some(_)) => {
                return Err(StateParseError::Inconsistent(
                    "standing ban while waiting for a ban",
                ))
            }
            (Phase::AwaitingMove, None) => {
                return Err(StateParseError::Inconsistent(
                    "no standing ban while waiting for a move",
                ))
            }
            _ => {}
        }

        let repetitions = match repetitions {
            Some(keys) if !keys.is_empty() => keys,
            _ => vec![position.repetition_key()],
        };

        let state = GameState {
            turn: position.turn(),
            position,
            phase,
            banned,
            ply_count,
            outcome,
            repetitions,
        };

        if state.outcome.is_none() {
            if state.detect_after_move().is_some() {
                return Err(StateParseError::Inconsistent(
                    "ongoing game in a finished position",
                ));
            }
            if let Some(ban) = state.banned {
                if !state
                    .position
                    .legal_moves()
                    .iter()
                    .any(|mv| ban.forbids(mv))
                {
                    return Err(StateParseError::InvalidBan(ban.to_uci()));
                }
            }
            if state.legal_actions().is_empty() {
                return Err(StateParseError::Inconsistent(
                    "ongoing game without a legal action",
                ));
            }
        }
        Ok(state)
    }

    /// Renders the state in compact notation.
    pub fn serialize(&self) -> String {
        let ban = self.banned.map_or_else(|| "-".to_string(), |b| b.to_uci());
        let outcome = self.outcome.map_or_else(|| "*".to_string(), |o| o.token());
        let keys = self
            .repetitions
            .iter()
            .map(|k| format!("{:016x}", k))
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{}|{} {} {} {} {}|{}",
            self.position.to_fen(),
            self.phase.token(),
            self.turn.to_char(),
            ban,
            self.ply_count,
            outcome,
            keys
        )
    }

    /// Restores a state from compact notation.
    pub fn deserialize(s: &str) -> Result<GameState, StateParseError> {
        let mut segments = s.trim().splitn(3, '|');
        let fen = segments.next().ok_or(StateParseError::Malformed)?;
        let suffix = segments.next().ok_or(StateParseError::Malformed)?;
        let keys = segments.next();

        let fields: Vec<&str> = suffix.split_whitespace().collect();
        let [phase, turn, ban, ply, outcome] = fields[..] else {
            return Err(StateParseError::Malformed);
        };

        let position = Board::from_fen(fen)?;

        let phase =
            Phase::from_token(phase).ok_or_else(|| StateParseError::InvalidPhase(phase.into()))?;

        let stated = single_char(turn)
            .and_then(Color::from_char)
            .ok_or_else(|| StateParseError::InvalidTurn(turn.into()))?;
        if stated != position.turn() {
            return Err(StateParseError::TurnMismatch {
                stated,
                actual: position.turn(),
            });
        }

        let banned = match ban {
            "-" => None,
            text => Some(Ban::from_uci(text).map_err(|_| StateParseError::InvalidBan(text.into()))?),
        };

        let ply_count = ply
            .parse::<u32>()
            .map_err(|_| StateParseError::InvalidPly(ply.into()))?;

        let outcome = match outcome {
            "*" => None,
            text => Some(
                Outcome::from_token(text)
                    .ok_or_else(|| StateParseError::InvalidOutcome(text.into()))?,
            ),
        };

        let repetitions = match keys.map(str::trim) {
            None | Some("") => None,
            Some(list) => Some(
                list.split(',')
                    .map(|k| {
                        u64::from_str_radix(k.trim(), 16)
                            .map_err(|_| StateParseError::InvalidKey(k.into()))
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        };

        GameState::from_parts(StateParts {
            position,
            phase,
            banned,
            ply_count,
            outcome,
            repetitions,
        })
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl FromStr for GameState {
    type Err = StateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameState::deserialize(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BanError, GameError, MoveError};
    use ban_core::{Move, Reason};

    const START_SUFFIX: &str = "|ban w - 0 *|";

    fn ban(uci: &str) -> Ban {
        Ban::from_uci(uci).unwrap()
    }

    #[test]
    fn new_game_text() {
        let text = GameState::new().serialize();
        assert!(text.contains(START_SUFFIX), "{text}");
        let keys = text.rsplit('|').next().unwrap();
        assert_eq!(keys.len(), 16);
    }

    #[test]
    fn standing_ban_roundtrip() {
        let state = GameState::new().after_ban(ban("e2e4")).unwrap();
        let text = state.serialize();
        assert!(text.contains("|move w e2e4 1 *|"), "{text}");
        assert_eq!(GameState::deserialize(&text).unwrap(), state);
    }

    #[test]
    fn finished_game_roundtrip() {
        let state = GameState::from_fen("R6k/8/5K2/8/8/8/8/8 b - - 0 1")
            .unwrap()
            .after_ban(ban("h8h7"))
            .unwrap();
        let text = state.serialize();
        assert!(text.contains("|move b h8h7 1 1-0:checkmate|"), "{text}");
        let back: GameState = text.parse().unwrap();
        assert_eq!(back, state);
        assert_eq!(back.outcome().map(|o| o.reason), Some(Reason::Checkmate));
    }

    #[test]
    fn keys_segment_optional() {
        let text = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1|ban w - 0 *";
        assert_eq!(GameState::deserialize(text).unwrap(), GameState::new());
    }

    #[test]
    fn turn_must_match_fen() {
        let text = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1|ban b - 0 *";
        assert_eq!(
            GameState::deserialize(text),
            Err(StateParseError::TurnMismatch {
                stated: Color::Black,
                actual: Color::White
            })
        );
    }

    #[test]
    fn rejects_phase_ban_mismatch() {
        let base = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        assert!(matches!(
            GameState::deserialize(&format!("{base}|ban w e2e4 1 *")),
            Err(StateParseError::Inconsistent(_))
        ));
        assert!(matches!(
            GameState::deserialize(&format!("{base}|move w - 1 *")),
            Err(StateParseError::Inconsistent(_))
        ));
    }

    #[test]
    fn rejects_ban_illegal_in_position() {
        let base = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        assert_eq!(
            GameState::deserialize(&format!("{base}|move w e7e5 1 *")),
            Err(StateParseError::InvalidBan("e7e5".into()))
        );
    }

    #[test]
    fn rejects_ongoing_game_in_finished_position() {
        for text in [
            "8/8/8/8/8/8/8/4K2k w - - 0 1|ban w - 0 *",
            "4k3/8/8/8/8/8/8/R3K3 w - - 150 90|ban w - 7 *",
            "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1|ban b - 0 *",
        ] {
            assert_eq!(
                GameState::deserialize(text),
                Err(StateParseError::Inconsistent(
                    "ongoing game in a finished position"
                )),
                "{text}"
            );
        }
        // The same positions are fine once their outcome is recorded.
        assert!(
            GameState::deserialize("8/8/8/8/8/8/8/4K2k w - - 0 1|ban w - 0 1/2-1/2:insufficient-material")
                .is_ok()
        );
    }

    #[test]
    fn exhausted_ply_counter_rejects_actions() {
        let base = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        let state = GameState::deserialize(&format!("{base}|ban w - {} *", u32::MAX)).unwrap();
        assert_eq!(state.ply_count(), u32::MAX);
        assert_eq!(
            state.after_ban(ban("e2e4")),
            Err(BanError::Game(GameError::PlyLimit))
        );

        let state =
            GameState::deserialize(&format!("{base}|move w e2e4 {} *", u32::MAX)).unwrap();
        assert_eq!(
            state.after_move(Move::from_uci("d2d4").unwrap()),
            Err(MoveError::Game(GameError::PlyLimit))
        );
    }

    #[test]
    fn rejects_garbage_fields() {
        let base = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        let cases = [
            (format!("{base}"), StateParseError::Malformed),
            (format!("{base}|ban w - 0"), StateParseError::Malformed),
            (
                format!("{base}|wait w - 0 *"),
                StateParseError::InvalidPhase("wait".into()),
            ),
            (
                format!("{base}|ban white - 0 *"),
                StateParseError::InvalidTurn("white".into()),
            ),
            (
                format!("{base}|ban w - -1 *"),
                StateParseError::InvalidPly("-1".into()),
            ),
            (
                format!("{base}|ban w - 0 2-0:checkmate"),
                StateParseError::InvalidOutcome("2-0:checkmate".into()),
            ),
            (
                format!("{base}|ban w - 0 *|zz"),
                StateParseError::InvalidKey("zz".into()),
            ),
        ];
        for (text, expected) in cases {
            assert_eq!(GameState::deserialize(&text), Err(expected), "{text}");
        }
        assert!(matches!(
            GameState::deserialize("garbage|ban w - 0 *"),
            Err(StateParseError::Board(_))
        ));
    }

    #[test]
    fn repetition_history_survives() {
        let state = GameState::new()
            .after_ban(ban("e2e4"))
            .unwrap()
            .after_move(Move::from_uci("g1f3").unwrap())
            .unwrap();
        let back = GameState::deserialize(&state.serialize()).unwrap();
        assert_eq!(back.repetitions(), state.repetitions());
        assert_eq!(back.repetitions().len(), 2);
    }
}
