//! Game records and PGN export.
//!
//! A [`GameRecord`] is the replayable form of a game: where it started, the
//! accepted actions in order, and how it ended. Replaying re-validates every
//! action, so a record read from disk is never trusted blindly.

use crate::board::{BoardError, STARTPOS};
use crate::engine::RulesEngine;
use crate::error::ActionError;
use crate::notation::StateParseError;
use crate::state::GameState;
use ban_core::{Action, Color, Outcome, Phase};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while replaying a [`GameRecord`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReplayError {
    #[error("invalid start position: {0}")]
    Fen(#[from] BoardError),

    #[error("invalid start state: {0}")]
    State(#[from] StateParseError),

    #[error("action {index} ('{uci}') rejected: {source}")]
    Rejected {
        index: usize,
        uci: String,
        source: ActionError,
    },

    #[error("recorded conclusion {recorded} conflicts with replayed outcome {replayed:?}")]
    ConflictingConclusion {
        recorded: Outcome,
        replayed: Option<Outcome>,
    },
}

/// A replayable game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// FEN or serialized state the game starts from. `None` is the standard
    /// starting position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    /// Accepted actions in coordinate notation, alternating ban and move.
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<Outcome>,
}

impl GameRecord {
    /// Rebuilds the game by applying every recorded action.
    ///
    /// Each action is read as a ban or a move according to the phase it is
    /// applied in.
    pub fn replay(&self) -> Result<RulesEngine, ReplayError> {
        let mut engine = match self.start.as_deref().map(str::trim) {
            None | Some("") => RulesEngine::new(),
            Some(text) if text.contains('|') => RulesEngine::deserialize(text)?,
            Some(fen) => RulesEngine::from_fen(fen)?,
        };

        for (index, uci) in self.actions.iter().enumerate() {
            let applied: Result<_, ActionError> = match engine.state().phase() {
                Phase::AwaitingBan => engine.apply_ban_uci(uci).map(|_| ()).map_err(Into::into),
                Phase::AwaitingMove => engine.apply_move_uci(uci).map(|_| ()).map_err(Into::into),
            };
            applied.map_err(|source| ReplayError::Rejected {
                index,
                uci: uci.clone(),
                source,
            })?;
        }

        if let Some(recorded) = self.conclusion {
            let replayed = engine.outcome();
            let conflict = ReplayError::ConflictingConclusion { recorded, replayed };
            match replayed {
                Some(outcome) if outcome == recorded => {}
                Some(_) => return Err(conflict),
                None if recorded.reason.is_detected() => return Err(conflict),
                None => {
                    engine.conclude(recorded).map_err(|_| conflict)?;
                }
            }
        }
        Ok(engine)
    }
}

/// Header values for [`RulesEngine::to_pgn`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PgnTags {
    pub event: String,
    pub site: String,
    /// `YYYY.MM.DD`, with `?` for unknown parts.
    pub date: String,
    pub round: String,
    pub white: String,
    pub black: String,
}

impl Default for PgnTags {
    fn default() -> Self {
        PgnTags {
            event: "Ban Chess Game".to_string(),
            site: "local".to_string(),
            date: "????.??.??".to_string(),
            round: "-".to_string(),
            white: "White".to_string(),
            black: "Black".to_string(),
        }
    }
}

const PGN_LINE_WIDTH: usize = 80;

impl RulesEngine {
    /// Returns the replayable record of the game so far.
    pub fn record(&self) -> GameRecord {
        let origin = self.origin();
        let start = if *origin == GameState::new() {
            None
        } else if *origin == GameState::from_board(origin.position().clone()) {
            Some(origin.position().to_fen())
        } else {
            Some(origin.serialize())
        };
        GameRecord {
            start,
            actions: self.history().iter().map(|r| r.action.to_uci()).collect(),
            conclusion: self.outcome(),
        }
    }

    /// Renders the game as PGN. Each ban is written as a comment in front of
    /// the move it constrained, e.g. `1. {ban e2e4} d4 {ban d7d5} e5`.
    pub fn to_pgn(&self, tags: &PgnTags) -> String {
        let result = self.outcome().map_or("*", |o| o.result.pgn());
        let termination = self.outcome().map_or("unterminated", |o| o.reason.token());

        let mut out = String::new();
        for (name, value) in [
            ("Event", tags.event.as_str()),
            ("Site", tags.site.as_str()),
            ("Date", tags.date.as_str()),
            ("Round", tags.round.as_str()),
            ("White", tags.white.as_str()),
            ("Black", tags.black.as_str()),
            ("Result", result),
            ("Variant", "Ban Chess"),
            ("Termination", termination),
        ] {
            out.push_str(&format!("[{} \"{}\"]\n", name, escape(value)));
        }
        let fen = self.origin().position().to_fen();
        if fen != STARTPOS {
            out.push_str("[SetUp \"1\"]\n");
            out.push_str(&format!("[FEN \"{}\"]\n", fen));
        }
        // A game resumed mid-turn needs the full state to be replayed.
        if let Some(start) = self.record().start.filter(|s| s.contains('|')) {
            out.push_str(&format!("[BanState \"{}\"]\n", start));
        }
        out.push('\n');

        let mut tokens = self.movetext_tokens();
        tokens.push(result.to_string());
        out.push_str(&wrap(&tokens, PGN_LINE_WIDTH));
        out.push('\n');
        out
    }

    fn movetext_tokens(&self) -> Vec<String> {
        let origin = self.origin();
        let mut number = origin.position().fullmove_number();
        let mut tokens = Vec::new();
        let standing = origin.banned();
        if let Some(ban) = standing {
            tokens.push(match origin.turn() {
                Color::White => format!("{}.", number),
                Color::Black => format!("{}...", number),
            });
            tokens.push(format!("{{ban {}}}", ban));
        }
        for (i, record) in self.history().iter().enumerate() {
            let mover = match record.action {
                Action::Ban(_) => record.actor.opposite(),
                Action::Move(_) => record.actor,
            };
            let opens_move = match record.action {
                Action::Ban(_) => true,
                Action::Move(_) => i == 0 && standing.is_none(),
            };
            if opens_move {
                if mover == Color::White {
                    tokens.push(format!("{}.", number));
                } else if i == 0 {
                    tokens.push(format!("{}...", number));
                }
            }
            match record.action {
                Action::Ban(ban) => tokens.push(format!("{{ban {}}}", ban)),
                Action::Move(mv) => {
                    tokens.push(record.san.clone().unwrap_or_else(|| mv.to_uci()));
                    if mover == Color::Black {
                        number += 1;
                    }
                }
            }
        }
        tokens
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Joins tokens with spaces, breaking lines before `width`. Comments are
/// kept whole.
fn wrap(tokens: &[String], width: usize) -> String {
    let mut out = String::new();
    let mut line_len = 0;
    for token in tokens {
        if line_len > 0 && line_len + 1 + token.len() > width {
            out.push('\n');
            line_len = 0;
        } else if line_len > 0 {
            out.push(' ');
            line_len += 1;
        }
        out.push_str(token);
        line_len += token.len();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ban_core::{Ban, Move, Reason};

    fn played(actions: &[&str]) -> RulesEngine {
        GameRecord {
            actions: actions.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
        .replay()
        .unwrap()
    }

    #[test]
    fn record_roundtrip() {
        let mut game = RulesEngine::new();
        game.apply_ban(Ban::from_uci("e2e4").unwrap()).unwrap();
        game.apply_move(Move::from_uci("d2d4").unwrap()).unwrap();
        game.apply_ban(Ban::from_uci("d7d5").unwrap()).unwrap();
        game.resign(Color::Black).unwrap();

        let record = game.record();
        assert_eq!(record.start, None);
        assert_eq!(record.actions, vec!["e2e4", "d2d4", "d7d5"]);
        assert_eq!(
            record.conclusion,
            Some(Outcome::win(Color::White, Reason::Resignation))
        );

        let json = serde_json::to_string(&record).unwrap();
        let back: GameRecord = serde_json::from_str(&json).unwrap();
        let replayed = back.replay().unwrap();
        assert_eq!(replayed.state(), game.state());
    }

    #[test]
    fn record_keeps_custom_start() {
        let fen = "8/P6k/8/8/8/8/8/K7 w - - 0 1";
        let game = RulesEngine::from_fen(fen).unwrap();
        assert_eq!(game.record().start.as_deref(), Some(fen));

        let mut resumed = RulesEngine::new();
        resumed.apply_ban_uci("e2e4").unwrap();
        let resumed = RulesEngine::from_state(resumed.state().clone());
        let start = resumed.record().start.unwrap();
        assert!(start.contains('|'));
        assert_eq!(
            GameRecord {
                start: Some(start),
                ..Default::default()
            }
            .replay()
            .unwrap()
            .state(),
            resumed.state()
        );
    }

    #[test]
    fn pgn_of_game_resumed_mid_turn() {
        let mut first = RulesEngine::new();
        first.apply_ban_uci("e2e4").unwrap();
        let saved = first.serialize();

        let mut resumed = RulesEngine::deserialize(&saved).unwrap();
        resumed.apply_move_uci("d2d4").unwrap();
        let pgn = resumed.to_pgn(&PgnTags::default());

        assert!(pgn.contains(&format!("[BanState \"{}\"]", saved)), "{pgn}");
        assert!(!pgn.contains("[SetUp"), "{pgn}");
        assert!(pgn.contains("1. {ban e2e4} d4 *"), "{pgn}");

        let fresh = played(&["e2e4", "d2d4"]).to_pgn(&PgnTags::default());
        assert!(!fresh.contains("BanState"), "{fresh}");
    }

    #[test]
    fn replay_reports_rejected_action() {
        let record = GameRecord {
            actions: vec!["e2e4".into(), "e2e4".into()],
            ..Default::default()
        };
        match record.replay() {
            Err(ReplayError::Rejected { index, uci, source }) => {
                assert_eq!(index, 1);
                assert_eq!(uci, "e2e4");
                assert!(matches!(source, ActionError::Move(_)));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn replay_rejects_conflicting_conclusion() {
        let record = GameRecord {
            actions: vec!["e2e4".into()],
            conclusion: Some(Outcome::win(Color::White, Reason::Checkmate)),
            ..Default::default()
        };
        assert!(matches!(
            record.replay(),
            Err(ReplayError::ConflictingConclusion { .. })
        ));
    }

    #[test]
    fn replay_accepts_json_without_optional_fields() {
        let record: GameRecord = serde_json::from_str(r#"{"actions":["e2e4","d2d4"]}"#).unwrap();
        let engine = record.replay().unwrap();
        assert_eq!(engine.state().ply_count(), 2);
    }

    #[test]
    fn pgn_writes_bans_as_comments() {
        let game = played(&["e2e4", "d2d4", "d7d5", "e7e5"]);
        let pgn = game.to_pgn(&PgnTags::default());
        assert!(pgn.contains("[Variant \"Ban Chess\"]"));
        assert!(pgn.contains("[Result \"*\"]"));
        assert!(pgn.contains("[Termination \"unterminated\"]"));
        assert!(!pgn.contains("[FEN"));
        assert!(pgn.contains("1. {ban e2e4} d4 {ban d7d5} e5 *"), "{pgn}");
    }

    #[test]
    fn pgn_numbers_moves_and_result() {
        let mut game = played(&["e2e4", "d2d4", "d7d5", "e7e5", "a2a3", "g1f3"]);
        game.resign(Color::White).unwrap();
        let tags = PgnTags {
            white: "Alice".into(),
            black: "Bob".into(),
            ..Default::default()
        };
        let pgn = game.to_pgn(&tags);
        assert!(pgn.contains("[White \"Alice\"]"));
        assert!(pgn.contains("[Result \"0-1\"]"));
        assert!(pgn.contains("[Termination \"resignation\"]"));
        assert!(
            pgn.contains("1. {ban e2e4} d4 {ban d7d5} e5 2. {ban a2a3} Nf3 0-1"),
            "{pgn}"
        );
    }

    #[test]
    fn pgn_custom_start_with_black_to_move() {
        let mut game = RulesEngine::from_fen("4k3/8/8/8/8/8/4P3/4K3 b - - 0 12").unwrap();
        game.apply_ban_uci("e8d8").unwrap();
        game.apply_move_uci("e8e7").unwrap();
        let pgn = game.to_pgn(&PgnTags::default());
        assert!(pgn.contains("[SetUp \"1\"]"));
        assert!(pgn.contains("[FEN \"4k3/8/8/8/8/8/4P3/4K3 b - - 0 12\"]"));
        assert!(pgn.contains("12... {ban e8d8} Ke7 *"), "{pgn}");
    }

    #[test]
    fn wrap_keeps_lines_short() {
        let tokens: Vec<String> = (0..40).map(|i| format!("{{ban e2e{}}}", i % 8)).collect();
        let text = wrap(&tokens, 80);
        assert!(text.lines().count() > 1);
        assert!(text.lines().all(|line| line.len() <= 80));
    }
}
