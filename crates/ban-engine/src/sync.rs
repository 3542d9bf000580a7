//! Optimistic play against an authoritative server state.
//!
//! A client applies its own actions to a local copy right away and later
//! receives the server's state. [`Reconciler`] keeps the two apart: the
//! authoritative state is only ever replaced, never rolled back, and the
//! speculative branch is recomputed from it on demand.

use crate::error::ActionError;
use crate::state::GameState;
use ban_core::Action;

/// What [`Reconciler::reconcile`] did with an incoming state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// The incoming state matches the authoritative one.
    Unchanged,
    /// The incoming state is the result of the first `acknowledged` pending
    /// actions. The rest stay pending.
    Confirmed { acknowledged: usize },
    /// The incoming state matches no prefix of the pending actions. The
    /// speculation was dropped.
    Diverged { discarded: Vec<Action> },
}

#[derive(Debug, Clone)]
pub struct Reconciler {
    authoritative: GameState,
    pending: Vec<Action>,
    speculative: Option<GameState>,
}

impl Reconciler {
    pub fn new(authoritative: GameState) -> Self {
        Reconciler {
            authoritative,
            pending: Vec::new(),
            speculative: None,
        }
    }

    /// The state to display: speculative when actions are pending.
    pub fn view(&self) -> &GameState {
        self.speculative.as_ref().unwrap_or(&self.authoritative)
    }

    pub fn authoritative(&self) -> &GameState {
        &self.authoritative
    }

    /// Actions applied locally but not yet seen in an authoritative state.
    pub fn pending(&self) -> &[Action] {
        &self.pending
    }

    pub fn is_speculating(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Applies `action` to the displayed state. A rejected action is not
    /// queued.
    pub fn predict(&mut self, action: Action) -> Result<&GameState, ActionError> {
        let next = self.view().apply(action)?;
        self.pending.push(action);
        Ok(&*self.speculative.insert(next))
    }

    /// Replaces the authoritative state with `incoming`.
    pub fn reconcile(&mut self, incoming: GameState) -> Reconciliation {
        if incoming == self.authoritative {
            return Reconciliation::Unchanged;
        }

        let mut state = self.authoritative.clone();
        let mut acknowledged = None;
        for (i, action) in self.pending.iter().enumerate() {
            match state.apply(*action) {
                Ok(next) => state = next,
                Err(_) => break,
            }
            if state == incoming {
                acknowledged = Some(i + 1);
                break;
            }
        }

        self.authoritative = incoming;
        match acknowledged {
            Some(count) => {
                self.pending.drain(..count);
                if self.pending.is_empty() {
                    self.speculative = None;
                }
                Reconciliation::Confirmed {
                    acknowledged: count,
                }
            }
            None => {
                self.speculative = None;
                Reconciliation::Diverged {
                    discarded: std::mem::take(&mut self.pending),
                }
            }
        }
    }

    /// Drops every pending action and returns them.
    pub fn abandon(&mut self) -> Vec<Action> {
        self.speculative = None;
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ban_core::{Ban, Move, Phase};

    fn ban(uci: &str) -> Action {
        Action::Ban(Ban::from_uci(uci).unwrap())
    }

    fn mv(uci: &str) -> Action {
        Action::Move(Move::from_uci(uci).unwrap())
    }

    #[test]
    fn predict_updates_view_only() {
        let mut sync = Reconciler::new(GameState::new());
        sync.predict(ban("e2e4")).unwrap();
        assert_eq!(sync.view().phase(), Phase::AwaitingMove);
        assert_eq!(sync.authoritative().phase(), Phase::AwaitingBan);
        assert_eq!(sync.pending(), &[ban("e2e4")]);
    }

    #[test]
    fn rejected_prediction_is_not_queued() {
        let mut sync = Reconciler::new(GameState::new());
        assert!(sync.predict(mv("e2e4")).is_err());
        assert!(!sync.is_speculating());
        assert_eq!(sync.view(), &GameState::new());
    }

    #[test]
    fn confirmation_of_prefix() {
        let start = GameState::new();
        let mut sync = Reconciler::new(start.clone());
        sync.predict(ban("e2e4")).unwrap();
        sync.predict(mv("d2d4")).unwrap();
        let expected_view = sync.view().clone();

        let server = start.apply(ban("e2e4")).unwrap();
        assert_eq!(
            sync.reconcile(server.clone()),
            Reconciliation::Confirmed { acknowledged: 1 }
        );
        assert_eq!(sync.authoritative(), &server);
        assert_eq!(sync.pending(), &[mv("d2d4")]);
        assert_eq!(sync.view(), &expected_view);

        let server = server.apply(mv("d2d4")).unwrap();
        assert_eq!(
            sync.reconcile(server),
            Reconciliation::Confirmed { acknowledged: 1 }
        );
        assert!(!sync.is_speculating());
        assert_eq!(sync.view(), &expected_view);
    }

    #[test]
    fn divergence_discards_speculation() {
        let start = GameState::new();
        let mut sync = Reconciler::new(start.clone());
        sync.predict(ban("e2e4")).unwrap();

        let server = start.apply(ban("d2d4")).unwrap();
        assert_eq!(
            sync.reconcile(server.clone()),
            Reconciliation::Diverged {
                discarded: vec![ban("e2e4")]
            }
        );
        assert_eq!(sync.view(), &server);
        assert!(!sync.is_speculating());
    }

    #[test]
    fn same_state_is_unchanged() {
        let mut sync = Reconciler::new(GameState::new());
        sync.predict(ban("e2e4")).unwrap();
        assert_eq!(sync.reconcile(GameState::new()), Reconciliation::Unchanged);
        assert!(sync.is_speculating());
    }

    #[test]
    fn abandon_returns_pending() {
        let mut sync = Reconciler::new(GameState::new());
        sync.predict(ban("e2e4")).unwrap();
        assert_eq!(sync.abandon(), vec![ban("e2e4")]);
        assert_eq!(sync.view(), &GameState::new());
    }
}
