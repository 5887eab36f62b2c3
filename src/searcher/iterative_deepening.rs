//! This module contains the iterative-deepening-in-time searcher.

use std::{collections::BTreeMap, time::Duration};

use crate::{
    clock::DynClock,
    constant::INITIAL_DEEPENING_BUDGET,
    searcher::Searcher,
    state::{StateId, StateRef},
};

/// A searcher that grants every state a per-selection time budget and pauses
/// states that exceed it.
///
/// Paused states are invisible to the underlying searcher. When the
/// underlying searcher runs out of states the budget is doubled and all
/// paused states are revived, so slow states are revisited with progressively
/// more patience rather than starving the fast ones.
#[derive(Debug)]
pub struct IterativeDeepeningTimeSearcher {
    base: Box<dyn Searcher>,
    clock: DynClock,

    /// The current per-state time budget.
    budget: Duration,

    /// The clock reading at the most recent selection.
    selected_at: Duration,

    /// The states currently paused, keyed by id so revival order is
    /// deterministic.
    paused: BTreeMap<StateId, StateRef>,
}

impl IterativeDeepeningTimeSearcher {
    /// Constructs an iterative-deepening searcher over `base`, sampling
    /// `clock` and starting from [`INITIAL_DEEPENING_BUDGET`].
    #[must_use]
    pub fn new(base: Box<dyn Searcher>, clock: DynClock) -> Self {
        Self {
            base,
            clock,
            budget: INITIAL_DEEPENING_BUDGET,
            selected_at: Duration::ZERO,
            paused: BTreeMap::new(),
        }
    }
}

impl Searcher for IterativeDeepeningTimeSearcher {
    fn select_state(&mut self) -> StateRef {
        if self.base.is_empty() && !self.paused.is_empty() {
            self.budget *= 2;
            tracing::debug!(
                budget = ?self.budget,
                revived = self.paused.len(),
                "active pool drained, doubling the per-state time budget"
            );
            let revived: Vec<StateRef> = self.paused.values().cloned().collect();
            self.paused.clear();
            self.base.update(None, &revived, &[]);
        }

        let state = self.base.select_state();
        self.selected_at = self.clock.now();
        state
    }

    fn update(&mut self, current: Option<&StateRef>, added: &[StateRef], removed: &[StateRef]) {
        let elapsed = self.clock.now().saturating_sub(self.selected_at);
        let overran = current
            .is_some_and(|current| !removed.contains(current) && elapsed > self.budget);
        let removes_paused = removed
            .iter()
            .any(|state| self.paused.contains_key(&state.id()));

        if !overran && !removes_paused {
            self.base.update(current, added, removed);
            return;
        }

        // Deaths of paused states are absorbed here; the base no longer knows
        // them.
        let mut forwarded: Vec<StateRef> = removed
            .iter()
            .filter(|state| self.paused.remove(&state.id()).is_none())
            .cloned()
            .collect();

        if overran {
            let current = current.expect("Overrun implies a current state");
            self.paused.insert(current.id(), current.clone());
            forwarded.push(current.clone());
            self.base.update(None, added, &forwarded);
        } else {
            self.base.update(current, added, &forwarded);
        }
    }

    fn is_empty(&self) -> bool {
        self.base.is_empty() && self.paused.is_empty()
    }

    fn name(&self) -> String {
        format!(
            "<IterativeDeepeningTimeSearcher> budget: {:?}, base:\n{}\n</IterativeDeepeningTimeSearcher>",
            self.budget,
            self.base.name()
        )
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use crate::{
        clock::ManualClock,
        searcher::{DfsSearcher, IterativeDeepeningTimeSearcher, Searcher},
        state::{ExecutionState, StateId, StateRef},
    };

    fn fresh(id: u64) -> StateRef {
        ExecutionState::new(StateId::new(id))
    }

    fn deepening() -> (IterativeDeepeningTimeSearcher, ManualClock) {
        let clock = ManualClock::new();
        let searcher =
            IterativeDeepeningTimeSearcher::new(Box::new(DfsSearcher::new()), clock.clone().in_rc());
        (searcher, clock)
    }

    #[test]
    fn overrunning_state_is_paused_and_later_revived() {
        let (mut searcher, clock) = deepening();
        let slow = fresh(1);
        searcher.update(None, std::slice::from_ref(&slow), &[]);

        let selected = searcher.select_state();
        assert_eq!(selected, slow);

        // Exceed the initial one-second budget.
        clock.advance(Duration::from_millis(1500));
        searcher.update(Some(&selected), &[], &[]);

        // Paused, not dead: the searcher as a whole is non-empty even though
        // its base has drained.
        assert!(!searcher.is_empty());

        // The next selection doubles the budget and brings the state back.
        assert_eq!(searcher.select_state(), slow);

        clock.advance(Duration::from_millis(1500));
        searcher.update(Some(&slow), &[], &[]);
        // 1.5 s is within the doubled two-second budget.
        assert_eq!(searcher.select_state(), slow);
    }

    #[test]
    fn fast_states_flow_through_untouched() {
        let (mut searcher, clock) = deepening();
        let (a, b) = (fresh(1), fresh(2));
        searcher.update(None, &[a.clone(), b.clone()], &[]);

        let selected = searcher.select_state();
        assert_eq!(selected, b);
        clock.advance(Duration::from_millis(100));
        searcher.update(Some(&selected), &[], &[]);

        assert_eq!(searcher.select_state(), b);
    }

    #[test]
    fn death_of_a_paused_state_is_absorbed() {
        let (mut searcher, clock) = deepening();
        let (slow, other) = (fresh(1), fresh(2));
        searcher.update(None, &[slow.clone(), other.clone()], &[]);

        let selected = searcher.select_state();
        assert_eq!(selected, other);
        clock.advance(Duration::from_secs(2));
        searcher.update(Some(&selected), &[], &[]);

        // `other` is paused now; killing it must not reach the base, which
        // only knows `slow`.
        searcher.update(None, &[], &[other]);
        assert!(!searcher.is_empty());
        assert_eq!(searcher.select_state(), slow);
    }

    #[test]
    fn terminated_current_is_not_paused() {
        let (mut searcher, clock) = deepening();
        let only = fresh(1);
        searcher.update(None, std::slice::from_ref(&only), &[]);

        let selected = searcher.select_state();
        clock.advance(Duration::from_secs(5));
        searcher.update(Some(&selected), &[], &[selected.clone()]);

        assert!(searcher.is_empty());
    }
}
