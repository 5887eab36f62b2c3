//! This module contains the batching searcher, which keeps returning the
//! same state until a time or work budget expires.

use std::time::Duration;

use crate::{
    clock::DynClock,
    constant::BATCH_OVERSHOOT_TOLERANCE,
    searcher::Searcher,
    state::StateRef,
};

/// The state the batching searcher is currently locked onto, together with
/// the budget bookkeeping started at the moment it was chosen.
#[derive(Debug)]
struct Anchor {
    state: StateRef,

    /// The clock reading when the anchor was chosen.
    selected_at: Duration,

    /// How many times the anchor has been handed out, including the choosing
    /// selection. Under the engine's step model each selection corresponds to
    /// one unit of work on the selected state.
    selections: u64,
}

/// A searcher that selects a state from an underlying searcher and keeps
/// returning it until a wall-time budget or a work budget runs out, amortising
/// the cost of a base-searcher consultation over a batch of steps.
///
/// A zero budget disables that dimension; with both budgets zero the wrapper
/// is transparent. When a budget expires the anchored state is rotated behind
/// the rest of the base population, so the consultation can pick a different
/// state even under bases with stable favourites.
#[derive(Debug)]
pub struct BatchingSearcher {
    base: Box<dyn Searcher>,
    clock: DynClock,

    /// The wall-time slice granted per anchor. Zero means unlimited.
    time_budget: Duration,

    /// The number of selections granted per anchor. Zero means unlimited.
    instruction_budget: u64,

    anchor: Option<Anchor>,
}

impl BatchingSearcher {
    /// Constructs a batching searcher over `base` with the provided budgets,
    /// sampling `clock` to enforce the time dimension.
    #[must_use]
    pub fn new(
        base: Box<dyn Searcher>,
        clock: DynClock,
        time_budget: Duration,
        instruction_budget: u64,
    ) -> Self {
        Self {
            base,
            clock,
            time_budget,
            instruction_budget,
            anchor: None,
        }
    }

    /// Checks whether the wrapper is configured to do nothing at all.
    fn is_transparent(&self) -> bool {
        self.time_budget.is_zero() && self.instruction_budget == 0
    }

    /// Consults the base searcher for a fresh anchor, rotating the expired
    /// one (if any) behind the remaining population first.
    fn consult_base(&mut self) -> StateRef {
        let now = self.clock.now();

        if let Some(previous) = self.anchor.take() {
            let previous = previous.state;
            self.base.update(None, &[], std::slice::from_ref(&previous));
            if self.base.is_empty() {
                // The expired anchor is the only state there is; keep it and
                // restart its slice.
                self.base.update(None, std::slice::from_ref(&previous), &[]);
                self.anchor = Some(Anchor {
                    state: previous.clone(),
                    selected_at: now,
                    selections: 1,
                });
                return previous;
            }
            let next = self.base.select_state();
            self.base.update(None, std::slice::from_ref(&previous), &[]);
            self.anchor = Some(Anchor {
                state: next.clone(),
                selected_at: now,
                selections: 1,
            });
            return next;
        }

        let next = self.base.select_state();
        self.anchor = Some(Anchor {
            state: next.clone(),
            selected_at: now,
            selections: 1,
        });
        next
    }
}

impl Searcher for BatchingSearcher {
    fn select_state(&mut self) -> StateRef {
        if self.is_transparent() {
            return self.base.select_state();
        }

        if let Some(anchor) = self.anchor.as_mut() {
            let elapsed = self.clock.now().saturating_sub(anchor.selected_at);
            let time_expired = !self.time_budget.is_zero() && elapsed > self.time_budget;
            let work_expired =
                self.instruction_budget != 0 && anchor.selections >= self.instruction_budget;

            if !time_expired && !work_expired {
                anchor.selections += 1;
                return anchor.state.clone();
            }

            // A state can overshoot its slice arbitrarily on one slow unit of
            // work; once that happens the configured slice is evidently too
            // small for this workload, so it is stretched to what was
            // observed.
            if time_expired
                && elapsed.as_secs_f64() > self.time_budget.as_secs_f64() * BATCH_OVERSHOOT_TOLERANCE
            {
                tracing::debug!(
                    observed = ?elapsed,
                    budget = ?self.time_budget,
                    "time slice overshot the batching budget, stretching"
                );
                self.time_budget = elapsed;
            }
        }

        self.consult_base()
    }

    fn update(&mut self, current: Option<&StateRef>, added: &[StateRef], removed: &[StateRef]) {
        if self
            .anchor
            .as_ref()
            .is_some_and(|anchor| removed.contains(&anchor.state))
        {
            self.anchor = None;
        }
        self.base.update(current, added, removed);
    }

    fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    fn name(&self) -> String {
        format!(
            "<BatchingSearcher> time budget: {:?}, instruction budget: {}, base:\n{}\n</BatchingSearcher>",
            self.time_budget,
            self.instruction_budget,
            self.base.name()
        )
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use crate::{
        clock::ManualClock,
        searcher::{BatchingSearcher, DfsSearcher, Searcher},
        state::{ExecutionState, StateId, StateRef},
    };

    fn fresh(id: u64) -> StateRef {
        ExecutionState::new(StateId::new(id))
    }

    fn batching(time_budget: Duration, instruction_budget: u64) -> (BatchingSearcher, ManualClock) {
        let clock = ManualClock::new();
        let searcher = BatchingSearcher::new(
            Box::new(DfsSearcher::new()),
            clock.clone().in_rc(),
            time_budget,
            instruction_budget,
        );
        (searcher, clock)
    }

    #[test]
    fn work_budget_batches_selections() {
        let (mut searcher, _clock) = batching(Duration::ZERO, 3);
        let states = [fresh(1), fresh(2), fresh(3)];
        searcher.update(None, &states, &[]);

        assert_eq!(searcher.select_state().id(), StateId::new(3));
        assert_eq!(searcher.select_state().id(), StateId::new(3));
        assert_eq!(searcher.select_state().id(), StateId::new(3));
        assert_eq!(searcher.select_state().id(), StateId::new(2));
    }

    #[test]
    fn time_budget_batches_selections() {
        let (mut searcher, clock) = batching(Duration::from_secs(10), 0);
        let states = [fresh(1), fresh(2)];
        searcher.update(None, &states, &[]);

        assert_eq!(searcher.select_state().id(), StateId::new(2));
        clock.advance(Duration::from_secs(4));
        assert_eq!(searcher.select_state().id(), StateId::new(2));
        clock.advance(Duration::from_secs(7));
        assert_eq!(searcher.select_state().id(), StateId::new(1));
    }

    #[test]
    fn removed_anchor_is_forgotten() {
        let (mut searcher, _clock) = batching(Duration::ZERO, 100);
        let states = [fresh(1), fresh(2)];
        searcher.update(None, &states, &[]);

        let anchored = searcher.select_state();
        assert_eq!(anchored.id(), StateId::new(2));
        searcher.update(Some(&anchored), &[], &[anchored.clone()]);

        assert_eq!(searcher.select_state().id(), StateId::new(1));
    }

    #[test]
    fn a_lone_state_keeps_its_slice_restarting() {
        let (mut searcher, _clock) = batching(Duration::ZERO, 2);
        let only = fresh(1);
        searcher.update(None, std::slice::from_ref(&only), &[]);

        for _ in 0..8 {
            assert_eq!(searcher.select_state(), only);
        }
    }

    #[test]
    fn zero_budgets_pass_straight_through() {
        let (mut searcher, _clock) = batching(Duration::ZERO, 0);
        let states = [fresh(1), fresh(2)];
        searcher.update(None, &states, &[]);

        // Pure DFS behaviour: the top of the stack every time.
        assert_eq!(searcher.select_state().id(), StateId::new(2));
        searcher.update(None, &[], &[states[1].clone()]);
        assert_eq!(searcher.select_state().id(), StateId::new(1));
    }
}
