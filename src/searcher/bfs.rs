//! This module contains the breadth-first searcher.

use std::collections::VecDeque;

use crate::{searcher::Searcher, state::StateRef};

/// A searcher implementing breadth-first exploration over *branch depth*.
///
/// States wait in a FIFO and the front one is selected. The fork history is a
/// binary tree, so a single branching instruction can fork repeatedly; to
/// keep all states produced by one branch at the same branch depth, a
/// selected state that just forked is moved back to the front before its
/// children are enqueued at the tail. It then finishes the branch before the
/// queue rotates.
#[derive(Debug, Default)]
pub struct BfsSearcher {
    states: VecDeque<StateRef>,
}

impl BfsSearcher {
    /// Constructs a new, empty, breadth-first searcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Searcher for BfsSearcher {
    fn select_state(&mut self) -> StateRef {
        self.states
            .front()
            .expect("Cannot select a state from an empty searcher")
            .clone()
    }

    fn update(&mut self, current: Option<&StateRef>, added: &[StateRef], removed: &[StateRef]) {
        // A non-empty `added` means the engine forked, so a surviving
        // `current` goes back to the head to finish its branch first.
        if let Some(current) = current {
            if !added.is_empty() && !removed.contains(current) {
                let position = self
                    .states
                    .iter()
                    .position(|candidate| candidate == current)
                    .expect("Current state is not scheduled here");
                let state = self
                    .states
                    .remove(position)
                    .expect("Position was just found");
                self.states.push_front(state);
            }
        }

        self.states.extend(added.iter().cloned());

        for state in removed {
            let position = self
                .states
                .iter()
                .position(|candidate| candidate == state)
                .expect("Removed a state that was never added");
            let _ = self.states.remove(position);
        }
    }

    fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    fn name(&self) -> String {
        "BfsSearcher".into()
    }
}
