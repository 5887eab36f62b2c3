//! This module contains the depth-first searcher.

use crate::{searcher::Searcher, state::StateRef};

/// A searcher implementing depth-first exploration.
///
/// States are kept in insertion order and the last one is selected, so the
/// most recently forked state keeps running until it terminates or forks
/// again. Survivors of an update keep their original positions.
#[derive(Debug, Default)]
pub struct DfsSearcher {
    states: Vec<StateRef>,
}

impl DfsSearcher {
    /// Constructs a new, empty, depth-first searcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Searcher for DfsSearcher {
    fn select_state(&mut self) -> StateRef {
        self.states
            .last()
            .expect("Cannot select a state from an empty searcher")
            .clone()
    }

    fn update(&mut self, _current: Option<&StateRef>, added: &[StateRef], removed: &[StateRef]) {
        self.states.extend(added.iter().cloned());

        for state in removed {
            let position = self
                .states
                .iter()
                .position(|candidate| candidate == state)
                .expect("Removed a state that was never added");
            self.states.remove(position);
        }
    }

    fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    fn name(&self) -> String {
        "DfsSearcher".into()
    }
}
