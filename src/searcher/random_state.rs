//! This module contains the uniformly random searcher.

use crate::{rng::SharedRng, searcher::Searcher, state::StateRef};

/// A searcher that picks a state uniformly at random.
#[derive(Debug)]
pub struct RandomSearcher {
    states: Vec<StateRef>,
    rng: SharedRng,
}

impl RandomSearcher {
    /// Constructs a new, empty, random searcher drawing from `rng`.
    #[must_use]
    pub fn new(rng: SharedRng) -> Self {
        let states = Vec::new();
        Self { states, rng }
    }
}

impl Searcher for RandomSearcher {
    fn select_state(&mut self) -> StateRef {
        assert!(
            !self.states.is_empty(),
            "Cannot select a state from an empty searcher"
        );
        self.states[self.rng.below(self.states.len())].clone()
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
        "RandomSearcher".into()
    }
}
