//! This module contains the interleaved combinator, which rotates between
//! several searchers driven over the same population.

use itertools::Itertools;

use crate::{searcher::Searcher, state::StateRef};

/// A combinator that consults its child searchers round-robin.
///
/// Every child observes the full population: updates are broadcast to all of
/// them, and each selection comes from the next child in rotation. This is
/// how an engine hedges between heuristics, e.g. alternating a random-path
/// walk with a coverage-driven weighted searcher.
#[derive(Debug)]
pub struct InterleavedSearcher {
    searchers: Vec<Box<dyn Searcher>>,
    index: usize,
}

impl InterleavedSearcher {
    /// Constructs a combinator rotating over `searchers`.
    ///
    /// # Panics
    ///
    /// Panics if `searchers` is empty. This is a programmer bug.
    #[must_use]
    pub fn new(searchers: Vec<Box<dyn Searcher>>) -> Self {
        assert!(
            !searchers.is_empty(),
            "An interleaved searcher needs at least one child"
        );
        let index = 0;
        Self { searchers, index }
    }
}

impl Searcher for InterleavedSearcher {
    fn select_state(&mut self) -> StateRef {
        let state = self.searchers[self.index].select_state();
        self.index = (self.index + 1) % self.searchers.len();
        state
    }

    fn update(&mut self, current: Option<&StateRef>, added: &[StateRef], removed: &[StateRef]) {
        for searcher in &mut self.searchers {
            searcher.update(current, added, removed);
        }
    }

    fn is_empty(&self) -> bool {
        // All children observe the same population, so the first one speaks
        // for everyone.
        self.searchers[0].is_empty()
    }

    fn name(&self) -> String {
        format!(
            "<InterleavedSearcher> containing {} searchers:\n{}\n</InterleavedSearcher>",
            self.searchers.len(),
            self.searchers.iter().map(|searcher| searcher.name()).join("\n")
        )
    }
}
