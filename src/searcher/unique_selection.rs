//! This module contains the unique-selection wrapper, which guarantees that
//! consecutive selections return pairwise-distinct states.

use crate::{searcher::Searcher, state::StateRef};

/// A searcher that returns pairwise-distinct states across a window of
/// consecutive selections.
///
/// Base policies are free to return the same state again and again (a
/// depth-first base will do exactly that); engines that fan work out — to
/// seed a portfolio, to snapshot a spread of the frontier — need a window of
/// *different* states instead. Each selection is withheld from the base until
/// the window is full (or the base drains), at which point the withheld
/// states are restored in selection order and a new window begins.
#[derive(Debug)]
pub struct UniqueSelectionSearcher {
    base: Box<dyn Searcher>,

    /// The number of consecutive selections guaranteed distinct.
    window: usize,

    /// The states withheld from the base, in selection order.
    withheld: Vec<StateRef>,
}

impl UniqueSelectionSearcher {
    /// Constructs a unique-selection searcher over `base` with the provided
    /// `window`.
    ///
    /// # Panics
    ///
    /// Panics if `window` is zero. This is a programmer bug.
    #[must_use]
    pub fn new(base: Box<dyn Searcher>, window: usize) -> Self {
        assert!(window > 0, "The selection window must be at least one");
        Self {
            base,
            window,
            withheld: Vec::new(),
        }
    }
}

impl Searcher for UniqueSelectionSearcher {
    fn select_state(&mut self) -> StateRef {
        // Deaths may have drained the base mid-window; the withheld states
        // are the whole remaining population then, so the window restarts.
        if self.base.is_empty() && !self.withheld.is_empty() {
            self.base.update(None, &self.withheld, &[]);
            self.withheld.clear();
        }

        let state = self.base.select_state();
        self.base.update(None, &[], std::slice::from_ref(&state));
        self.withheld.push(state.clone());

        if self.withheld.len() == self.window || self.base.is_empty() {
            self.base.update(None, &self.withheld, &[]);
            self.withheld.clear();
        }

        state
    }

    fn update(&mut self, current: Option<&StateRef>, added: &[StateRef], removed: &[StateRef]) {
        let current = current.filter(|current| !self.withheld.contains(*current));
        let removes_withheld = removed
            .iter()
            .any(|state| self.withheld.contains(state));

        if !removes_withheld {
            self.base.update(current, added, removed);
            return;
        }

        // Deaths of withheld states are absorbed here; the base no longer
        // knows them.
        let forwarded: Vec<StateRef> = removed
            .iter()
            .filter(|state| !self.withheld.contains(*state))
            .cloned()
            .collect();
        self.withheld.retain(|state| !removed.contains(state));
        self.base.update(current, added, &forwarded);
    }

    fn is_empty(&self) -> bool {
        self.base.is_empty() && self.withheld.is_empty()
    }

    fn name(&self) -> String {
        format!(
            "<UniqueSelectionSearcher> window: {}, base:\n{}\n</UniqueSelectionSearcher>",
            self.window,
            self.base.name()
        )
    }
}
