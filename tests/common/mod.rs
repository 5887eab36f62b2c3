//! This module contains common testing utilities for testing this library.
#![cfg(test)]

use state_scheduler::{
    ptree::{PTree, SharedPTree},
    searcher::Searcher,
    state::{ExecutionState, StateId, StateRef},
};

/// A stand-in for the engine side of the scheduling loop: it owns the
/// process tree, assigns state identities, and keeps the searcher and the
/// tree consistent across forks and terminations in the order the contract
/// requires (births reported after the tree grew, deaths reported before the
/// leaf collapses).
#[allow(unused)] // It is actually
pub struct Engine {
    tree: SharedPTree,
    next_id: u64,
}

impl Engine {
    /// Boots an engine with a single initial state of id 1.
    #[allow(unused)] // It is actually
    pub fn boot() -> (Self, StateRef) {
        let initial = ExecutionState::new(StateId::new(1));
        let tree = PTree::new(initial.clone()).into_shared();
        let engine = Self { tree, next_id: 1 };
        (engine, initial)
    }

    /// Gets the shared process tree.
    #[allow(unused)] // It is actually
    pub fn tree(&self) -> &SharedPTree {
        &self.tree
    }

    /// Forks `current`, growing the tree and reporting the birth to
    /// `searcher`. Returns the new sibling.
    #[allow(unused)] // It is actually
    pub fn fork(&mut self, searcher: &mut dyn Searcher, current: &StateRef) -> StateRef {
        self.next_id += 1;
        let child = current.fork_child(StateId::new(self.next_id));
        self.tree.borrow_mut().fork(current, &child);
        searcher.update(Some(current), std::slice::from_ref(&child), &[]);
        child
    }

    /// Terminates `state`, reporting the death to `searcher` before the leaf
    /// collapses out of the tree.
    #[allow(unused)] // It is actually
    pub fn terminate(&mut self, searcher: &mut dyn Searcher, state: &StateRef) {
        searcher.update(Some(state), &[], std::slice::from_ref(state));
        self.tree.borrow_mut().remove(state);
    }
}

/// Creates `count` fresh states with ids `1..=count`, for searchers that do
/// not involve the process tree.
#[allow(unused)] // It is actually
pub fn fresh_states(count: u64) -> Vec<StateRef> {
    (1..=count)
        .map(|id| ExecutionState::new(StateId::new(id)))
        .collect()
}
