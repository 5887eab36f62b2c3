//! This module contains the searchers: the schedulers that decide which
//! execution state the engine advances next.
//!
//! Base searchers (depth-first, breadth-first, uniform random, weighted
//! random, random path) each implement a standalone selection policy. Wrapper
//! searchers (batching, merging, iterative deepening, unique selection) adapt
//! a single base searcher, and the interleaved combinator drives several
//! searchers round-robin over one population. All of them speak the one
//! [`Searcher`] contract, so stacks can be composed freely.

pub mod batching;
pub mod bfs;
pub mod dfs;
pub mod interleaved;
pub mod iterative_deepening;
pub mod merging;
pub mod random_path;
pub mod random_state;
pub mod unique_selection;
pub mod weighted_random;

use std::fmt::Debug;

use downcast_rs::{impl_downcast, Downcast};

use crate::state::StateRef;

pub use batching::BatchingSearcher;
pub use bfs::BfsSearcher;
pub use dfs::DfsSearcher;
pub use interleaved::InterleavedSearcher;
pub use iterative_deepening::IterativeDeepeningTimeSearcher;
pub use merging::{MergeHandler, MergingSearcher};
pub use random_path::RandomPathSearcher;
pub use random_state::RandomSearcher;
pub use unique_selection::UniqueSelectionSearcher;
pub use weighted_random::{WeightPolicy, WeightedRandomSearcher};

/// The contract every searcher implements.
///
/// A searcher schedules a multiset of execution states: its *population*.
/// After `update(current, added, removed)` the population is
/// `(population ∪ added) \ removed`. The caller promises that `added` and
/// `removed` are disjoint, that every element of `removed` was previously
/// added (or is `current`), and that a removed state is never mentioned
/// again. Selecting does not remove: a state stays scheduled until it is
/// passed in `removed`.
///
/// Violating the contract is a programmer bug; searchers respond to misuse by
/// panicking with a diagnostic, not by returning an error.
///
/// The trait is downcastable so an engine holding the composed stack as a
/// `Box<dyn Searcher>` can still reach wrapper-specific operations, such as
/// the pause and continue primitives of the merging searcher.
pub trait Searcher
where
    Self: Debug + Downcast,
{
    /// Selects a state for further exploration.
    ///
    /// Every stochastic searcher draws from its injected generator, so the
    /// selection is deterministic with respect to the seed.
    ///
    /// # Panics
    ///
    /// Panics if the searcher is empty; callers must check
    /// [`Searcher::is_empty`] first.
    fn select_state(&mut self) -> StateRef;

    /// Notifies the searcher about new and terminated states.
    ///
    /// `current` is the state returned by the most recent
    /// [`Searcher::select_state`] call, if any. It is *not* implicitly
    /// removed; a terminated `current` must appear in `removed`.
    fn update(&mut self, current: Option<&StateRef>, added: &[StateRef], removed: &[StateRef]);

    /// Checks whether no state is left for exploration.
    #[must_use]
    fn is_empty(&self) -> bool;

    /// Gets a human-readable identification of the searcher, including its
    /// composition for wrappers and combinators.
    #[must_use]
    fn name(&self) -> String;
}

impl_downcast!(Searcher);
