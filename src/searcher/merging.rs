//! This module contains the merging searcher, the scheduling half of
//! speculative state merging.
//!
//! The merge protocol itself — how groups of states form between the open-
//! and close-merge markers of the program under test, when a group completes,
//! and how a merged state replaces its constituents — belongs to a merge
//! handler owned by the engine. The searcher contributes exactly two things:
//! the pause/continue primitives that make states invisible to its base
//! while they wait at a close-merge, and the guarantee that a paused state
//! passing through an update cannot corrupt the base's heuristics.

use std::{cell::RefCell, fmt::Debug, rc::Rc};

use crate::{searcher::Searcher, state::StateRef};

/// The searcher-facing interface of one ongoing merge: a set of states that
/// branched from a common open-merge and have not all reached the matching
/// close-merge yet.
///
/// Handlers are registered on the [`MergingSearcher`] so that, in
/// incomplete-merge mode, selection can push lagging group members forward or
/// abandon a merge that has waited too long.
pub trait MergeHandler
where
    Self: Debug,
{
    /// Checks whether any state of this group has already arrived at the
    /// close-merge and is waiting for its siblings.
    fn has_waiting_states(&self) -> bool;

    /// Gets a group member worth advancing to bring the merge to completion,
    /// if one is still within the handler's patience. The returned state must
    /// be scheduled by the searcher's base.
    fn prioritized_state(&mut self) -> Option<StateRef>;

    /// Abandons the merge: removes and returns the states that already
    /// arrived so the searcher can resume scheduling them.
    fn take_waiting_states(&mut self) -> Vec<StateRef>;
}

/// A shared handle to a merge handler.
pub type MergeHandlerRef = Rc<RefCell<dyn MergeHandler>>;

/// A searcher that coordinates scheduling around speculative state merging.
///
/// Selection normally just delegates to the base; the value of the wrapper is
/// in keeping paused states out of the base's view until they are continued.
#[derive(Debug)]
pub struct MergingSearcher {
    base: Box<dyn Searcher>,

    /// The states withheld from the base while they wait to be merged.
    paused: Vec<StateRef>,

    /// The ongoing merges, in registration order.
    merge_groups: Vec<MergeHandlerRef>,

    /// Whether selection may push merge groups forward or abandon them,
    /// rather than letting merges complete only if scheduling happens to
    /// cooperate.
    incomplete_merge: bool,
}

impl MergingSearcher {
    /// Constructs a merging searcher over `base`.
    #[must_use]
    pub fn new(base: Box<dyn Searcher>, incomplete_merge: bool) -> Self {
        Self {
            base,
            paused: Vec::new(),
            merge_groups: Vec::new(),
            incomplete_merge,
        }
    }

    /// Removes `state` from the base searcher while keeping it alive in the
    /// engine, freezing it until [`MergingSearcher::continue_state`].
    ///
    /// # Panics
    ///
    /// Panics if `state` is already paused. This is a programmer bug.
    pub fn pause_state(&mut self, state: &StateRef) {
        assert!(
            !self.paused.contains(state),
            "Paused a state that is already paused"
        );
        self.paused.push(state.clone());
        self.base.update(None, &[], std::slice::from_ref(state));
    }

    /// Returns a paused `state` to the base searcher's view.
    ///
    /// # Panics
    ///
    /// Panics if `state` is not paused. This is a programmer bug.
    pub fn continue_state(&mut self, state: &StateRef) {
        let position = self
            .paused
            .iter()
            .position(|candidate| candidate == state)
            .expect("Continued a state that is not paused");
        self.paused.remove(position);
        self.base.update(None, std::slice::from_ref(state), &[]);
    }

    /// Registers an ongoing merge with this searcher.
    pub fn register_merge_group(&mut self, group: MergeHandlerRef) {
        self.merge_groups.push(group);
    }

    /// Unregisters a completed or abandoned merge.
    pub fn unregister_merge_group(&mut self, group: &MergeHandlerRef) {
        self.merge_groups
            .retain(|candidate| !Rc::ptr_eq(candidate, group));
    }

    /// Gets the states currently paused, for engine-side bookkeeping.
    #[must_use]
    pub fn paused_states(&self) -> &[StateRef] {
        &self.paused
    }
}

impl Searcher for MergingSearcher {
    fn select_state(&mut self) -> StateRef {
        if self.incomplete_merge {
            // Try to drive some ongoing merge to completion before falling
            // back to the base policy.
            let groups = self.merge_groups.clone();
            for group in groups {
                let mut group = group.borrow_mut();
                if !group.has_waiting_states() {
                    continue;
                }
                if let Some(state) = group.prioritized_state() {
                    return state;
                }
                // Nobody in the group is worth waiting for any longer;
                // release whoever already arrived.
                tracing::debug!("releasing the waiting states of a stale merge group");
                let released = group.take_waiting_states();
                drop(group);
                for state in &released {
                    self.continue_state(state);
                }
            }
        }

        self.base.select_state()
    }

    fn update(&mut self, current: Option<&StateRef>, added: &[StateRef], removed: &[StateRef]) {
        // A paused current state is unknown to the base; forwarding it as
        // freshly selected would corrupt the base's heuristics.
        let current = current.filter(|current| !self.paused.contains(*current));
        self.base.update(current, added, removed);
    }

    fn is_empty(&self) -> bool {
        self.base.is_empty() && self.paused.is_empty()
    }

    fn name(&self) -> String {
        format!(
            "<MergingSearcher> base:\n{}\n</MergingSearcher>",
            self.base.name()
        )
    }
}
