//! This module contains the random-path searcher, which selects states by a
//! fair random walk over the process tree.

use crate::{
    error::Result,
    ptree::{PTree, SharedPTree, Side},
    rng::SharedRng,
    searcher::Searcher,
    state::StateRef,
};

/// A searcher that walks the process tree from the root, flipping a fair coin
/// at every fork it owns on both sides, and returns the state at the leaf it
/// reaches.
///
/// The tree is shared, and a random-path searcher may schedule only a subset
/// of the live states. Membership is encoded directly on the tree: each child
/// edge carries one ownership bit per registered searcher, so selection is a
/// pure tree walk with no auxiliary index. Construction claims one of the
/// tree's ownership-bit slots; the bits themselves are maintained by
/// [`Searcher::update`] — set upwards from a leaf on births, cleared upwards
/// on deaths until an ancestor still owns a surviving sibling.
#[derive(Debug)]
pub struct RandomPathSearcher {
    tree: SharedPTree,
    rng: SharedRng,

    /// The ownership bitmask of this searcher, unique within `tree`.
    mask: u8,
}

impl RandomPathSearcher {
    /// Constructs a new random-path searcher over `tree`, drawing from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `tree` has already handed out all of its
    /// ownership-bit slots.
    pub fn new(tree: SharedPTree, rng: SharedRng) -> Result<Self> {
        let mask = tree.borrow_mut().register_searcher()?;
        Ok(Self { tree, rng, mask })
    }

    /// Sets this searcher's ownership bit on the chain of edges from the leaf
    /// of `state` towards the root, stopping at the first edge that already
    /// carries it.
    fn claim(&self, tree: &mut PTree, state: &StateRef) {
        let mut node = state
            .ptree_leaf()
            .expect("Added a state that has no process-tree leaf");

        loop {
            let parent = node.borrow().parent();
            match parent {
                Some(parent) => {
                    {
                        let mut pb = parent.borrow_mut();
                        let side = pb.side_of(&node);
                        let edge = pb.edge_mut(side);
                        if edge.carries(self.mask) {
                            return;
                        }
                        edge.set(self.mask);
                    }
                    node = parent;
                }
                None => {
                    tree.root_mut().set(self.mask);
                    return;
                }
            }
        }
    }

    /// Clears this searcher's ownership bit on the chain of edges from the
    /// leaf of `state` towards the root, stopping below the first ancestor
    /// whose other child still carries the bit.
    fn release(&self, tree: &mut PTree, state: &StateRef) {
        let mut node = state
            .ptree_leaf()
            .expect("Removed a state that has no process-tree leaf");

        loop {
            let keeps_owned_subtree = {
                let nb = node.borrow();
                nb.edge(Side::Left).owned_by(self.mask) || nb.edge(Side::Right).owned_by(self.mask)
            };
            if keeps_owned_subtree {
                return;
            }

            let parent = node.borrow().parent();
            match parent {
                Some(parent) => {
                    {
                        let mut pb = parent.borrow_mut();
                        let side = pb.side_of(&node);
                        let edge = pb.edge_mut(side);
                        assert!(
                            edge.carries(self.mask),
                            "Removed a state this searcher does not own"
                        );
                        edge.clear(self.mask);
                    }
                    node = parent;
                }
                None => {
                    let root = tree.root_mut();
                    assert!(
                        root.carries(self.mask),
                        "Removed a state this searcher does not own"
                    );
                    root.clear(self.mask);
                    return;
                }
            }
        }
    }
}

impl Searcher for RandomPathSearcher {
    fn select_state(&mut self) -> StateRef {
        let tree = self.tree.borrow();
        assert!(
            tree.root().owned_by(self.mask),
            "Cannot select a state from an empty searcher"
        );
        let mut node = tree
            .root()
            .child()
            .expect("Ownership was just checked")
            .clone();

        // Random bits are consumed one per two-sided fork, drawn 32 at a
        // time.
        let mut flips = 0u32;
        let mut remaining_bits = 0u8;

        loop {
            let next = {
                let nb = node.borrow();
                if let Some(state) = nb.state() {
                    return state.clone();
                }

                let left = nb.edge(Side::Left).owned_by(self.mask);
                let right = nb.edge(Side::Right).owned_by(self.mask);
                let side = match (left, right) {
                    (true, false) => Side::Left,
                    (false, true) => Side::Right,
                    (true, true) => {
                        if remaining_bits == 0 {
                            flips = self.rng.next_u32();
                            remaining_bits = 32;
                        }
                        remaining_bits -= 1;
                        if flips & (1 << remaining_bits) != 0 {
                            Side::Left
                        } else {
                            Side::Right
                        }
                    }
                    (false, false) => {
                        panic!("Walk descended into a subtree with no owned children")
                    }
                };
                nb.edge(side)
                    .child()
                    .expect("Ownership implies a child")
                    .clone()
            };
            node = next;
        }
    }

    fn update(&mut self, _current: Option<&StateRef>, added: &[StateRef], removed: &[StateRef]) {
        let mut tree = self.tree.borrow_mut();

        // Births claim their leaves before deaths release theirs, keeping the
        // tag mutation monotone within the call.
        for state in added {
            self.claim(&mut tree, state);
        }
        for state in removed {
            self.release(&mut tree, state);
        }
    }

    fn is_empty(&self) -> bool {
        !self.tree.borrow().root().owned_by(self.mask)
    }

    fn name(&self) -> String {
        "RandomPathSearcher".into()
    }
}

#[cfg(test)]
mod test {
    use crate::{
        ptree::{PTree, SharedPTree},
        rng::SharedRng,
        searcher::{RandomPathSearcher, Searcher},
        state::{ExecutionState, StateId, StateRef},
    };

    fn tree_with_initial() -> (SharedPTree, StateRef) {
        let initial = ExecutionState::new(StateId::new(1));
        let tree = PTree::new(initial.clone()).into_shared();
        (tree, initial)
    }

    #[test]
    fn starts_empty_until_a_state_is_added() {
        let (tree, initial) = tree_with_initial();
        let mut searcher =
            RandomPathSearcher::new(tree, SharedRng::seeded(0)).expect("No slot available");

        assert!(searcher.is_empty());
        searcher.update(None, &[initial.clone()], &[]);
        assert!(!searcher.is_empty());
        assert_eq!(searcher.select_state(), initial);
    }

    #[test]
    fn follows_forks_without_being_told() {
        let (tree, initial) = tree_with_initial();
        let mut searcher =
            RandomPathSearcher::new(tree.clone(), SharedRng::seeded(0)).expect("No slot available");
        searcher.update(None, &[initial.clone()], &[]);

        // The fork itself keeps `initial` owned through tag inheritance; only
        // the new sibling needs reporting.
        let forked = initial.fork_child(StateId::new(2));
        tree.borrow_mut().fork(&initial, &forked);
        searcher.update(Some(&initial), &[forked.clone()], &[]);

        let mut seen_forked = false;
        let mut seen_initial = false;
        for _ in 0..64 {
            let selected = searcher.select_state();
            seen_forked |= selected == forked;
            seen_initial |= selected == initial;
        }
        assert!(seen_forked && seen_initial);
    }

    #[test]
    fn death_of_one_sibling_leaves_the_other() {
        let (tree, initial) = tree_with_initial();
        let mut searcher =
            RandomPathSearcher::new(tree.clone(), SharedRng::seeded(0)).expect("No slot available");
        searcher.update(None, &[initial.clone()], &[]);

        let forked = initial.fork_child(StateId::new(2));
        tree.borrow_mut().fork(&initial, &forked);
        searcher.update(Some(&initial), &[forked.clone()], &[]);

        searcher.update(None, &[], &[forked.clone()]);
        tree.borrow_mut().remove(&forked);

        for _ in 0..16 {
            assert_eq!(searcher.select_state(), initial);
        }
    }

    #[test]
    fn empties_when_its_whole_subtree_dies() {
        let (tree, initial) = tree_with_initial();
        let mut searcher =
            RandomPathSearcher::new(tree.clone(), SharedRng::seeded(0)).expect("No slot available");
        searcher.update(None, &[initial.clone()], &[]);

        searcher.update(None, &[], &[initial.clone()]);
        assert!(searcher.is_empty());
        tree.borrow_mut().remove(&initial);
    }

    #[test]
    fn two_searchers_can_own_disjoint_subtrees() {
        let (tree, initial) = tree_with_initial();
        let rng = SharedRng::seeded(0);
        let mut first =
            RandomPathSearcher::new(tree.clone(), rng.clone()).expect("No slot available");
        let mut second = RandomPathSearcher::new(tree.clone(), rng).expect("No slot available");

        first.update(None, &[initial.clone()], &[]);

        let forked = initial.fork_child(StateId::new(2));
        tree.borrow_mut().fork(&initial, &forked);
        // The fork is reported to both searchers, but the new sibling is
        // handed to the second one only.
        first.update(Some(&initial), &[], &[]);
        second.update(None, &[forked.clone()], &[]);

        for _ in 0..16 {
            assert_eq!(first.select_state(), initial);
            assert_eq!(second.select_state(), forked);
        }
    }
}
