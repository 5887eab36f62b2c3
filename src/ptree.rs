//! This module contains the process tree: the binary tree recording the fork
//! history of execution states.
//!
//! Leaves of the tree are exactly the live states. Interior nodes are past
//! fork points; they hold no state of their own. Each child edge carries a
//! small ownership tag with one bit per registered random-path searcher, so
//! that such a searcher can select a state by walking only the subtrees it
//! owns, without any auxiliary index. The tag algebra (set, clear, test by
//! searcher mask) lives on [`Edge`]; maintaining the bits across births and
//! deaths is the random-path searcher's job.
//!
//! # Structural Mutation
//!
//! Only the engine mutates the tree structurally, through [`PTree::fork`] and
//! [`PTree::remove`]. Searchers must be notified of a death (so they can
//! clear their tag bits along the ancestor chain) *before* the leaf is
//! removed from the tree.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use crate::{
    constant::RANDOM_PATH_SEARCHER_LIMIT,
    error::{Error, Result},
    state::StateRef,
};

/// A shared handle to a process tree.
pub type SharedPTree = Rc<RefCell<PTree>>;

/// A shared handle to a process-tree node.
pub type NodeRef = Rc<RefCell<PTreeNode>>;

/// Which child edge of an interior node is meant.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Side {
    Left,
    Right,
}

/// A child edge of the process tree: an optional child node together with the
/// ownership tag for the subtree below it.
#[derive(Clone, Debug, Default)]
pub struct Edge {
    /// The node the edge points at, if any.
    child: Option<NodeRef>,

    /// The ownership tag, one bit per registered random-path searcher.
    tags: u8,
}

impl Edge {
    /// Constructs an edge pointing at `child` and carrying `tags`.
    fn new(child: NodeRef, tags: u8) -> Self {
        let child = Some(child);
        Self { child, tags }
    }

    /// Gets the node this edge points at, if any.
    #[must_use]
    pub fn child(&self) -> Option<&NodeRef> {
        self.child.as_ref()
    }

    /// Checks whether the edge points at a node and carries the bit in
    /// `mask`, i.e. whether the subtree below it belongs to the searcher
    /// holding `mask`.
    #[must_use]
    pub fn owned_by(&self, mask: u8) -> bool {
        self.child.is_some() && self.carries(mask)
    }

    /// Checks whether the edge carries the bit in `mask`.
    #[must_use]
    pub fn carries(&self, mask: u8) -> bool {
        self.tags & mask != 0
    }

    /// Sets the bit in `mask` on this edge.
    pub fn set(&mut self, mask: u8) {
        self.tags |= mask;
    }

    /// Clears the bit in `mask` from this edge.
    pub fn clear(&mut self, mask: u8) {
        self.tags &= !mask;
    }

    /// Gets the full ownership tag of this edge.
    #[must_use]
    pub fn tags(&self) -> u8 {
        self.tags
    }
}

/// One node of the process tree.
///
/// A node is a leaf exactly while it carries a state; forking replaces the
/// state with two child edges.
#[derive(Debug)]
pub struct PTreeNode {
    /// The parent node, absent for the tree root.
    parent: Option<Weak<RefCell<PTreeNode>>>,

    /// The left child edge. By convention the freshly forked state lands
    /// here.
    left: Edge,

    /// The right child edge. By convention the state that was already
    /// executing continues here.
    right: Edge,

    /// The state this node represents, present exactly on leaves.
    state: Option<StateRef>,
}

impl PTreeNode {
    /// Creates a fresh leaf for `state` below `parent`.
    fn new_leaf(parent: Option<&NodeRef>, state: StateRef) -> NodeRef {
        Rc::new(RefCell::new(Self {
            parent: parent.map(Rc::downgrade),
            left: Edge::default(),
            right: Edge::default(),
            state: Some(state),
        }))
    }

    /// Checks whether this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.state.is_some()
    }

    /// Gets the state this node represents, if it is a leaf.
    #[must_use]
    pub fn state(&self) -> Option<&StateRef> {
        self.state.as_ref()
    }

    /// Gets the parent of this node, if it has one.
    #[must_use]
    pub fn parent(&self) -> Option<NodeRef> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Gets the child edge on `side`.
    #[must_use]
    pub fn edge(&self, side: Side) -> &Edge {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Gets the child edge on `side` for modification.
    pub fn edge_mut(&mut self, side: Side) -> &mut Edge {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// Gets the side of the edge pointing at `child`.
    ///
    /// # Panics
    ///
    /// Panics if `child` is not a child of this node. This is a programmer
    /// bug.
    #[must_use]
    pub fn side_of(&self, child: &NodeRef) -> Side {
        if self.left.child().is_some_and(|c| Rc::ptr_eq(c, child)) {
            Side::Left
        } else if self.right.child().is_some_and(|c| Rc::ptr_eq(c, child)) {
            Side::Right
        } else {
            panic!("Node is not a child of the presumed parent")
        }
    }

    /// Checks whether this node has no children at all.
    fn is_childless(&self) -> bool {
        self.left.child().is_none() && self.right.child().is_none()
    }
}

/// The process tree itself: a root edge plus the bookkeeping for random-path
/// searcher registration.
#[derive(Debug)]
pub struct PTree {
    /// The edge above the root node. It carries ownership tags like any other
    /// edge, so the walk and the tag maintenance need no special case for the
    /// topmost node.
    root: Edge,

    /// The number of random-path searchers registered so far.
    registered_searchers: u8,
}

impl PTree {
    /// Constructs a tree whose single leaf represents `initial`.
    #[must_use]
    pub fn new(initial: StateRef) -> Self {
        let node = PTreeNode::new_leaf(None, initial.clone());
        initial.set_ptree_leaf(Some(node.clone()));
        Self {
            root: Edge::new(node, 0),
            registered_searchers: 0,
        }
    }

    /// Wraps the tree into the shared handle the searchers expect.
    #[must_use]
    pub fn into_shared(self) -> SharedPTree {
        Rc::new(RefCell::new(self))
    }

    /// Gets the edge above the root node.
    #[must_use]
    pub fn root(&self) -> &Edge {
        &self.root
    }

    /// Gets the edge above the root node for tag maintenance.
    pub fn root_mut(&mut self) -> &mut Edge {
        &mut self.root
    }

    /// Allocates the ownership bitmask for one more random-path searcher.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if all [`RANDOM_PATH_SEARCHER_LIMIT`] slots are taken.
    pub fn register_searcher(&mut self) -> Result<u8> {
        if self.registered_searchers >= RANDOM_PATH_SEARCHER_LIMIT {
            return Err(Error::RandomPathSlotsExhausted);
        }
        let mask = 1 << self.registered_searchers;
        self.registered_searchers += 1;
        Ok(mask)
    }

    /// Splits the leaf representing `current` into an interior node with two
    /// fresh leaves: `forked` on the left and `current` continuing on the
    /// right.
    ///
    /// The right edge inherits the ownership tags of the edge that pointed at
    /// the split leaf, so every searcher that owned `current` keeps owning it
    /// without being consulted. The left edge starts untagged; searchers
    /// claim it when the fork is reported to them as a birth.
    ///
    /// # Panics
    ///
    /// Panics if `current` is not represented by a leaf of this tree. This is
    /// a programmer bug.
    pub fn fork(&mut self, current: &StateRef, forked: &StateRef) {
        let node = current
            .ptree_leaf()
            .expect("Forked a state that has no process-tree leaf");
        let inherited = self.tags_of_edge_to(&node);

        let (left, right) = {
            let mut n = node.borrow_mut();
            assert!(n.is_leaf(), "Forked a state whose node is interior");

            let left = PTreeNode::new_leaf(Some(&node), forked.clone());
            let right = PTreeNode::new_leaf(Some(&node), current.clone());
            n.state = None;
            n.left = Edge::new(left.clone(), 0);
            n.right = Edge::new(right.clone(), inherited);
            (left, right)
        };

        forked.set_ptree_leaf(Some(left));
        current.set_ptree_leaf(Some(right));
    }

    /// Removes the leaf representing the terminated `state` and collapses the
    /// chain of ancestors left without children.
    ///
    /// # Panics
    ///
    /// Panics if `state` is not represented by a leaf of this tree. This is a
    /// programmer bug.
    pub fn remove(&mut self, state: &StateRef) {
        let node = state
            .ptree_leaf()
            .expect("Removed a state that has no process-tree leaf");
        assert!(
            node.borrow().is_leaf(),
            "Removed a state whose node is interior"
        );
        state.set_ptree_leaf(None);

        let mut cursor = Some(node);
        while let Some(n) = cursor {
            let parent = n.borrow().parent();
            match parent {
                Some(p) => {
                    {
                        let mut pb = p.borrow_mut();
                        let side = pb.side_of(&n);
                        *pb.edge_mut(side) = Edge::default();
                    }
                    let childless = p.borrow().is_childless();
                    cursor = childless.then_some(p);
                }
                None => {
                    self.root = Edge::default();
                    cursor = None;
                }
            }
        }
    }

    /// Gets the tags of the edge pointing at `node`, whether that edge lives
    /// in the node's parent or is the root edge.
    fn tags_of_edge_to(&self, node: &NodeRef) -> u8 {
        match node.borrow().parent() {
            Some(parent) => {
                let p = parent.borrow();
                let side = p.side_of(node);
                p.edge(side).tags()
            }
            None => self.root.tags(),
        }
    }
}
