//! This module contains the handle type for the execution states that
//! searchers schedule.
//!
//! States are owned by the engine that executes them; the scheduler only
//! holds shared handles and reads the attributes its heuristics need. All
//! attributes are interior-mutable so the engine can record progress (retired
//! instructions, solver time, coverage signals) through any handle it kept,
//! without the searchers needing mutable access to the states they store.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
    time::Duration,
};

use crate::{data::discrete_pdf::StableIndex, ptree::NodeRef};

/// A shared handle to an execution state.
pub type StateRef = Rc<ExecutionState>;

/// The identity of an execution state.
///
/// Identities are assigned at state creation, totally ordered, and never
/// reused. Searchers use them for membership checks and for deterministic
/// tie-breaking in their associative structures.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct StateId(u64);

impl StateId {
    /// Constructs a state identity from its raw value.
    #[must_use]
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Gets the raw value of the identity.
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StableIndex for StateId {
    fn stable_index(&self) -> u64 {
        self.0
    }
}

/// One symbolic execution state, as seen by the scheduler.
///
/// The scheduler never inspects the program counter, constraints, or memory
/// of a state; it reads only the identity and the heuristic attributes below.
pub struct ExecutionState {
    /// The unique identity of this state.
    id: StateId,

    /// The number of forks between the initial state and this one.
    depth: Cell<u32>,

    /// The total number of instructions this state has retired.
    instruction_count: Cell<u64>,

    /// The number of instructions retired on the current call path.
    call_path_instruction_count: Cell<u64>,

    /// The solver time this state has accumulated.
    query_cost: Cell<Duration>,

    /// The static distance from this state's position to the nearest
    /// uncovered code, or [`None`] when no uncovered code is reachable.
    min_dist_to_uncovered: Cell<Option<u64>>,

    /// Whether this state recently covered new code.
    covers_new: Cell<bool>,

    /// The process-tree leaf currently representing this state.
    ptree_leaf: RefCell<Option<NodeRef>>,
}

impl ExecutionState {
    /// Constructs a fresh state with the provided identity and zeroed
    /// heuristic attributes, wrapped for sharing.
    #[must_use]
    pub fn new(id: StateId) -> StateRef {
        Rc::new(Self {
            id,
            depth: Cell::new(0),
            instruction_count: Cell::new(0),
            call_path_instruction_count: Cell::new(0),
            query_cost: Cell::new(Duration::ZERO),
            min_dist_to_uncovered: Cell::new(None),
            covers_new: Cell::new(false),
            ptree_leaf: RefCell::new(None),
        })
    }

    /// Creates the handle for a state forked off `self`, carrying the
    /// provided fresh identity.
    ///
    /// Both sides of a fork sit one level deeper in the fork history, so the
    /// depth of `self` is bumped and copied to the child. The remaining
    /// heuristic attributes are inherited as they stand. The child is not yet
    /// part of any process tree; see [`crate::ptree::PTree::fork`].
    #[must_use]
    pub fn fork_child(&self, id: StateId) -> StateRef {
        self.depth.set(self.depth.get() + 1);
        Rc::new(Self {
            id,
            depth: Cell::new(self.depth.get()),
            instruction_count: Cell::new(self.instruction_count.get()),
            call_path_instruction_count: Cell::new(self.call_path_instruction_count.get()),
            query_cost: Cell::new(self.query_cost.get()),
            min_dist_to_uncovered: Cell::new(self.min_dist_to_uncovered.get()),
            covers_new: Cell::new(self.covers_new.get()),
            ptree_leaf: RefCell::new(None),
        })
    }

    /// Gets the identity of this state.
    #[must_use]
    pub fn id(&self) -> StateId {
        self.id
    }

    /// Gets the number of forks between the initial state and this one.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth.get()
    }

    /// Sets the fork depth of this state.
    pub fn set_depth(&self, depth: u32) {
        self.depth.set(depth);
    }

    /// Gets the total number of instructions this state has retired.
    #[must_use]
    pub fn instruction_count(&self) -> u64 {
        self.instruction_count.get()
    }

    /// Gets the number of instructions retired on the current call path.
    #[must_use]
    pub fn call_path_instruction_count(&self) -> u64 {
        self.call_path_instruction_count.get()
    }

    /// Records `count` freshly retired instructions against this state.
    pub fn record_instructions(&self, count: u64) {
        self.instruction_count.set(self.instruction_count.get() + count);
        self.call_path_instruction_count
            .set(self.call_path_instruction_count.get() + count);
    }

    /// Resets the call-path instruction counter, as done when the state
    /// enters a new function.
    pub fn reset_call_path_instructions(&self) {
        self.call_path_instruction_count.set(0);
    }

    /// Gets the solver time this state has accumulated.
    #[must_use]
    pub fn query_cost(&self) -> Duration {
        self.query_cost.get()
    }

    /// Adds `cost` to the solver time accumulated by this state.
    pub fn record_query_cost(&self, cost: Duration) {
        self.query_cost.set(self.query_cost.get() + cost);
    }

    /// Gets the static distance to the nearest uncovered code, or [`None`]
    /// when no uncovered code is reachable from this state.
    #[must_use]
    pub fn min_dist_to_uncovered(&self) -> Option<u64> {
        self.min_dist_to_uncovered.get()
    }

    /// Sets the static distance to the nearest uncovered code.
    pub fn set_min_dist_to_uncovered(&self, distance: Option<u64>) {
        self.min_dist_to_uncovered.set(distance);
    }

    /// Checks whether this state recently covered new code.
    #[must_use]
    pub fn covers_new(&self) -> bool {
        self.covers_new.get()
    }

    /// Sets whether this state recently covered new code.
    pub fn set_covers_new(&self, covers_new: bool) {
        self.covers_new.set(covers_new);
    }

    /// Gets the process-tree leaf currently representing this state, if the
    /// state is part of a tree.
    #[must_use]
    pub fn ptree_leaf(&self) -> Option<NodeRef> {
        self.ptree_leaf.borrow().clone()
    }

    /// Points this state at the process-tree leaf that represents it.
    pub(crate) fn set_ptree_leaf(&self, leaf: Option<NodeRef>) {
        *self.ptree_leaf.borrow_mut() = leaf;
    }
}

impl PartialEq for ExecutionState {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ExecutionState {}

impl PartialOrd for ExecutionState {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExecutionState {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl std::hash::Hash for ExecutionState {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// The leaf back-reference is deliberately omitted: a leaf prints the state
/// it represents, so including it here would recurse.
impl fmt::Debug for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionState")
            .field("id", &self.id)
            .field("depth", &self.depth.get())
            .field("instruction_count", &self.instruction_count.get())
            .field("query_cost", &self.query_cost.get())
            .field("min_dist_to_uncovered", &self.min_dist_to_uncovered.get())
            .field("covers_new", &self.covers_new.get())
            .finish_non_exhaustive()
    }
}
