//! This library implements the state-selection core of a symbolic execution
//! engine: the subsystem that decides, step after step, which pending
//! execution state to advance next.
//!
//! A symbolic executor forks at every branch it cannot decide, so live states
//! multiply into the thousands and millions. Which one to step next is a
//! policy question — trading coverage against depth, solver cost against
//! fairness — and this crate answers it with a family of composable
//! *searchers*.
//!
//! # How it Works
//!
//! From a very high level, one scheduling round proceeds as follows:
//!
//! 1. The engine asks the root [`searcher::Searcher`] for a state via
//!    `select_state`.
//! 2. The selected state is advanced by one unit of work — one instruction,
//!    or up to the next fork or termination.
//! 3. Forks are recorded in the [`ptree::PTree`], the binary tree of fork
//!    history whose leaves are exactly the live states.
//! 4. The engine reports births and deaths back through `update`; wrappers
//!    forward the report inward, rewriting it where their own bookkeeping
//!    (paused or withheld states) demands.
//! 5. Terminated states are collapsed out of the tree.
//!
//! Base searchers implement the selection policies: depth-first,
//! breadth-first, uniformly random, weighted random over a
//! [`data::discrete_pdf::DiscretePdf`], and the random tree walk of
//! [`searcher::RandomPathSearcher`]. Wrappers add time-slicing, merge
//! quiescence, iterative deepening, and distinct-selection windows on top of
//! any base, and the interleaved combinator rotates between whole stacks.
//!
//! # Basic Usage
//!
//! Describe the stack in a [`config::Config`] and build it against the shared
//! collaborators:
//!
//! ```
//! use state_scheduler::{
//!     clock::WallClock,
//!     config::{Config, Strategy},
//!     ptree::PTree,
//!     rng::SharedRng,
//!     searcher::Searcher,
//!     state::{ExecutionState, StateId},
//! };
//!
//! // The engine owns the initial state and the fork-history tree.
//! let initial = ExecutionState::new(StateId::new(1));
//! let tree = PTree::new(initial.clone()).into_shared();
//!
//! let mut searcher = Config::default()
//!     .with_strategies(vec![Strategy::Dfs])
//!     .build(&tree, &SharedRng::seeded(0), &WallClock::new().in_rc())
//!     .unwrap();
//!
//! // Births are reported before selection; deaths are reported before the
//! // leaf is collapsed out of the tree.
//! searcher.update(None, std::slice::from_ref(&initial), &[]);
//! let state = searcher.select_state();
//! assert_eq!(state.id(), StateId::new(1));
//! searcher.update(Some(&state), &[], std::slice::from_ref(&state));
//! assert!(searcher.is_empty());
//! ```

#![warn(clippy::all, clippy::cargo, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)] // Allows for better API naming

pub mod clock;
pub mod config;
pub mod constant;
pub mod data;
pub mod error;
pub mod ptree;
pub mod rng;
pub mod searcher;
pub mod state;
pub mod validity;

// Re-exports to provide the library interface.
pub use config::Config;
pub use searcher::Searcher;
