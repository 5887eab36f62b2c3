//! This module contains the configuration from which a composed searcher
//! stack is built.
//!
//! A configuration names one or more core strategies (more than one means
//! they are interleaved round-robin) and the orthogonal wrapper flags. It is
//! plain data — serialisable so an engine can embed it in its run
//! configuration — and turns into a live searcher through [`Config::build`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    clock::DynClock,
    error::{Error, Result},
    ptree::SharedPTree,
    rng::SharedRng,
    searcher::{
        BatchingSearcher,
        BfsSearcher,
        DfsSearcher,
        InterleavedSearcher,
        IterativeDeepeningTimeSearcher,
        MergingSearcher,
        RandomPathSearcher,
        RandomSearcher,
        Searcher,
        WeightPolicy,
        WeightedRandomSearcher,
    },
};

/// The core selection strategies an engine can ask for.
///
/// The `Nurs` family (non-uniform random search) covers the weighted random
/// searcher under its different weight policies.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Strategy {
    #[serde(rename = "dfs")]
    Dfs,
    #[serde(rename = "bfs")]
    Bfs,
    #[serde(rename = "random-state")]
    RandomState,
    #[serde(rename = "random-path")]
    RandomPath,
    #[serde(rename = "nurs:covnew")]
    NursCovNew,
    #[serde(rename = "nurs:md2u")]
    NursMd2u,
    #[serde(rename = "nurs:depth")]
    NursDepth,
    #[serde(rename = "nurs:rp")]
    NursRp,
    #[serde(rename = "nurs:icnt")]
    NursICnt,
    #[serde(rename = "nurs:cpicnt")]
    NursCpICnt,
    #[serde(rename = "nurs:qc")]
    NursQc,
}

impl Strategy {
    /// Gets the weight policy behind this strategy, if it is one of the
    /// weighted ones.
    #[must_use]
    pub fn weight_policy(self) -> Option<WeightPolicy> {
        match self {
            Self::NursCovNew => Some(WeightPolicy::CoveringNew),
            Self::NursMd2u => Some(WeightPolicy::MinDistToUncovered),
            Self::NursDepth => Some(WeightPolicy::Depth),
            Self::NursRp => Some(WeightPolicy::RandomPath),
            Self::NursICnt => Some(WeightPolicy::InstCount),
            Self::NursCpICnt => Some(WeightPolicy::CallPathInstCount),
            Self::NursQc => Some(WeightPolicy::QueryCost),
            Self::Dfs | Self::Bfs | Self::RandomState | Self::RandomPath => None,
        }
    }
}

/// The budgets handed to the batching wrapper. A zero budget disables that
/// dimension.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct BatchingBudgets {
    /// The wall-time slice granted per selected state.
    pub time_budget: Duration,

    /// The number of work units granted per selected state.
    pub instruction_budget: u64,
}

/// How the merging wrapper treats groups that take long to complete.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    /// Merges complete only when scheduling happens to bring every group
    /// member to the close-merge.
    Complete,

    /// Selection actively pushes merge groups forward and abandons groups
    /// that wait too long.
    Incomplete,
}

/// The configuration of a searcher stack.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Config {
    /// The core strategies. A single entry is used directly; several entries
    /// are interleaved round-robin over the same population.
    pub strategies: Vec<Strategy>,

    /// Batching budgets, when the batching wrapper is wanted.
    pub batching: Option<BatchingBudgets>,

    /// Whether states that exceed a per-selection time budget should be
    /// paused and revisited with doubled patience.
    pub iterative_deepening: bool,

    /// Merge coordination, when the merging wrapper is wanted.
    pub merging: Option<MergeMode>,
}

impl Config {
    /// Sets the core strategies.
    #[must_use]
    pub fn with_strategies(mut self, strategies: Vec<Strategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Enables the batching wrapper with the provided budgets.
    #[must_use]
    pub fn with_batching(mut self, time_budget: Duration, instruction_budget: u64) -> Self {
        self.batching = Some(BatchingBudgets {
            time_budget,
            instruction_budget,
        });
        self
    }

    /// Enables or disables the iterative-deepening wrapper.
    #[must_use]
    pub fn with_iterative_deepening(mut self, enabled: bool) -> Self {
        self.iterative_deepening = enabled;
        self
    }

    /// Enables the merging wrapper in the provided mode.
    #[must_use]
    pub fn with_merging(mut self, mode: MergeMode) -> Self {
        self.merging = Some(mode);
        self
    }

    /// Builds the configured searcher stack.
    ///
    /// The wrappers nest in a fixed order, innermost first: core searchers
    /// (interleaved if several), batching, iterative deepening, merging. The
    /// tree, generator, and clock handles are cloned into every searcher that
    /// needs them.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the strategy list is empty, or if it requests more
    /// random-path searchers than `tree` has ownership slots left.
    pub fn build(
        &self,
        tree: &SharedPTree,
        rng: &SharedRng,
        clock: &DynClock,
    ) -> Result<Box<dyn Searcher>> {
        if self.strategies.is_empty() {
            return Err(Error::NoStrategies);
        }

        let mut cores = self
            .strategies
            .iter()
            .map(|strategy| Self::core(*strategy, tree, rng))
            .collect::<Result<Vec<_>>>()?;

        let mut searcher: Box<dyn Searcher> = if cores.len() == 1 {
            cores.pop().expect("Length was just checked")
        } else {
            Box::new(InterleavedSearcher::new(cores))
        };

        if let Some(budgets) = self.batching {
            searcher = Box::new(BatchingSearcher::new(
                searcher,
                clock.clone(),
                budgets.time_budget,
                budgets.instruction_budget,
            ));
        }
        if self.iterative_deepening {
            searcher = Box::new(IterativeDeepeningTimeSearcher::new(searcher, clock.clone()));
        }
        if let Some(mode) = self.merging {
            searcher = Box::new(MergingSearcher::new(
                searcher,
                mode == MergeMode::Incomplete,
            ));
        }

        Ok(searcher)
    }

    /// Builds the base searcher for one core strategy.
    fn core(
        strategy: Strategy,
        tree: &SharedPTree,
        rng: &SharedRng,
    ) -> Result<Box<dyn Searcher>> {
        Ok(match strategy {
            Strategy::Dfs => Box::new(DfsSearcher::new()),
            Strategy::Bfs => Box::new(BfsSearcher::new()),
            Strategy::RandomState => Box::new(RandomSearcher::new(rng.clone())),
            Strategy::RandomPath => {
                Box::new(RandomPathSearcher::new(tree.clone(), rng.clone())?)
            }
            weighted => Box::new(WeightedRandomSearcher::new(
                weighted
                    .weight_policy()
                    .expect("Non-weighted strategies are matched above"),
                rng.clone(),
            )),
        })
    }
}

/// The default configuration interleaves a random-path walk with the
/// coverage-driven weighted searcher, the combination that hedges depth
/// against coverage.
impl Default for Config {
    fn default() -> Self {
        Self {
            strategies: vec![Strategy::RandomPath, Strategy::NursCovNew],
            batching: None,
            iterative_deepening: false,
            merging: None,
        }
    }
}
