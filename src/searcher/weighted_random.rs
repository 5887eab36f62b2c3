//! This module contains the weighted random searcher and its weight
//! policies.

use crate::{
    constant::{QUERY_COST_SMOOTHING_SECONDS, UNREACHABLE_DISTANCE_WEIGHT},
    data::discrete_pdf::DiscretePdf,
    rng::SharedRng,
    searcher::Searcher,
    state::{StateId, StateRef},
};

/// The heuristic that turns a state's attributes into a selection weight.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WeightPolicy {
    /// Halve the weight per fork: `2^-depth`.
    Depth,

    /// Constant weight, i.e. uniform over the population.
    RandomPath,

    /// Prefer states that have spent little solver time.
    QueryCost,

    /// Prefer states that have retired few instructions, relative to the
    /// population maximum.
    InstCount,

    /// Like [`WeightPolicy::InstCount`], over the current call path only.
    CallPathInstCount,

    /// Prefer states statically close to uncovered code.
    MinDistToUncovered,

    /// Prefer states that recently covered new code; fall back to the
    /// distance heuristic, discounted for long-running states.
    CoveringNew,
}

impl WeightPolicy {
    /// Checks whether the weight inputs of this policy drift while a state
    /// executes, requiring the current state's weight to be refreshed on
    /// every update.
    ///
    /// Depth only changes at forks (where the fork is re-inserted anyway),
    /// the uniform weight never changes, and the static distance is
    /// recomputed by the engine at coverage events, not per instruction.
    #[must_use]
    pub fn refreshes_weights(self) -> bool {
        match self {
            Self::QueryCost | Self::InstCount | Self::CallPathInstCount | Self::CoveringNew => true,
            Self::Depth | Self::RandomPath | Self::MinDistToUncovered => false,
        }
    }

    /// Gets the short label of this policy for searcher identification.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Depth => "Depth",
            Self::RandomPath => "RandomPath",
            Self::QueryCost => "QueryCost",
            Self::InstCount => "InstCount",
            Self::CallPathInstCount => "CallPathInstCount",
            Self::MinDistToUncovered => "MinDistToUncovered",
            Self::CoveringNew => "CoveringNew",
        }
    }
}

/// A searcher that draws states with probability proportional to a
/// policy-defined weight, backed by a [`DiscretePdf`] keyed by state id so
/// that draws are reproducible across runs.
#[derive(Debug)]
pub struct WeightedRandomSearcher {
    states: DiscretePdf<StateId, StateRef>,
    rng: SharedRng,
    policy: WeightPolicy,

    /// Whether the current state's weight is recomputed on every update; see
    /// [`WeightPolicy::refreshes_weights`].
    refresh_current: bool,

    /// The largest total instruction count observed in the population, used
    /// to normalise the instruction-count weights.
    max_instruction_count: u64,

    /// The largest call-path instruction count observed in the population.
    max_call_path_instruction_count: u64,
}

impl WeightedRandomSearcher {
    /// Constructs a new, empty, weighted random searcher applying `policy`
    /// and drawing from `rng`.
    #[must_use]
    pub fn new(policy: WeightPolicy, rng: SharedRng) -> Self {
        Self {
            states: DiscretePdf::new(),
            rng,
            policy,
            refresh_current: policy.refreshes_weights(),
            max_instruction_count: 0,
            max_call_path_instruction_count: 0,
        }
    }

    /// Computes the weight of `state` under the configured policy.
    ///
    /// The result is clamped to stay positive: selection must remain possible
    /// for every scheduled state, however unattractive.
    fn weight(&self, state: &StateRef) -> f64 {
        let weight = match self.policy {
            WeightPolicy::Depth => 0.5f64.powi(depth_exponent(state.depth())),
            WeightPolicy::RandomPath => 1.0,
            WeightPolicy::QueryCost => {
                1.0 / (state.query_cost().as_secs_f64() + QUERY_COST_SMOOTHING_SECONDS)
            }
            WeightPolicy::InstCount => {
                inverse_count_weight(self.max_instruction_count, state.instruction_count())
            }
            WeightPolicy::CallPathInstCount => inverse_count_weight(
                self.max_call_path_instruction_count,
                state.call_path_instruction_count(),
            ),
            WeightPolicy::MinDistToUncovered => distance_weight(state),
            WeightPolicy::CoveringNew => {
                if state.covers_new() {
                    1.0
                } else {
                    distance_weight(state) * inverse_count_weight(0, state.instruction_count())
                }
            }
        };
        weight.max(f64::MIN_POSITIVE)
    }

    /// Folds the counters of `state` into the normalisation maxima.
    fn note_maxima(&mut self, state: &StateRef) {
        self.max_instruction_count = self.max_instruction_count.max(state.instruction_count());
        self.max_call_path_instruction_count = self
            .max_call_path_instruction_count
            .max(state.call_path_instruction_count());
    }
}

impl Searcher for WeightedRandomSearcher {
    fn select_state(&mut self) -> StateRef {
        self.states
            .sample(self.rng.next_f64())
            .expect("Cannot select a state from an empty searcher")
            .clone()
    }

    fn update(&mut self, current: Option<&StateRef>, added: &[StateRef], removed: &[StateRef]) {
        if self.refresh_current {
            if let Some(current) = current {
                if !removed.contains(current) {
                    self.note_maxima(current);
                    let weight = self.weight(current);
                    let present = self.states.set_weight(&current.id(), weight);
                    assert!(present, "Current state is not scheduled here");
                }
            }
        }

        for state in added {
            self.note_maxima(state);
            let weight = self.weight(state);
            self.states.insert(state.id(), state.clone(), weight);
        }

        for state in removed {
            let present = self.states.remove(&state.id());
            assert!(present.is_some(), "Removed a state that was never added");
        }
    }

    fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    fn name(&self) -> String {
        format!("WeightedRandomSearcher::{}", self.policy.label())
    }
}

/// Computes `sqrt((max + 1) / (count + 1))`: the inverse-square-root
/// instruction-count preference, normalised against the population maximum.
///
/// The normalisation is a common factor and therefore cancels in proportional
/// sampling; it only keeps the stored weights in a readable range.
fn inverse_count_weight(max: u64, count: u64) -> f64 {
    ((max as f64 + 1.0) / (count as f64 + 1.0)).sqrt()
}

/// Computes `1 / (1 + distance^2)`, the preference for states statically
/// close to uncovered code. States that cannot reach uncovered code at all
/// keep a very small positive weight.
fn distance_weight(state: &StateRef) -> f64 {
    match state.min_dist_to_uncovered() {
        Some(distance) => {
            let distance = distance as f64;
            1.0 / (1.0 + distance * distance)
        }
        None => UNREACHABLE_DISTANCE_WEIGHT,
    }
}

/// Converts a fork depth into an exponent for the halving weight, saturating
/// rather than wrapping for absurdly deep states.
fn depth_exponent(depth: u32) -> i32 {
    i32::try_from(depth).unwrap_or(i32::MAX)
}
