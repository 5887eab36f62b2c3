//! This module contains constants that are needed throughout the codebase.

use std::time::Duration;

/// The number of random-path searchers that can walk one process tree at the
/// same time.
///
/// Each registered searcher is handed one bit in the per-edge ownership tag,
/// so the limit is bounded above by the tag width. Three slots match the
/// widest stack the engine composes over a single tree.
pub const RANDOM_PATH_SEARCHER_LIMIT: u8 = 3;

/// The smoothing term, in seconds, added to the accumulated solver time when
/// computing query-cost weights.
///
/// Keeps the weight of a state that has not yet issued a solver query finite
/// and bounds the weight ratio between cheap and expensive states.
pub const QUERY_COST_SMOOTHING_SECONDS: f64 = 0.1;

/// The weight assigned to a state with no reachable uncovered code when
/// selection is driven by the minimum distance to uncovered code.
///
/// Such states must remain selectable, so the weight is small but positive.
pub const UNREACHABLE_DISTANCE_WEIGHT: f64 = 1e-9;

/// The per-state time budget that the iterative-deepening wrapper starts
/// with. The budget doubles every time the active pool drains.
pub const INITIAL_DEEPENING_BUDGET: Duration = Duration::from_secs(1);

/// The factor by which an observed batching time slice must overshoot the
/// configured time budget before the budget is stretched to match it.
pub const BATCH_OVERSHOOT_TOLERANCE: f64 = 1.1;
