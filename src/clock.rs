//! This module contains the type definitions for the monotonic time source
//! that the time-budgeted searchers sample.
//!
//! # Injected Time
//!
//! Searchers never read the system clock directly. Time budgets (batching
//! slices, iterative-deepening budgets) are measured against an injected
//! clock so that scheduling decisions stay reproducible in tests and so a
//! host engine can substitute its own notion of time. The clock is sampled
//! between searcher calls only; no searcher operation blocks on it.

use std::{cell::Cell, fmt::Debug, rc::Rc, time::Duration};

/// A dynamically dispatched [`Clock`] instance.
pub type DynClock = Rc<dyn Clock>;

/// The interface to a monotonic time source.
///
/// Implementations report the time elapsed since their own epoch. The only
/// requirement is monotonicity: consecutive calls to [`Clock::now`] must
/// yield non-decreasing values.
pub trait Clock
where
    Self: Debug,
{
    /// Gets the current time point as an offset from the clock's epoch.
    #[must_use]
    fn now(&self) -> Duration;
}

/// A [`Clock`] backed by the operating system's monotonic clock.
#[derive(Clone, Debug)]
pub struct WallClock {
    /// The instant this clock was created, serving as its epoch.
    epoch: std::time::Instant,
}

impl WallClock {
    /// Constructs a new wall clock whose epoch is the moment of the call.
    #[must_use]
    pub fn new() -> Self {
        let epoch = std::time::Instant::now();
        Self { epoch }
    }

    /// Wraps the clock into an [`Rc`].
    #[must_use]
    pub fn in_rc(self) -> DynClock {
        Rc::new(self)
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// A [`Clock`] that only moves when told to.
///
/// Intended for tests that need to drive time-budget decisions precisely.
/// Keep a second handle to the clock (it is cheaply cloneable) to advance it
/// while a searcher holds the other.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    /// The current reading of the clock.
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    /// Constructs a new manual clock reading zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get() + delta);
    }

    /// Wraps the clock into an [`Rc`].
    #[must_use]
    pub fn in_rc(self) -> DynClock {
        Rc::new(self)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}
