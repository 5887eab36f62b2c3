//! This module contains the shared random number generator handle that all
//! stochastic searchers draw from.
//!
//! Scheduling is single-threaded, so one underlying generator can be shared
//! by any number of searchers through cheap clones of the handle. Every
//! stochastic decision in the library flows through this type, which makes a
//! whole searcher stack reproducible from a single seed.

use std::{cell::RefCell, rc::Rc};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A cloneable handle to a seedable random number generator.
///
/// Clones share the underlying generator, so draws made through any handle
/// advance the one stream. The handle is intentionally not `Send`: sharing a
/// generator across threads is not part of the scheduling model.
#[derive(Clone, Debug)]
pub struct SharedRng {
    inner: Rc<RefCell<ChaCha8Rng>>,
}

impl SharedRng {
    /// Constructs a generator from a fixed `seed`, for reproducible runs.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        let inner = Rc::new(RefCell::new(ChaCha8Rng::seed_from_u64(seed)));
        Self { inner }
    }

    /// Constructs a generator seeded from operating-system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        let inner = Rc::new(RefCell::new(ChaCha8Rng::from_os_rng()));
        Self { inner }
    }

    /// Draws a uniform 32-bit integer.
    #[must_use]
    pub fn next_u32(&self) -> u32 {
        self.inner.borrow_mut().random()
    }

    /// Draws a uniform double in `[0, 1)`.
    #[must_use]
    pub fn next_f64(&self) -> f64 {
        self.inner.borrow_mut().random()
    }

    /// Draws a uniform index below `bound`.
    ///
    /// # Panics
    ///
    /// Panics if `bound` is zero. This is a programmer bug.
    #[must_use]
    pub fn below(&self, bound: usize) -> usize {
        assert!(bound > 0, "Cannot draw an index below zero");
        self.inner.borrow_mut().random_range(0..bound)
    }
}
