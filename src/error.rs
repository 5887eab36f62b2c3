//! This module contains the error type for the scheduler's interface.
//!
//! The fallible surface of this library is deliberately narrow: almost every
//! misuse of a searcher is a programming-contract violation and panics with a
//! diagnostic rather than returning an error. The variants here cover the few
//! conditions a caller can meaningfully handle, all of which occur while
//! composing a searcher stack rather than while scheduling.

use thiserror::Error;

use crate::constant::RANDOM_PATH_SEARCHER_LIMIT;

/// The result type for the fallible parts of the library interface.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing a searcher stack.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// More random-path searchers were requested than the process tree has
    /// ownership-tag slots for.
    #[error(
        "A process tree supports at most {} random-path searchers, but another one was requested",
        RANDOM_PATH_SEARCHER_LIMIT
    )]
    RandomPathSlotsExhausted,

    /// A searcher stack was requested from a configuration that names no core
    /// strategy at all.
    #[error("Cannot build a searcher stack from an empty strategy list")]
    NoStrategies,
}
