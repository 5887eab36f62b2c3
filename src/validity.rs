//! This module contains the classification of query outcomes produced by an
//! incomplete solver.
//!
//! A complete solver answers a validity query with one of three outcomes. An
//! incomplete solver may time out or give up on either the query or its
//! negation, which refines the classification into six partial outcomes. The
//! scheduler's query-cost accounting sits right next to this boundary, so the
//! conversion and combination rules live here.

use std::fmt;

/// The outcome of a validity query against a complete solver.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Validity {
    /// The queried expression holds in every model.
    True,

    /// The negation of the queried expression holds in every model.
    False,

    /// Both the expression and its negation are satisfiable.
    Unknown,
}

/// The raw shape of one solver response, as seen before classification.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SolverResponse {
    /// The solver proved the query valid.
    Valid,

    /// The solver found a counterexample.
    Invalid,

    /// The solver gave up without an answer.
    Unknown,
}

/// The outcome of a validity query against an incomplete solver.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PartialValidity {
    /// The expression was proved to hold in every model.
    MustBeTrue,

    /// The negation was proved to hold in every model.
    MustBeFalse,

    /// The expression is satisfiable; its negation was not settled.
    MayBeTrue,

    /// The negation is satisfiable; the expression was not settled.
    MayBeFalse,

    /// Both the expression and its negation are satisfiable.
    TrueOrFalse,

    /// Neither direction was settled.
    None,
}

impl PartialValidity {
    /// Converts this partial outcome into a complete one.
    ///
    /// # Panics
    ///
    /// Panics on [`PartialValidity::MayBeTrue`],
    /// [`PartialValidity::MayBeFalse`] and [`PartialValidity::None`]: these
    /// carry strictly less information than any complete outcome, so the
    /// conversion would fabricate certainty. Asking for it is a programmer
    /// bug.
    #[must_use]
    pub fn to_validity(self) -> Validity {
        match self {
            Self::MustBeTrue => Validity::True,
            Self::MustBeFalse => Validity::False,
            Self::TrueOrFalse => Validity::Unknown,
            Self::MayBeTrue | Self::MayBeFalse | Self::None => {
                panic!("Partial validity {self} is not convertible to a validity")
            }
        }
    }

    /// Gets the partial validity of the negated expression.
    #[must_use]
    pub fn negated(self) -> Self {
        match self {
            Self::MustBeTrue => Self::MustBeFalse,
            Self::MustBeFalse => Self::MustBeTrue,
            Self::MayBeTrue => Self::MayBeFalse,
            Self::MayBeFalse => Self::MayBeTrue,
            Self::TrueOrFalse => Self::TrueOrFalse,
            Self::None => Self::None,
        }
    }
}

impl From<Validity> for PartialValidity {
    fn from(value: Validity) -> Self {
        match value {
            Validity::True => Self::MustBeTrue,
            Validity::False => Self::MustBeFalse,
            Validity::Unknown => Self::TrueOrFalse,
        }
    }
}

impl fmt::Display for PartialValidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::MustBeTrue => "MustBeTrue",
            Self::MustBeFalse => "MustBeFalse",
            Self::MayBeTrue => "MayBeTrue",
            Self::MayBeFalse => "MayBeFalse",
            Self::TrueOrFalse => "TrueOrFalse",
            Self::None => "None",
        };
        write!(f, "{text}")
    }
}

/// Combines the solver's responses to a query and to its negation into a
/// partial validity.
///
/// A valid response to one direction implies an invalid (counterexampled)
/// response to the other whenever the solver answered it at all, so three of
/// the nine combinations cannot be produced by a sound solver.
///
/// # Panics
///
/// Panics on the unreachable combinations — both directions valid, or one
/// valid while the other went unanswered. Reaching them means the solver
/// misbehaved, which the engine does not try to recover from.
#[must_use]
pub fn evaluate(query: SolverResponse, negated_query: SolverResponse) -> PartialValidity {
    use SolverResponse::{Invalid, Unknown, Valid};

    match (query, negated_query) {
        (Valid, Invalid) => PartialValidity::MustBeTrue,
        (Invalid, Valid) => PartialValidity::MustBeFalse,
        (Invalid, Invalid) => PartialValidity::TrueOrFalse,
        (Invalid, Unknown) => PartialValidity::MayBeFalse,
        (Unknown, Invalid) => PartialValidity::MayBeTrue,
        (Unknown, Unknown) => PartialValidity::None,
        (Valid, Valid) | (Valid, Unknown) | (Unknown, Valid) => {
            panic!("Unreachable solver response combination ({query:?}, {negated_query:?})")
        }
    }
}
