//! Shared error and decision-result types. Parse errors stay local to each module (see
//! [crate::dfa::parse::DfaParseError], [crate::nfa::parse::NfaParseError],
//! [crate::parser::text]) following the teacher's per-module convention; this module only holds
//! the types shared across construction and decision procedures.
use thiserror::Error;

/// Raised when an operation's precondition on its input isn't met: an sdBA-only construction
/// applied to an automaton that isn't semi-deterministic, composing two transducers whose
/// alphabets don't line up, or a worklist growing past a caller-supplied [Bound].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("automaton is not semi-deterministic")]
    NotSemiDeterministic,
    #[error("automaton is not deterministic")]
    NotDeterministic,
    #[error("transducer output and the other transducer's input share no symbol")]
    DisjointComposition,
    #[error("construction exceeded its state bound of {limit}")]
    BoundExceeded { limit: usize },
}

/// A language witness: a finite prefix paired with whether the decision procedure also needs a
/// lasso (an eventually-repeating suffix) to witness an ω-word, as it does for Büchi emptiness and
/// inclusion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Witness<S> {
    pub prefix: Vec<S>,
    pub cycle: Option<Vec<S>>,
}

impl<S> Witness<S> {
    pub fn finite(prefix: Vec<S>) -> Self {
        Witness {
            prefix,
            cycle: None,
        }
    }

    pub fn lasso(prefix: Vec<S>, cycle: Vec<S>) -> Self {
        Witness {
            prefix,
            cycle: Some(cycle),
        }
    }
}

/// The result of a decision procedure (emptiness, inclusion, equivalence, universality): a
/// boolean verdict plus, when available, a witness for it. Kept as a dedicated struct rather than
/// a bare `bool` so "the answer is unknown" has no representable variant — every decision
/// procedure in this crate terminates with a definite holds/does-not-hold answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision<S> {
    pub holds: bool,
    pub witness: Option<Witness<S>>,
}

impl<S> Decision<S> {
    pub fn holds() -> Self {
        Decision {
            holds: true,
            witness: None,
        }
    }

    pub fn fails(witness: Witness<S>) -> Self {
        Decision {
            holds: false,
            witness: Some(witness),
        }
    }
}

/// A state-count cap threaded through constructions whose worklist can in principle blow up
/// (determinization, NCSB, antichain inclusion). `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bound {
    pub max_states: Option<usize>,
}

impl Bound {
    pub const UNBOUNDED: Bound = Bound { max_states: None };

    pub fn new(max_states: usize) -> Self {
        Bound {
            max_states: Some(max_states),
        }
    }

    /// Checks `count` against the bound, returning the precondition error if it's exceeded.
    pub fn check(&self, count: usize) -> Result<(), PreconditionError> {
        match self.max_states {
            Some(limit) if count > limit => Err(PreconditionError::BoundExceeded { limit }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_check_rejects_past_limit() {
        let bound = Bound::new(3);
        assert!(bound.check(3).is_ok());
        assert_eq!(
            bound.check(4),
            Err(PreconditionError::BoundExceeded { limit: 3 })
        );
    }

    #[test]
    fn unbounded_never_rejects() {
        assert!(Bound::UNBOUNDED.check(usize::MAX).is_ok());
    }
}
