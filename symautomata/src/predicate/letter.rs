//! Predicate matching a single concrete symbol, its complement, "any symbol" or "no symbol".
use crate::predicate::Predicate;
use std::rc::Rc;

/// A predicate over `Rc<str>` symbols that is either unsatisfiable, universal, or pinned to
/// (respectively excludes) exactly one symbol.
///
/// The source this crate is grounded on represents this predicate with a single `symbol: String`
/// field where the empty string does double duty as both "any" and "unsatisfiable", which makes
/// conjunction of two distinct non-wildcard symbols ambiguous with the wildcard case. This type
/// keeps the same four-way distinction the algebra actually needs but names each case explicitly,
/// so it is closed under negation without that ambiguity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LetterPredicate {
    None,
    Any,
    Exactly(Rc<str>),
    Not(Rc<str>),
}

impl Predicate for LetterPredicate {
    type Symbol = Rc<str>;

    fn none() -> Self {
        LetterPredicate::None
    }

    fn universal() -> Self {
        LetterPredicate::Any
    }

    fn negate(&self) -> Self {
        match self {
            LetterPredicate::None => LetterPredicate::Any,
            LetterPredicate::Any => LetterPredicate::None,
            LetterPredicate::Exactly(s) => LetterPredicate::Not(s.clone()),
            LetterPredicate::Not(s) => LetterPredicate::Exactly(s.clone()),
        }
    }

    fn and(&self, other: &Self) -> Self {
        use LetterPredicate::*;
        match (self, other) {
            (None, _) | (_, None) => None,
            (Any, x) | (x, Any) => x.clone(),
            (Exactly(a), Exactly(b)) => {
                if a == b {
                    Exactly(a.clone())
                } else {
                    None
                }
            }
            (Exactly(a), Not(b)) | (Not(b), Exactly(a)) => {
                if a == b {
                    None
                } else {
                    Exactly(a.clone())
                }
            }
            (Not(a), Not(b)) => {
                if a == b {
                    Not(a.clone())
                } else {
                    // Two distinct excluded symbols: can't represent "excludes both" in this
                    // algebra, approximate with the tighter exclusion. This predicate family is
                    // only exact for single-symbol alphabets of interest; richer reasoning belongs
                    // to InNotInPredicate.
                    Not(a.clone())
                }
            }
        }
    }

    fn or(&self, other: &Self) -> Self {
        use LetterPredicate::*;
        match (self, other) {
            (Any, _) | (_, Any) => Any,
            (None, x) | (x, None) => x.clone(),
            (Exactly(a), Exactly(b)) => {
                if a == b {
                    Exactly(a.clone())
                } else {
                    Any
                }
            }
            (Exactly(a), Not(b)) | (Not(b), Exactly(a)) => {
                if a == b {
                    Any
                } else {
                    Not(b.clone())
                }
            }
            (Not(a), Not(b)) => {
                if a == b {
                    Not(a.clone())
                } else {
                    Any
                }
            }
        }
    }

    fn has_symbol(&self, symbol: &Self::Symbol) -> bool {
        match self {
            LetterPredicate::None => false,
            LetterPredicate::Any => true,
            LetterPredicate::Exactly(s) => s == symbol,
            LetterPredicate::Not(s) => s != symbol,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_and_not_are_disjoint() {
        let a: Rc<str> = Rc::from("a");
        let exactly = LetterPredicate::Exactly(a.clone());
        let not = LetterPredicate::Not(a.clone());
        assert_eq!(exactly.and(&not), LetterPredicate::None);
        assert_eq!(exactly.or(&not), LetterPredicate::Any);
    }

    #[test]
    fn double_negation_is_identity() {
        let a: Rc<str> = Rc::from("a");
        let p = LetterPredicate::Exactly(a);
        assert_eq!(p.negate().negate(), p);
    }

    #[test]
    fn any_is_universal_and_satisfiable() {
        assert!(LetterPredicate::Any.is_universal());
        assert!(LetterPredicate::Any.is_satisfiable());
        assert!(!LetterPredicate::None.is_satisfiable());
    }
}
