//! Predicate over pairs of symbols, used to label transducer transitions.
use crate::predicate::Predicate;

/// A transducer label relates an input symbol to an output symbol. `input`/`output` are ordinary
/// predicates over `P`, and `identity` marks the compact "copy the input symbol unchanged" case
/// (written `@p/@p` in the textual format) without having to enumerate every `(a, a)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransducerPredicate<P> {
    pub input: P,
    pub output: P,
    pub identity: bool,
}

impl<P: Predicate> TransducerPredicate<P> {
    pub fn new(input: P, output: P, identity: bool) -> Self {
        TransducerPredicate {
            input,
            output,
            identity,
        }
    }

    /// Whether this label translates `a` to `b`.
    pub fn translates(&self, a: &P::Symbol, b: &P::Symbol) -> bool {
        if self.identity {
            self.input.has_symbol(a) && a == b
        } else {
            self.input.has_symbol(a) && self.output.has_symbol(b)
        }
    }

    /// Picks some output symbol this label would translate `a` to, given a concrete alphabet to
    /// search for a witness when the label is not an identity (the output predicate only tells us
    /// which symbols satisfy it, not a canonical representative).
    pub fn translate(&self, a: &P::Symbol, alphabet: &[P::Symbol]) -> Option<P::Symbol> {
        if !self.input.has_symbol(a) {
            return None;
        }
        if self.identity {
            return Some(a.clone());
        }
        alphabet.iter().find(|s| self.output.has_symbol(s)).cloned()
    }

    /// Combines a transition of `self` with a following transition of `other` during composition,
    /// assuming the caller already checked `self.output.and(&other.input).is_satisfiable()`.
    ///
    /// The algebra this is grounded on computes the identity flag as `self.identity ||
    /// result.identity`, where `result` is a freshly constructed (and therefore always
    /// non-identity) label — so the check degenerates to `self.identity` and silently drops
    /// `other`'s identity-ness. This keeps the combined label non-identity whenever either side
    /// insists on it, `self.identity || other.identity`.
    pub fn combine(&self, other: &Self) -> Self {
        let identity = self.identity || other.identity;
        if identity {
            let identic = self.input.and(&other.output);
            TransducerPredicate {
                input: identic.clone(),
                output: identic,
                identity: true,
            }
        } else {
            TransducerPredicate {
                input: self.input.clone(),
                output: other.output.clone(),
                identity: false,
            }
        }
    }
}

impl<P: Predicate> Predicate for TransducerPredicate<P> {
    type Symbol = (P::Symbol, P::Symbol);

    fn none() -> Self {
        TransducerPredicate {
            input: P::none(),
            output: P::none(),
            identity: false,
        }
    }

    fn universal() -> Self {
        TransducerPredicate {
            input: P::universal(),
            output: P::universal(),
            identity: false,
        }
    }

    fn negate(&self) -> Self {
        TransducerPredicate {
            input: self.input.negate(),
            output: self.output.negate(),
            identity: self.identity,
        }
    }

    fn and(&self, other: &Self) -> Self {
        let identity = self.identity || other.identity;
        if identity {
            let identic_input = self.input.and(&other.input);
            let identic_output = self.output.and(&other.output);
            let identic = identic_input.and(&identic_output);
            TransducerPredicate {
                input: identic.clone(),
                output: identic,
                identity: true,
            }
        } else {
            TransducerPredicate {
                input: self.input.and(&other.input),
                output: self.output.and(&other.output),
                identity: false,
            }
        }
    }

    fn or(&self, other: &Self) -> Self {
        let identity = self.identity || other.identity;
        if identity {
            let identic_input = self.input.or(&other.input);
            let identic_output = self.output.or(&other.output);
            let identic = identic_input.and(&identic_output);
            TransducerPredicate {
                input: identic.clone(),
                output: identic,
                identity: true,
            }
        } else {
            TransducerPredicate {
                input: self.input.or(&other.input),
                output: self.output.or(&other.output),
                identity: false,
            }
        }
    }

    fn is_subset_of(&self, other: &Self) -> bool {
        if self.identity != other.identity && other.identity && self != other {
            return false;
        }
        self.input.is_subset_of(&other.input) && self.output.is_subset_of(&other.output)
    }

    fn is_satisfiable(&self) -> bool {
        self.input.is_satisfiable() && self.output.is_satisfiable()
    }

    fn has_symbol(&self, symbol: &Self::Symbol) -> bool {
        let (a, b) = symbol;
        self.translates(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::LetterPredicate;
    use std::rc::Rc;

    fn sym(s: &str) -> Rc<str> {
        Rc::from(s)
    }

    #[test]
    fn identity_label_only_translates_equal_symbols() {
        let label = TransducerPredicate::new(LetterPredicate::Any, LetterPredicate::Any, true);
        assert!(label.translates(&sym("a"), &sym("a")));
        assert!(!label.translates(&sym("a"), &sym("b")));
    }

    #[test]
    fn non_identity_label_translates_via_input_output() {
        let label = TransducerPredicate::new(
            LetterPredicate::Exactly(sym("a")),
            LetterPredicate::Exactly(sym("b")),
            false,
        );
        assert!(label.translates(&sym("a"), &sym("b")));
        assert!(!label.translates(&sym("a"), &sym("a")));
    }

    #[test]
    fn combine_keeps_identity_if_either_side_does() {
        let identity = TransducerPredicate::new(LetterPredicate::Any, LetterPredicate::Any, true);
        let plain = TransducerPredicate::new(
            LetterPredicate::Exactly(sym("a")),
            LetterPredicate::Exactly(sym("a")),
            false,
        );
        let combined = plain.combine(&identity);
        assert!(combined.identity);
    }
}
