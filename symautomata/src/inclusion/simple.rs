//! Naive inclusion: `L(a) ⊆ L(b)` iff `L(a) ∩ L(¬b)` is empty, built as one explicit product
//! automaton. Simplest strategy, and the most expensive: the whole product is materialized even
//! when a counterexample is found on the first transition.
use crate::core::GuardedAutomaton;
use crate::error::{Decision, Witness};
use crate::inclusion::shortest_accepting_word;
use crate::predicate::Predicate;
use crate::sfa::Sfa;

/// Precondition: `alphabet` is rich enough to contain a witness symbol for every guard the
/// automata can produce (see [crate::inclusion]).
pub fn is_included_simple<P: Predicate>(
    a: &Sfa<P>,
    b: &Sfa<P>,
    alphabet: &[P::Symbol],
) -> Decision<P::Symbol> {
    let a_det = if a.is_deterministic() {
        a.clone()
    } else {
        a.determinize()
    };
    let not_b = b.complement();

    let product = GuardedAutomaton::product_construction(a_det.automaton(), not_b.automaton(), |x, y| x && y);

    if product.is_empty() {
        return Decision::holds();
    }

    match shortest_accepting_word(&product, alphabet) {
        Some(word) => Decision::fails(Witness::finite(word)),
        None => Decision::fails(Witness::finite(Vec::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GuardedState;
    use crate::predicate::{Guard, InNotInPredicate};
    use std::rc::Rc;

    fn sym(s: &str) -> Rc<str> {
        Rc::from(s)
    }

    fn only_a() -> Sfa<InNotInPredicate> {
        Sfa::new(GuardedAutomaton::new(
            vec![
                GuardedState {
                    name: sym("s0"),
                    accepting: false,
                    transitions: vec![(
                        Guard::Cond(InNotInPredicate::in_set([sym("a")])),
                        1,
                    )],
                },
                GuardedState {
                    name: sym("s1"),
                    accepting: true,
                    transitions: vec![],
                },
            ],
            0,
        ))
    }

    fn a_or_b() -> Sfa<InNotInPredicate> {
        Sfa::new(GuardedAutomaton::new(
            vec![
                GuardedState {
                    name: sym("s0"),
                    accepting: false,
                    transitions: vec![(
                        Guard::Cond(InNotInPredicate::in_set([sym("a"), sym("b")])),
                        1,
                    )],
                },
                GuardedState {
                    name: sym("s1"),
                    accepting: true,
                    transitions: vec![],
                },
            ],
            0,
        ))
    }

    #[test]
    fn narrower_language_is_included_in_broader_one() {
        let alphabet = [sym("a"), sym("b")];
        assert!(is_included_simple(&only_a(), &a_or_b(), &alphabet).holds);
    }

    #[test]
    fn broader_language_is_not_included_in_narrower_one() {
        let alphabet = [sym("a"), sym("b")];
        let decision = is_included_simple(&a_or_b(), &only_a(), &alphabet);
        assert!(!decision.holds);
        assert!(decision.witness.is_some());
    }
}
