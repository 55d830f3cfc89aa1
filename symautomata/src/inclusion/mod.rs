//! # Inclusion, equivalence and universality (C5)
//! Three strategies for `L(a) ⊆ L(b)`, in increasing order of sophistication:
//! [simple::is_included_simple] builds one explicit product-on-complement automaton;
//! [pair_reachability::is_included_pair_reachability] explores reachable state pairs of the two
//! completed deterministic machines directly, without materializing the product as an automaton;
//! [antichain::is_included_antichain] avoids determinizing the left-hand side altogether, tracking
//! its nondeterminism by branching and pruning the right-hand side's macrostates with simulation.
//! [is_included] is the default entry point (pair-reachability); all three are expected to agree
//! (see the crate's property tests).
pub mod antichain;
pub mod pair_reachability;
pub mod simple;

pub use antichain::{is_included_antichain, try_is_included_antichain};
pub use pair_reachability::is_included_pair_reachability;
pub use simple::is_included_simple;

use crate::core::{GuardedAutomaton, GuardedState};
use crate::error::Decision;
use crate::predicate::{Guard, Predicate};
use crate::sfa::Sfa;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

/// Default inclusion check: pair-reachability, the strategy with the best balance of simplicity
/// and avoiding an up-front product blow-up.
pub fn is_included<P: Predicate>(
    a: &Sfa<P>,
    b: &Sfa<P>,
    alphabet: &[P::Symbol],
) -> Decision<P::Symbol> {
    is_included_pair_reachability(a, b, alphabet)
}

/// `L(a) = L(b)` iff each includes the other.
pub fn is_equivalent<P: Predicate>(a: &Sfa<P>, b: &Sfa<P>, alphabet: &[P::Symbol]) -> bool {
    is_included(a, b, alphabet).holds && is_included(b, a, alphabet).holds
}

/// Whether `a` accepts every word over `alphabet`: equivalent to the automaton that accepts
/// everything being included in `a`.
pub fn is_universal<P: Predicate>(a: &Sfa<P>, alphabet: &[P::Symbol]) -> Decision<P::Symbol> {
    let accepts_everything = Sfa::new(GuardedAutomaton::new(
        vec![GuardedState {
            name: Rc::from("universal"),
            accepting: true,
            transitions: vec![(Guard::Cond(P::universal()), 0)],
        }],
        0,
    ));
    is_included(&accepts_everything, a, alphabet)
}

/// Picks a concrete symbol from `alphabet` satisfying `guard`, used to render a decision witness.
pub(crate) fn pick_symbol<P: Predicate>(guard: &P, alphabet: &[P::Symbol]) -> Option<P::Symbol> {
    alphabet.iter().find(|s| guard.has_symbol(s)).cloned()
}

/// Breadth-first search for the shortest word leading from the initial state to an accepting
/// state of an epsilon-free guarded automaton, used to render a witness for [simple].
pub(crate) fn shortest_accepting_word<P: Predicate>(
    automaton: &GuardedAutomaton<P>,
    alphabet: &[P::Symbol],
) -> Option<Vec<P::Symbol>> {
    let start = automaton.initial_state();
    if automaton.states()[start].accepting {
        return Some(Vec::new());
    }

    let mut visited = std::collections::HashSet::new();
    let mut queue = VecDeque::new();
    let mut parent: HashMap<usize, (usize, P)> = HashMap::new();

    visited.insert(start);
    queue.push_back(start);

    while let Some(state) = queue.pop_front() {
        for (guard, target) in &automaton.states()[state].transitions {
            let Guard::Cond(pred) = guard else { continue };
            if visited.insert(*target) {
                parent.insert(*target, (state, pred.clone()));
                if automaton.states()[*target].accepting {
                    let mut steps = vec![pred.clone()];
                    let mut cur = state;
                    while let Some((prev, guard)) = parent.get(&cur) {
                        steps.push(guard.clone());
                        cur = *prev;
                    }
                    steps.reverse();
                    return Some(
                        steps
                            .into_iter()
                            .filter_map(|g| pick_symbol(&g, alphabet))
                            .collect(),
                    );
                }
                queue.push_back(*target);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::InNotInPredicate;
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
                    transitions: vec![(Guard::Cond(InNotInPredicate::in_set([sym("a")])), 1)],
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
    fn automaton_is_equivalent_to_itself() {
        let alphabet = [sym("a")];
        assert!(is_equivalent(&only_a(), &only_a(), &alphabet));
    }

    #[test]
    fn single_letter_automaton_is_not_universal() {
        let alphabet = [sym("a"), sym("b")];
        assert!(!is_universal(&only_a(), &alphabet).holds);
    }
}
