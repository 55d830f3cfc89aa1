//! Pair-reachability inclusion, grounded on the original's `is_inclusion`: determinize and
//! complete both sides, then explore reachable state pairs `(p, q)` directly — a bad pair is one
//! where `p` is accepting and `q` is not. Unlike the original, stepping doesn't enumerate a
//! concrete alphabet: two transitions are compatible whenever their guards' conjunction is
//! satisfiable, which is exact for a predicate algebra and avoids needing the alphabet up front
//! (it's consulted only afterwards, to render a counterexample word).
use crate::error::{Decision, Witness};
use crate::inclusion::pick_symbol;
use crate::predicate::{Guard, Predicate};
use crate::sfa::Sfa;
use std::collections::{HashMap, VecDeque};

/// Precondition: `alphabet` is rich enough to contain a witness symbol for every guard the
/// automata can produce (see [crate::inclusion]).
pub fn is_included_pair_reachability<P: Predicate>(
    a: &Sfa<P>,
    b: &Sfa<P>,
    alphabet: &[P::Symbol],
) -> Decision<P::Symbol> {
    let a_det = complete_deterministic(a);
    let b_det = complete_deterministic(b);

    let start = (a_det.initial_state(), b_det.initial_state());
    let mut visited = std::collections::HashSet::new();
    let mut queue = VecDeque::new();
    // parent[pair] = (predecessor pair, guard predicate that reached `pair`)
    let mut parent: HashMap<(usize, usize), ((usize, usize), P)> = HashMap::new();

    visited.insert(start);
    queue.push_back(start);

    while let Some((p, q)) = queue.pop_front() {
        let a_accepting = a_det.states()[p].accepting;
        let b_accepting = b_det.states()[q].accepting;
        if a_accepting && !b_accepting {
            return Decision::fails(Witness::finite(reconstruct(&parent, (p, q), alphabet)));
        }

        for (guard_a, target_a) in &a_det.states()[p].transitions {
            let Guard::Cond(pred_a) = guard_a else {
                continue;
            };
            for (guard_b, target_b) in &b_det.states()[q].transitions {
                let Guard::Cond(pred_b) = guard_b else {
                    continue;
                };
                let combined = pred_a.and(pred_b);
                if !combined.is_satisfiable() {
                    continue;
                }
                let next = (*target_a, *target_b);
                if visited.insert(next) {
                    parent.insert(next, ((p, q), combined));
                    queue.push_back(next);
                }
            }
        }
    }

    Decision::holds()
}

fn complete_deterministic<P: Predicate>(sfa: &Sfa<P>) -> Sfa<P> {
    if sfa.is_deterministic() {
        sfa.get_complete()
    } else {
        sfa.determinize().get_complete()
    }
}

fn reconstruct<P: Predicate>(
    parent: &HashMap<(usize, usize), ((usize, usize), P)>,
    mut pair: (usize, usize),
    alphabet: &[P::Symbol],
) -> Vec<P::Symbol> {
    let mut steps = Vec::new();
    while let Some((prev, guard)) = parent.get(&pair) {
        steps.push(guard.clone());
        pair = *prev;
    }
    steps.reverse();
    steps
        .into_iter()
        .filter_map(|guard| pick_symbol(&guard, alphabet))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GuardedAutomaton, GuardedState};
    use crate::predicate::InNotInPredicate;
    use std::rc::Rc;

    fn sym(s: &str) -> Rc<str> {
        Rc::from(s)
    }

    fn accepts_a_star() -> Sfa<InNotInPredicate> {
        Sfa::new(GuardedAutomaton::new(
            vec![GuardedState {
                name: sym("s0"),
                accepting: true,
                transitions: vec![(
                    Guard::Cond(InNotInPredicate::in_set([sym("a")])),
                    0,
                )],
            }],
            0,
        ))
    }

    fn accepts_a_star_b_star() -> Sfa<InNotInPredicate> {
        Sfa::new(GuardedAutomaton::new(
            vec![
                GuardedState {
                    name: sym("s0"),
                    accepting: true,
                    transitions: vec![
                        (Guard::Cond(InNotInPredicate::in_set([sym("a")])), 0),
                        (Guard::Cond(InNotInPredicate::in_set([sym("b")])), 1),
                    ],
                },
                GuardedState {
                    name: sym("s1"),
                    accepting: true,
                    transitions: vec![(Guard::Cond(InNotInPredicate::in_set([sym("b")])), 1)],
                },
            ],
            0,
        ))
    }

    #[test]
    fn a_star_is_included_in_a_star_b_star() {
        let alphabet = [sym("a"), sym("b")];
        let decision = is_included_pair_reachability(&accepts_a_star(), &accepts_a_star_b_star(), &alphabet);
        assert!(decision.holds);
    }

    #[test]
    fn a_star_b_star_is_not_included_in_a_star() {
        let alphabet = [sym("a"), sym("b")];
        let decision = is_included_pair_reachability(&accepts_a_star_b_star(), &accepts_a_star(), &alphabet);
        assert!(!decision.holds);
        assert!(decision.witness.is_some());
    }
}
