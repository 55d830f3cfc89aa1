//! Antichain-with-simulation inclusion: `A`'s side is tracked as a single state (branching into
//! one successor pair per nondeterministic choice, rather than determinizing `A`), `B`'s side is
//! tracked as a lazily-built subset-construction macrostate `Q`, reduced after every step by
//! discarding any member of `Q` simulated by another member. A visited pair `(p, Q)` is kept in an
//! antichain: a new pair dominated by one already explored is skipped outright, and exploring a
//! pair that dominates an already-explored one retires the dominated one.
//!
//! "Dominated" means `p` is simulated by the other pair's state in `A`, and every state of `Q` is
//! simulated by some state of the other pair's set in `B` — whatever the dominated pair could ever
//! do to witness non-inclusion, the dominating pair can do too, so it's safe to stop tracking it.
use crate::error::{Bound, Decision, PreconditionError, Witness};
use crate::inclusion::pick_symbol;
use crate::predicate::{Guard, Predicate};
use crate::sfa::refine_atoms;
use crate::sfa::simulation::simulation_preorder;
use crate::sfa::Sfa;
use std::collections::BTreeSet;
use tracing::{debug, trace};

type PairSet = BTreeSet<(usize, usize)>;
type Macro = BTreeSet<usize>;

struct Frame<S> {
    a_state: usize,
    b_states: Macro,
    path: Vec<S>,
}

/// Precondition: neither `a` nor `b` has an epsilon transition (parsed symbolic automata and
/// every construction in [crate::sfa] already produce epsilon-free machines). `alphabet` is
/// consulted only to render witness symbols for each step's atom.
pub fn is_included_antichain<P: Predicate>(
    a: &Sfa<P>,
    b: &Sfa<P>,
    alphabet: &[P::Symbol],
) -> Decision<P::Symbol> {
    try_is_included_antichain(a, b, alphabet, Bound::UNBOUNDED)
        .expect("unbounded construction cannot hit a state bound")
}

/// Bounded variant of [is_included_antichain]; fails with
/// [PreconditionError::BoundExceeded] once the antichain would grow past `bound`.
pub fn try_is_included_antichain<P: Predicate>(
    a: &Sfa<P>,
    b: &Sfa<P>,
    alphabet: &[P::Symbol],
    bound: Bound,
) -> Result<Decision<P::Symbol>, PreconditionError> {
    let sim_a: PairSet = simulation_preorder(a, alphabet);
    let sim_b: PairSet = simulation_preorder(b, alphabet);

    let reduce_b = |set: &Macro| -> Macro {
        set.iter()
            .filter(|&&q| {
                !set.iter()
                    .any(|&other| other != q && sim_b.contains(&(q, other)))
            })
            .copied()
            .collect()
    };

    let dominates = |host: (usize, &Macro), guest: (usize, &Macro)| -> bool {
        let (p_host, q_host) = host;
        let (p_guest, q_guest) = guest;
        (p_guest == p_host || sim_a.contains(&(p_guest, p_host)))
            && q_guest.iter().all(|&q1| {
                q_host
                    .iter()
                    .any(|&q2| q2 == q1 || sim_b.contains(&(q1, q2)))
            })
    };

    let start_b = reduce_b(&Macro::from([b.initial_state()]));
    let start = Frame {
        a_state: a.initial_state(),
        b_states: start_b,
        path: Vec::new(),
    };

    if let Some(witness) = bad_witness(a, b, &start) {
        return Ok(Decision::fails(witness));
    }

    let mut antichain: Vec<(usize, Macro)> = vec![(start.a_state, start.b_states.clone())];
    let mut worklist = vec![start];

    while let Some(frame) = worklist.pop() {
        trace!(worklist_len = worklist.len(), antichain_len = antichain.len(), "antichain worklist step");
        let atoms = step_atoms(a, b, frame.a_state, &frame.b_states);

        for atom in atoms {
            let a_targets: Vec<usize> = a.states()[frame.a_state]
                .transitions
                .iter()
                .filter_map(|(guard, target)| match guard {
                    Guard::Cond(pred) if atom.is_subset_of(pred) => Some(*target),
                    _ => None,
                })
                .collect();

            let b_targets: Macro = frame
                .b_states
                .iter()
                .flat_map(|&q| {
                    b.states()[q].transitions.iter().filter_map(|(guard, target)| {
                        match guard {
                            Guard::Cond(pred) if atom.is_subset_of(pred) => Some(*target),
                            _ => None,
                        }
                    })
                })
                .collect();
            let reduced = reduce_b(&b_targets);

            for &a_next in &a_targets {
                let mut path = frame.path.clone();
                if let Some(symbol) = pick_symbol(&atom, alphabet) {
                    path.push(symbol);
                }
                let candidate = Frame {
                    a_state: a_next,
                    b_states: reduced.clone(),
                    path,
                };

                if let Some(witness) = bad_witness(a, b, &candidate) {
                    return Ok(Decision::fails(witness));
                }

                let dominated = antichain
                    .iter()
                    .any(|(p, q)| dominates((*p, q), (candidate.a_state, &candidate.b_states)));
                if dominated {
                    continue;
                }

                antichain
                    .retain(|(p, q)| !dominates((candidate.a_state, &candidate.b_states), (*p, q)));
                antichain.push((candidate.a_state, candidate.b_states.clone()));
                bound.check(antichain.len())?;
                worklist.push(candidate);
            }
        }
    }

    debug!(antichain_len = antichain.len(), "antichain inclusion check finished");

    Ok(Decision::holds())
}

fn bad_witness<P: Predicate>(a: &Sfa<P>, b: &Sfa<P>, frame: &Frame<P::Symbol>) -> Option<Witness<P::Symbol>> {
    let a_accepting = a.states()[frame.a_state].accepting;
    let b_has_final = frame
        .b_states
        .iter()
        .any(|&q| b.states()[q].accepting);
    if a_accepting && !b_has_final {
        Some(Witness::finite(frame.path.clone()))
    } else {
        None
    }
}

fn step_atoms<P: Predicate>(a: &Sfa<P>, b: &Sfa<P>, a_state: usize, b_states: &Macro) -> Vec<P> {
    let mut atoms = vec![P::universal()];
    for (guard, _) in &a.states()[a_state].transitions {
        if let Guard::Cond(pred) = guard {
            atoms = refine_atoms(atoms, pred);
        }
    }
    for &q in b_states {
        for (guard, _) in &b.states()[q].transitions {
            if let Guard::Cond(pred) = guard {
                atoms = refine_atoms(atoms, pred);
            }
        }
    }
    atoms
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

    fn two_state_a_loop() -> Sfa<InNotInPredicate> {
        Sfa::new(GuardedAutomaton::new(
            vec![
                GuardedState {
                    name: sym("q1"),
                    accepting: true,
                    transitions: vec![(Guard::Cond(InNotInPredicate::in_set([sym("a")])), 1)],
                },
                GuardedState {
                    name: sym("q2"),
                    accepting: true,
                    transitions: vec![(Guard::Cond(InNotInPredicate::in_set([sym("b")])), 0)],
                },
            ],
            0,
        ))
    }

    #[test]
    fn automaton_is_included_in_itself() {
        let a = two_state_a_loop();
        let alphabet = [sym("a"), sym("b")];
        assert!(is_included_antichain(&a, &a, &alphabet).holds);
    }

    #[test]
    fn dropping_a_transition_breaks_inclusion() {
        let a = two_state_a_loop();
        // q2 has no outgoing transition at all: L(narrower) no longer contains "ab".
        let narrower = Sfa::new(GuardedAutomaton::new(
            vec![
                GuardedState {
                    name: sym("q1"),
                    accepting: true,
                    transitions: vec![(Guard::Cond(InNotInPredicate::in_set([sym("a")])), 1)],
                },
                GuardedState {
                    name: sym("q2"),
                    accepting: true,
                    transitions: vec![],
                },
            ],
            0,
        ));
        let alphabet = [sym("a"), sym("b")];
        let decision = is_included_antichain(&a, &narrower, &alphabet);
        assert!(!decision.holds);
        assert!(decision.witness.is_some());
    }
}
