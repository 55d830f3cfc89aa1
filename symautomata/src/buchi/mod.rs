//! # Semi-deterministic Büchi automata (C6)
//! A Büchi automaton accepts infinite words: a run is accepting iff it visits an accepting state
//! ([crate::core::GuardedState::accepting]) infinitely often, reusing [crate::core::GuardedAutomaton]
//! unchanged (the data model is identical to an SFA; only the acceptance condition differs, so no
//! new state/transition representation is needed).
//!
//! [SemiDeterministicBuchi] wraps a [GuardedAutomaton] that has been checked to be
//! semi-deterministic: every state reachable forward from an accepting state has at most one
//! outgoing transition per symbol. [SemiDeterministicBuchi::split_components] and
//! [SemiDeterministicBuchi::fix_final_states] are the structural groundwork the NCSB
//! complementation family ([ncsb]) depends on; [intersection] builds a generalized Büchi product.
pub mod ncsb;
pub mod intersection;

use crate::core::{GuardedAutomaton, GuardedState};
use crate::error::PreconditionError;
use crate::predicate::{Guard, Predicate};
use std::collections::{BTreeSet, VecDeque};
use std::rc::Rc;

/// The Q1 (nondeterministic) / Q2 (deterministic forward closure of the accepting states)
/// partition from the semi-determinism test, plus the three edge classes it induces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub q1: BTreeSet<usize>,
    pub q2: BTreeSet<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemiDeterministicBuchi<P> {
    automaton: GuardedAutomaton<P>,
}

impl<P: Predicate> SemiDeterministicBuchi<P> {
    /// Checks `automaton` is semi-deterministic before wrapping it; see
    /// [SemiDeterministicBuchi::is_semideterministic].
    pub fn try_new(automaton: GuardedAutomaton<P>) -> Result<Self, PreconditionError> {
        let candidate = SemiDeterministicBuchi { automaton };
        if candidate.is_semideterministic() {
            Ok(candidate)
        } else {
            Err(PreconditionError::NotSemiDeterministic)
        }
    }

    pub fn automaton(&self) -> &GuardedAutomaton<P> {
        &self.automaton
    }

    pub fn states(&self) -> &[GuardedState<P>] {
        self.automaton.states()
    }

    pub fn initial_state(&self) -> usize {
        self.automaton.initial_state()
    }

    /// Forward closure of the accepting states must be deterministic: at most one successor per
    /// symbol for every state reachable (via any path) from an accepting state.
    pub fn is_semideterministic(&self) -> bool {
        let mut queue: VecDeque<usize> = self
            .automaton
            .states()
            .iter()
            .enumerate()
            .filter(|(_, s)| s.accepting)
            .map(|(idx, _)| idx)
            .collect();
        let mut done = BTreeSet::new();

        while let Some(state) = queue.pop_front() {
            if !done.insert(state) {
                continue;
            }
            let conds: Vec<&P> = self.automaton.states()[state]
                .transitions
                .iter()
                .filter_map(|(g, _)| g.as_predicate())
                .collect();
            let pairwise_disjoint = conds
                .iter()
                .enumerate()
                .all(|(i, p)| conds[i + 1..].iter().all(|q| !p.and(q).is_satisfiable()));
            if !pairwise_disjoint {
                return false;
            }
            for (_, target) in &self.automaton.states()[state].transitions {
                if !done.contains(target) {
                    queue.push_back(*target);
                }
            }
        }
        true
    }

    /// Q2 is the forward closure of the accepting states; Q1 is everything else.
    pub fn split_components(&self) -> Partition {
        let mut q2: BTreeSet<usize> = BTreeSet::new();
        let mut queue: VecDeque<usize> = self
            .automaton
            .states()
            .iter()
            .enumerate()
            .filter(|(_, s)| s.accepting)
            .map(|(idx, _)| idx)
            .collect();

        while let Some(state) = queue.pop_front() {
            if !q2.insert(state) {
                continue;
            }
            for (_, target) in &self.automaton.states()[state].transitions {
                if !q2.contains(target) {
                    queue.push_back(*target);
                }
            }
        }

        let q1: BTreeSet<usize> = (0..self.automaton.states().len())
            .filter(|idx| !q2.contains(idx))
            .collect();
        Partition { q1, q2 }
    }

    /// Clones entry points into Q2 so every Q2-entry is itself accepting, preserving the
    /// language but establishing the invariant NCSB complementation depends on: (a) an initial
    /// state in `Q2` with outgoing edges is cloned into a fresh initial+accepting state; (b) a
    /// `Q1 -> Q2` edge into a non-accepting state is redirected to a fresh accepting clone of the
    /// target.
    pub fn fix_final_states(&self) -> SemiDeterministicBuchi<P> {
        let partition = self.split_components();
        let mut states: Vec<GuardedState<P>> = self.automaton.states().to_vec();
        let mut initial = self.automaton.initial_state();
        let mut extra_initial: Vec<usize> = Vec::new();

        if partition.q2.contains(&initial) && !states[initial].transitions.is_empty() {
            let clone_idx = states.len();
            let mut clone = states[initial].clone();
            clone.name = Rc::from(format!("{}'", states[initial].name));
            clone.accepting = true;
            states.push(clone);
            extra_initial.push(clone_idx);
        }

        for source in partition.q1.iter().copied().collect::<Vec<_>>() {
            let transitions = states[source].transitions.clone();
            let mut rewritten = Vec::with_capacity(transitions.len());
            for (guard, target) in transitions {
                if partition.q2.contains(&target) && !states[target].accepting {
                    let clone_idx = states.len();
                    let mut clone = states[target].clone();
                    clone.name = Rc::from(format!("{}'", states[target].name));
                    clone.accepting = true;
                    states.push(clone);
                    rewritten.push((guard, clone_idx));
                } else {
                    rewritten.push((guard, target));
                }
            }
            states[source].transitions = rewritten;
        }

        // A disjoint-union-style extra start state links every original/cloned initial state by
        // epsilon, so the automaton keeps a single initial state as the representation requires.
        if !extra_initial.is_empty() {
            let new_start = states.len();
            let mut transitions: Vec<(Guard<P>, usize)> =
                vec![(Guard::Epsilon, initial)];
            transitions.extend(extra_initial.iter().map(|&idx| (Guard::Epsilon, idx)));
            states.push(GuardedState {
                name: Rc::from("start"),
                accepting: false,
                transitions,
            });
            initial = new_start;
        }

        SemiDeterministicBuchi {
            automaton: GuardedAutomaton::new(states, initial),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::InNotInPredicate;

    fn sym(s: &str) -> Rc<str> {
        Rc::from(s)
    }

    /// `p --a--> p`, `p --a--> f`, `f --a--> f`: the canonical `a^ω` example from the crate's
    /// testable properties.
    fn a_omega() -> GuardedAutomaton<InNotInPredicate> {
        GuardedAutomaton::new(
            vec![
                GuardedState {
                    name: sym("p"),
                    accepting: false,
                    transitions: vec![
                        (Guard::Cond(InNotInPredicate::in_set([sym("a")])), 0),
                        (Guard::Cond(InNotInPredicate::in_set([sym("a")])), 1),
                    ],
                },
                GuardedState {
                    name: sym("f"),
                    accepting: true,
                    transitions: vec![(Guard::Cond(InNotInPredicate::in_set([sym("a")])), 1)],
                },
            ],
            0,
        )
    }

    #[test]
    fn a_omega_is_semideterministic() {
        let sdba = SemiDeterministicBuchi::try_new(a_omega()).unwrap();
        assert!(sdba.is_semideterministic());
    }

    #[test]
    fn split_components_separates_p_from_f() {
        let sdba = SemiDeterministicBuchi::try_new(a_omega()).unwrap();
        let partition = sdba.split_components();
        assert_eq!(partition.q2, BTreeSet::from([1]));
        assert_eq!(partition.q1, BTreeSet::from([0]));
    }

    #[test]
    fn nondeterministic_accepting_closure_is_rejected() {
        let nondet = GuardedAutomaton::new(
            vec![GuardedState {
                name: sym("f"),
                accepting: true,
                transitions: vec![
                    (Guard::Cond(InNotInPredicate::in_set([sym("a")])), 0),
                    (Guard::Cond(InNotInPredicate::in_set([sym("a"), sym("b")])), 0),
                ],
            }],
            0,
        );
        assert_eq!(
            SemiDeterministicBuchi::try_new(nondet),
            Err(PreconditionError::NotSemiDeterministic)
        );
    }
}
