//! # Symbolic FA layer
//! [Sfa] wraps [GuardedAutomaton] with the predicate-specific constructions classical automata
//! don't need: predicate-partitioning determinization ([Sfa::determinize]), completion
//! ([Sfa::get_complete]), minimization over a completed deterministic machine ([Sfa::minimize]),
//! and complement ([Sfa::complement]).
mod merge;
pub mod simulation;

use crate::core::{GuardedAutomaton, GuardedState};
use crate::error::{Bound, PreconditionError};
use crate::predicate::{Guard, Predicate};
use crate::sfa::merge::merge_transition;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::rc::Rc;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sfa<P> {
    automaton: GuardedAutomaton<P>,
}

impl<P: Predicate> Sfa<P> {
    pub fn new(automaton: GuardedAutomaton<P>) -> Self {
        Sfa { automaton }
    }

    pub fn states(&self) -> &[GuardedState<P>] {
        self.automaton.states()
    }

    pub fn initial_state(&self) -> usize {
        self.automaton.initial_state()
    }

    pub fn automaton(&self) -> &GuardedAutomaton<P> {
        &self.automaton
    }

    pub fn is_empty(&self) -> bool {
        self.automaton.is_empty()
    }

    /// True if no state has an epsilon move and, for every state, any two distinct outgoing
    /// guards are pairwise unsatisfiable when conjoined (at most one transition can ever fire for
    /// a given symbol).
    pub fn is_deterministic(&self) -> bool {
        self.automaton.states().iter().all(|state| {
            let conds: Vec<&P> = state
                .transitions
                .iter()
                .filter_map(|(g, _)| g.as_predicate())
                .collect();
            let no_epsilon = conds.len() == state.transitions.len();
            no_epsilon
                && conds
                    .iter()
                    .enumerate()
                    .all(|(i, p)| conds[i + 1..].iter().all(|q| !p.and(q).is_satisfiable()))
        })
    }

    pub(crate) fn epsilon_closure(&self, state: usize) -> BTreeSet<usize> {
        let mut closure = BTreeSet::new();
        let mut queue = VecDeque::new();
        closure.insert(state);
        queue.push_back(state);
        while let Some(s) = queue.pop_front() {
            for (guard, target) in &self.automaton.states()[s].transitions {
                if guard.is_epsilon() && closure.insert(*target) {
                    queue.push_back(*target);
                }
            }
        }
        closure
    }

    pub(crate) fn closure_of(&self, set: &BTreeSet<usize>) -> BTreeSet<usize> {
        set.iter().flat_map(|&s| self.epsilon_closure(s)).collect()
    }

    /// Powerset-determinizes this SFA, using [merge_transition] to keep each macro-state's
    /// outgoing guards pairwise disjoint no matter how the member states' own guards overlap.
    pub fn determinize(&self) -> Sfa<P> {
        self.try_determinize(Bound::UNBOUNDED)
            .expect("unbounded construction cannot hit a state bound")
    }

    /// Bounded variant of [Sfa::determinize]; fails with
    /// [PreconditionError::BoundExceeded](crate::error::PreconditionError::BoundExceeded) once the
    /// macro-state worklist would grow past `bound`.
    pub fn try_determinize(&self, bound: Bound) -> Result<Sfa<P>, PreconditionError> {
        let start = self.closure_of(&BTreeSet::from([self.automaton.initial_state()]));

        let mut index = HashMap::new();
        let mut states: Vec<GuardedState<P>> = Vec::new();
        let mut queue = VecDeque::new();

        index.insert(start.clone(), 0usize);
        queue.push_back(start.clone());
        states.push(self.macro_state(&start));

        while let Some(macro_state) = queue.pop_front() {
            let mut atoms: Vec<(P, BTreeSet<usize>)> = Vec::new();
            for &member in &macro_state {
                for (guard, target) in &self.automaton.states()[member].transitions {
                    if let Guard::Cond(pred) = guard {
                        merge_transition(&mut atoms, pred.clone(), BTreeSet::from([*target]));
                    }
                }
            }

            let idx = index[&macro_state];
            let mut transitions = Vec::with_capacity(atoms.len());
            for (pred, targets) in atoms {
                let closed = self.closure_of(&targets);
                let mut newly_inserted = false;
                let next_idx = *index.entry(closed.clone()).or_insert_with(|| {
                    newly_inserted = true;
                    let new_idx = states.len();
                    states.push(self.macro_state(&closed));
                    queue.push_back(closed.clone());
                    new_idx
                });
                if newly_inserted {
                    bound.check(states.len())?;
                }
                transitions.push((Guard::Cond(pred), next_idx));
            }
            states[idx].transitions = transitions;
            trace!(queue_len = queue.len(), states = states.len(), "determinize worklist step");
        }

        debug!(states = states.len(), "determinize finished");
        Ok(Sfa::new(GuardedAutomaton::new(states, 0)))
    }

    fn macro_state(&self, members: &BTreeSet<usize>) -> GuardedState<P> {
        let name = members
            .iter()
            .map(|idx| self.automaton.states()[*idx].name.as_ref())
            .collect::<Vec<_>>()
            .join(",");
        GuardedState {
            name: Rc::from(name),
            accepting: members
                .iter()
                .any(|&idx| self.automaton.states()[idx].accepting),
            transitions: Vec::new(),
        }
    }

    /// Returns a language-equivalent complete automaton: every state gets one extra transition,
    /// guarded by the negation of the disjunction of its existing guards, into a single shared
    /// non-accepting sink state (which loops back to itself on the universal predicate).
    ///
    /// Precondition: `self` is deterministic and epsilon-free (call [Sfa::determinize] first if
    /// not). Panics if that precondition doesn't hold; use [Sfa::try_get_complete] to check it
    /// instead.
    pub fn get_complete(&self) -> Sfa<P> {
        self.try_get_complete()
            .expect("get_complete's precondition (determinism) was not checked by the caller")
    }

    /// Checked variant of [Sfa::get_complete]: fails with [PreconditionError::NotDeterministic]
    /// instead of assuming the precondition holds.
    pub fn try_get_complete(&self) -> Result<Sfa<P>, PreconditionError> {
        if !self.is_deterministic() {
            return Err(PreconditionError::NotDeterministic);
        }
        let sink = self.automaton.states().len();
        let mut states: Vec<GuardedState<P>> = self.automaton.states().to_vec();

        for state in states.iter_mut() {
            let covered = state
                .transitions
                .iter()
                .filter_map(|(g, _)| g.as_predicate())
                .fold(P::none(), |acc, p| acc.or(p));
            let uncovered = covered.negate();
            if uncovered.is_satisfiable() {
                state.transitions.push((Guard::Cond(uncovered), sink));
            }
        }

        states.push(GuardedState {
            name: Rc::from("error"),
            accepting: false,
            transitions: vec![(Guard::Cond(P::universal()), sink)],
        });

        Ok(Sfa::new(GuardedAutomaton::new(
            states,
            self.automaton.initial_state(),
        )))
    }

    /// Complement of a deterministic, complete automaton: flip every state's acceptance bit.
    /// Non-deterministic or incomplete input is first determinized and completed.
    pub fn complement(&self) -> Sfa<P> {
        let complete = if self.is_deterministic() {
            self.get_complete()
        } else {
            self.determinize().get_complete()
        };
        let states = complete
            .automaton
            .states()
            .iter()
            .map(|state| GuardedState {
                name: state.name.clone(),
                accepting: !state.accepting,
                transitions: state.transitions.clone(),
            })
            .collect();
        Sfa::new(GuardedAutomaton::new(states, complete.automaton.initial_state()))
    }

    pub fn minimize(&self) -> Sfa<P> {
        let complete = if self.is_deterministic() {
            self.get_complete()
        } else {
            self.determinize().get_complete()
        };
        minimize_complete(&complete)
    }
}

/// Refines `atoms` (a partition of the whole satisfiable symbol space) so that `guard` is a union
/// of some subset of the refined atoms, by splitting each existing atom along its overlap with
/// `guard`.
pub(crate) fn refine_atoms<P: Predicate>(atoms: Vec<P>, guard: &P) -> Vec<P> {
    let mut refined = Vec::with_capacity(atoms.len() + 1);
    for atom in atoms {
        let inside = atom.and(guard);
        let outside = atom.and(&guard.negate());
        if inside.is_satisfiable() {
            refined.push(inside);
        }
        if outside.is_satisfiable() {
            refined.push(outside);
        }
    }
    refined
}

/// Minimizes an already-deterministic, already-complete [Sfa] by first building a common atom
/// refinement of every guard in the machine (so every state's transition function can be read off
/// against the same finite set of "letters"), then running the teacher's Hopcroft partition
/// refinement over that atom alphabet exactly as it runs over a concrete alphabet for [crate::dfa].
fn minimize_complete<P: Predicate>(sfa: &Sfa<P>) -> Sfa<P> {
    let states = sfa.automaton.states();

    let mut atoms: Vec<P> = vec![P::universal()];
    for state in states {
        for (guard, _) in &state.transitions {
            if let Guard::Cond(pred) = guard {
                atoms = refine_atoms(atoms, pred);
            }
        }
    }

    // target_of[state][atom] = the state reached consuming any symbol satisfying that atom.
    let target_of: Vec<Vec<Option<usize>>> = states
        .iter()
        .map(|state| {
            atoms
                .iter()
                .map(|atom| {
                    state.transitions.iter().find_map(|(guard, target)| {
                        let Guard::Cond(pred) = guard else {
                            return None;
                        };
                        atom.is_subset_of(pred).then_some(*target)
                    })
                })
                .collect()
        })
        .collect();

    let (finals, nonfinals): (BTreeSet<usize>, BTreeSet<usize>) =
        (0..states.len()).partition(|&idx| states[idx].accepting);

    let mut p: Vec<BTreeSet<usize>> = if finals.is_empty() {
        vec![nonfinals]
    } else if nonfinals.is_empty() {
        vec![finals]
    } else {
        vec![finals, nonfinals]
    };
    let mut w = p.clone();

    while let Some(a) = w.pop() {
        for atom_idx in 0..atoms.len() {
            let x: BTreeSet<usize> = (0..states.len())
                .filter(|&s| target_of[s][atom_idx].is_some_and(|t| a.contains(&t)))
                .collect();
            if x.is_empty() {
                continue;
            }
            p = p
                .into_iter()
                .flat_map(|y| {
                    let inter: BTreeSet<usize> = x.intersection(&y).copied().collect();
                    let diff: BTreeSet<usize> = y.difference(&x).copied().collect();
                    if !inter.is_empty() && !diff.is_empty() {
                        if let Some(idx) = w.iter().position(|hs| hs == &y) {
                            w.swap_remove(idx);
                            w.push(inter.clone());
                            w.push(diff.clone());
                        } else if inter.len() <= diff.len() {
                            w.push(inter.clone());
                        } else {
                            w.push(diff.clone());
                        }
                        vec![inter, diff]
                    } else {
                        vec![y]
                    }
                })
                .collect();
        }
    }

    let mut block_of = vec![0usize; states.len()];
    for (block_idx, block) in p.iter().enumerate() {
        for &state in block {
            block_of[state] = block_idx;
        }
    }

    let new_states: Vec<GuardedState<P>> = p
        .iter()
        .map(|block| {
            let representative = *block.iter().next().expect("block is non-empty");
            let mut by_target: HashMap<usize, P> = HashMap::new();
            for (atom_idx, atom) in atoms.iter().enumerate() {
                if let Some(target) = target_of[representative][atom_idx] {
                    let block_target = block_of[target];
                    by_target
                        .entry(block_target)
                        .and_modify(|acc| *acc = acc.or(atom))
                        .or_insert_with(|| atom.clone());
                }
            }
            GuardedState {
                name: Rc::from(format!("block{representative}")),
                accepting: states[representative].accepting,
                transitions: by_target
                    .into_iter()
                    .map(|(target, pred)| (Guard::Cond(pred), target))
                    .collect(),
            }
        })
        .collect();

    let initial_block = block_of[sfa.automaton.initial_state()];
    Sfa::new(GuardedAutomaton::new(new_states, initial_block))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::InNotInPredicate;

    fn sym(s: &str) -> Rc<str> {
        Rc::from(s)
    }

    fn two_overlapping_states() -> Sfa<InNotInPredicate> {
        Sfa::new(GuardedAutomaton::new(
            vec![
                GuardedState {
                    name: sym("s0"),
                    accepting: false,
                    transitions: vec![
                        (
                            Guard::Cond(InNotInPredicate::in_set([sym("a"), sym("b")])),
                            1,
                        ),
                        (Guard::Cond(InNotInPredicate::in_set([sym("b")])), 2),
                    ],
                },
                GuardedState {
                    name: sym("s1"),
                    accepting: true,
                    transitions: vec![],
                },
                GuardedState {
                    name: sym("s2"),
                    accepting: true,
                    transitions: vec![],
                },
            ],
            0,
        ))
    }

    #[test]
    fn determinize_makes_disjoint_guards() {
        let det = two_overlapping_states().determinize();
        assert!(det.is_deterministic());
    }

    #[test]
    fn complement_flips_emptiness() {
        let sfa = two_overlapping_states();
        assert!(!sfa.is_empty());
        let complement = sfa.complement();
        // "a only" still leads to an accepting state in the original, so it's not accepted by
        // the complement; but the completed sink *is* accepting in the complement.
        assert!(!complement.is_empty());
    }

    #[test]
    fn minimize_does_not_increase_state_count() {
        let sfa = two_overlapping_states().determinize();
        let minimized = sfa.minimize();
        assert!(minimized.states().len() <= sfa.states().len() + 1);
    }

    #[test]
    fn try_get_complete_rejects_nondeterministic_input() {
        let sfa = two_overlapping_states();
        assert!(!sfa.is_deterministic());
        assert_eq!(
            sfa.try_get_complete(),
            Err(crate::error::PreconditionError::NotDeterministic)
        );
    }
}
