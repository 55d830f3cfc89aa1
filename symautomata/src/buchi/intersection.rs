//! Generalized Büchi intersection: the product of two Büchi automata needs two acceptance sets,
//! not one, because a run visiting `A`'s accepting states infinitely often and a run visiting
//! `B`'s accepting states infinitely often don't have to hit both simultaneously on the same
//! transition. [GeneralizedBuchi] carries the extra acceptance sets the plain product state can't
//! express; [intersect] builds one from two ordinary Büchi automata.
use crate::core::{GuardedAutomaton, GuardedState};
use crate::predicate::{Guard, Predicate};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::rc::Rc;

/// A Büchi automaton whose acceptance condition is "visit every set in `final_sets` infinitely
/// often", rather than a single `accepting` flag per state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralizedBuchi<P> {
    automaton: GuardedAutomaton<P>,
    final_sets: Vec<BTreeSet<usize>>,
}

impl<P: Predicate> GeneralizedBuchi<P> {
    pub fn new(automaton: GuardedAutomaton<P>, final_sets: Vec<BTreeSet<usize>>) -> Self {
        GeneralizedBuchi {
            automaton,
            final_sets,
        }
    }

    pub fn automaton(&self) -> &GuardedAutomaton<P> {
        &self.automaton
    }

    pub fn final_sets(&self) -> &[BTreeSet<usize>] {
        &self.final_sets
    }

    /// Counting-construction degeneralization: a single Büchi automaton accepting the same
    /// language, tracking "which final set am I still waiting to hit" as an extra counter
    /// component folded into the state.
    pub fn degeneralize(&self) -> GuardedAutomaton<P> {
        if self.final_sets.is_empty() {
            return self.automaton.clone();
        }

        let k = self.final_sets.len();
        let mut index: HashMap<(usize, usize), usize> = HashMap::new();
        let mut states: Vec<GuardedState<P>> = Vec::new();
        let mut queue = VecDeque::new();

        let start_counter = advance_counter(&self.final_sets, self.automaton.initial_state(), 0);
        let start = (self.automaton.initial_state(), start_counter);
        index.insert(start, 0);
        states.push(GuardedState {
            name: Rc::from(format!("{}#{}", self.automaton.initial_state(), start.1)),
            accepting: start.1 == 0 && self.final_sets[0].contains(&start.0),
            transitions: Vec::new(),
        });
        queue.push_back(start);

        while let Some((state, counter)) = queue.pop_front() {
            let idx = index[&(state, counter)];
            let mut transitions = Vec::new();
            for (guard, target) in &self.automaton.states()[state].transitions {
                let next_counter = advance_counter(&self.final_sets, *target, counter);
                let next = (*target, next_counter);
                let next_idx = *index.entry(next).or_insert_with(|| {
                    let new_idx = states.len();
                    states.push(GuardedState {
                        name: Rc::from(format!("{}#{}", next.0, next.1)),
                        accepting: next.1 == 0 && self.final_sets[0].contains(&next.0),
                        transitions: Vec::new(),
                    });
                    queue.push_back(next);
                    new_idx
                });
                transitions.push((guard.clone(), next_idx));
            }
            states[idx].transitions = transitions;
        }

        let _ = k;
        GuardedAutomaton::new(states, 0)
    }
}

/// `counter` names the final set a run is currently waiting to visit; seeing a state in that set
/// advances to the next one (modulo `final_sets.len()`), so the counter returns to `0` exactly
/// when every set has been hit in round-robin order since the last full cycle.
fn advance_counter<P>(final_sets: &[BTreeSet<usize>], state: usize, counter: usize) -> usize {
    if final_sets[counter].contains(&state) {
        (counter + 1) % final_sets.len()
    } else {
        counter
    }
}

/// Product of two Büchi automata: state `(p, q)`, final sets `{(p, q) : p ∈ F_a}` and
/// `{(p, q) : q ∈ F_b}`. A run of the product projects to a run of each factor, and the
/// generalized acceptance condition is exactly "both factors accept".
///
/// Precondition: neither automaton has an epsilon transition.
pub fn intersect<P: Predicate>(
    a: &GuardedAutomaton<P>,
    b: &GuardedAutomaton<P>,
) -> GeneralizedBuchi<P> {
    let mut pair_index = HashMap::new();
    let mut states = Vec::new();
    let mut queue = VecDeque::new();
    let mut final_a = BTreeSet::new();
    let mut final_b = BTreeSet::new();

    let start = (a.initial_state(), b.initial_state());
    pair_index.insert(start, 0usize);
    push_state(&mut states, &mut final_a, &mut final_b, a, b, start, 0);
    queue.push_back(start);

    while let Some((p, q)) = queue.pop_front() {
        let idx = pair_index[&(p, q)];
        let mut transitions = Vec::new();
        for (guard_a, target_a) in &a.states()[p].transitions {
            let Guard::Cond(pred_a) = guard_a else {
                continue;
            };
            for (guard_b, target_b) in &b.states()[q].transitions {
                let Guard::Cond(pred_b) = guard_b else {
                    continue;
                };
                let combined = pred_a.and(pred_b);
                if !combined.is_satisfiable() {
                    continue;
                }
                let next = (*target_a, *target_b);
                let next_idx = *pair_index.entry(next).or_insert_with(|| {
                    let new_idx = states.len();
                    push_state(&mut states, &mut final_a, &mut final_b, a, b, next, new_idx);
                    queue.push_back(next);
                    new_idx
                });
                transitions.push((Guard::Cond(combined), next_idx));
            }
        }
        states[idx].transitions = transitions;
    }

    let automaton = GuardedAutomaton::new(states, 0);
    GeneralizedBuchi::new(automaton, vec![final_a, final_b])
}

fn push_state<P: Predicate>(
    states: &mut Vec<GuardedState<P>>,
    final_a: &mut BTreeSet<usize>,
    final_b: &mut BTreeSet<usize>,
    a: &GuardedAutomaton<P>,
    b: &GuardedAutomaton<P>,
    pair: (usize, usize),
    idx: usize,
) {
    if a.states()[pair.0].accepting {
        final_a.insert(idx);
    }
    if b.states()[pair.1].accepting {
        final_b.insert(idx);
    }
    states.push(GuardedState {
        name: Rc::from(format!("({},{})", pair.0, pair.1)),
        accepting: a.states()[pair.0].accepting && b.states()[pair.1].accepting,
        transitions: Vec::new(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::InNotInPredicate;

    fn sym(s: &str) -> Rc<str> {
        Rc::from(s)
    }

    /// `a^ω`: `p --a--> p`, `p --a--> f`, `f --a--> f`.
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

    /// `(ab)^ω`: two states alternating on `a` then `b`, only the second is accepting.
    fn ab_omega() -> GuardedAutomaton<InNotInPredicate> {
        GuardedAutomaton::new(
            vec![
                GuardedState {
                    name: sym("x"),
                    accepting: false,
                    transitions: vec![(Guard::Cond(InNotInPredicate::in_set([sym("a")])), 1)],
                },
                GuardedState {
                    name: sym("y"),
                    accepting: true,
                    transitions: vec![(Guard::Cond(InNotInPredicate::in_set([sym("b")])), 0)],
                },
            ],
            0,
        )
    }

    #[test]
    fn intersection_keeps_two_final_sets() {
        let product = intersect(&a_omega(), &ab_omega());
        assert_eq!(product.final_sets().len(), 2);
        assert!(!product.automaton().states().is_empty());
    }

    #[test]
    fn degeneralized_automaton_is_nonempty_when_both_factors_accept_infinitely() {
        let product = intersect(&a_omega(), &a_omega());
        let degeneralized = product.degeneralize();
        assert!(!degeneralized.is_empty());
    }
}
