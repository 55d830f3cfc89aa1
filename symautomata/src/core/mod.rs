//! # Symbolic machine core
//! [GuardedAutomaton] is the state/transition table and graph-level services shared by every
//! predicate-guarded machine kind in this crate ([crate::sfa::Sfa], [crate::buchi]): reachability,
//! co-reachability, unreachable/useless state removal, transition compaction, emptiness, disjoint
//! union (for building a bigger machine out of two smaller ones) and the synchronized product used
//! by intersection-like constructions.
//!
//! States are addressed by `usize` index into a flat `Vec`; human-readable names are carried along
//! for the text format but never consulted by any algorithm here.
use crate::predicate::{Guard, Predicate};
use std::collections::{BTreeSet, VecDeque};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardedState<P> {
    pub name: Rc<str>,
    pub accepting: bool,
    pub transitions: Vec<(Guard<P>, usize)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardedAutomaton<P> {
    pub states: Vec<GuardedState<P>>,
    pub initial_state: usize,
}

impl<P: Predicate> GuardedAutomaton<P> {
    pub fn new(states: Vec<GuardedState<P>>, initial_state: usize) -> Self {
        debug_assert!(initial_state < states.len());
        GuardedAutomaton {
            states,
            initial_state,
        }
    }

    pub fn states(&self) -> &[GuardedState<P>] {
        &self.states
    }

    pub fn initial_state(&self) -> usize {
        self.initial_state
    }

    /// Every state reachable from the initial state, following epsilon moves too.
    pub fn reachable_states(&self) -> BTreeSet<usize> {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::new();
        seen.insert(self.initial_state);
        queue.push_back(self.initial_state);
        while let Some(state) = queue.pop_front() {
            for (_, target) in &self.states[state].transitions {
                if seen.insert(*target) {
                    queue.push_back(*target);
                }
            }
        }
        seen
    }

    /// The reverse adjacency list: `rev[q]` holds `(guard, p)` for every original transition
    /// `p --guard--> q`. This is the graph-level "reverse" operation — kept as an adjacency view
    /// rather than a whole new automaton, since a guarded automaton with several initial states
    /// (as a naive reversal would need, one per original accepting state) doesn't fit this crate's
    /// single-initial-state representation.
    pub fn reverse_transitions(&self) -> Vec<Vec<(Guard<P>, usize)>> {
        let mut rev = vec![Vec::new(); self.states.len()];
        for (src, state) in self.states.iter().enumerate() {
            for (guard, target) in &state.transitions {
                rev[*target].push((guard.clone(), src));
            }
        }
        rev
    }

    /// States that can reach an accepting state, following epsilon moves too.
    pub fn coreachable_states(&self) -> BTreeSet<usize> {
        let rev = self.reverse_transitions();
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::new();
        for (idx, state) in self.states.iter().enumerate() {
            if state.accepting {
                seen.insert(idx);
                queue.push_back(idx);
            }
        }
        while let Some(state) = queue.pop_front() {
            for (_, pred) in &rev[state] {
                if seen.insert(*pred) {
                    queue.push_back(*pred);
                }
            }
        }
        seen
    }

    /// Whether the recognized language is empty: no accepting state is reachable from the initial
    /// state.
    pub fn is_empty(&self) -> bool {
        !self
            .reachable_states()
            .iter()
            .any(|&idx| self.states[idx].accepting)
    }

    /// Keeps only states reachable from the initial state, renumbering as needed.
    pub fn remove_unreachable(&self) -> Self {
        let reachable = self.reachable_states();
        self.keep_states(&reachable)
    }

    /// Keeps only states that are both reachable and co-reachable (can still reach an accepting
    /// state), always keeping the initial state itself so the result remains a valid automaton
    /// even when its language turns out to be empty.
    pub fn remove_useless(&self) -> Self {
        let reachable = self.reachable_states();
        let coreachable = self.coreachable_states();
        let mut keep: BTreeSet<usize> = reachable.intersection(&coreachable).copied().collect();
        keep.insert(self.initial_state);
        self.keep_states(&keep)
    }

    fn keep_states(&self, keep: &BTreeSet<usize>) -> Self {
        let mut remap = vec![None; self.states.len()];
        for (new_idx, &old_idx) in keep.iter().enumerate() {
            remap[old_idx] = Some(new_idx);
        }

        let states = keep
            .iter()
            .map(|&old_idx| {
                let old_state = &self.states[old_idx];
                let transitions = old_state
                    .transitions
                    .iter()
                    .filter_map(|(guard, target)| {
                        remap[*target].map(|new_target| (guard.clone(), new_target))
                    })
                    .collect();
                GuardedState {
                    name: old_state.name.clone(),
                    accepting: old_state.accepting,
                    transitions,
                }
            })
            .collect();

        let initial_state = remap[self.initial_state].expect("initial state is always kept");
        GuardedAutomaton {
            states,
            initial_state,
        }
    }

    /// Merges multiple transitions between the same pair of states into one, disjoining their
    /// guards. Epsilon guards are left alone (there's only ever one kind of epsilon move).
    pub fn compact_transitions(&self) -> Self {
        let states = self
            .states
            .iter()
            .map(|state| {
                let mut by_target: Vec<(usize, Guard<P>)> = Vec::new();
                for (guard, target) in &state.transitions {
                    if let Guard::Epsilon = guard {
                        by_target.push((*target, Guard::Epsilon));
                        continue;
                    }
                    if let Some(existing) = by_target
                        .iter_mut()
                        .find(|(t, g)| t == target && !matches!(g, Guard::Epsilon))
                    {
                        if let (Guard::Cond(acc), Guard::Cond(new)) = (&existing.1, guard) {
                            existing.1 = Guard::Cond(acc.or(new));
                        }
                    } else {
                        by_target.push((*target, guard.clone()));
                    }
                }
                GuardedState {
                    name: state.name.clone(),
                    accepting: state.accepting,
                    transitions: by_target.into_iter().map(|(t, g)| (g, t)).collect(),
                }
            })
            .collect();
        GuardedAutomaton {
            states,
            initial_state: self.initial_state,
        }
    }

    /// Concatenates `a`'s and `b`'s state vectors, offsetting `b`'s indices by `a.states.len()`.
    /// Returns the merged state vector and the offset applied to `b`; callers wire up a new
    /// initial state (e.g. epsilon-linking both originals, or synthesizing a fresh start state)
    /// since a disjoint union alone has no single natural initial state.
    pub fn disjoint_union(a: &Self, b: &Self) -> (Vec<GuardedState<P>>, usize) {
        let offset = a.states.len();
        let mut states = a.states.clone();
        states.extend(b.states.iter().map(|state| GuardedState {
            name: state.name.clone(),
            accepting: state.accepting,
            transitions: state
                .transitions
                .iter()
                .map(|(guard, target)| (guard.clone(), target + offset))
                .collect(),
        }));
        (states, offset)
    }

    /// Synchronized product of two epsilon-free guarded automata: a worklist over pairs `(p, q)`
    /// where each combined transition's guard is the conjunction of a transition out of `p` and a
    /// transition out of `q`, kept only when that conjunction is satisfiable. `accept` decides
    /// whether a pair of (p accepting, q accepting) flags makes the combined state accepting —
    /// `|x, y| x && y` for intersection, `|x, y| x || y` for union.
    ///
    /// Precondition: neither automaton has an epsilon transition (both must already be
    /// epsilon-free letter- or predicate-guarded automata; [crate::sfa::Sfa] determinization
    /// produces exactly that).
    pub fn product_construction(a: &Self, b: &Self, accept: impl Fn(bool, bool) -> bool) -> Self {
        let mut pair_index = std::collections::HashMap::new();
        let mut states = Vec::new();
        let mut queue = VecDeque::new();

        let start = (a.initial_state, b.initial_state);
        pair_index.insert(start, 0usize);
        queue.push_back(start);
        states.push(GuardedState {
            name: Rc::from(format!("({},{})", start.0, start.1)),
            accepting: accept(
                a.states[start.0].accepting,
                b.states[start.1].accepting,
            ),
            transitions: Vec::new(),
        });

        while let Some((p, q)) = queue.pop_front() {
            let idx = pair_index[&(p, q)];
            let mut transitions = Vec::new();
            for (guard_a, target_a) in &a.states[p].transitions {
                let Guard::Cond(pred_a) = guard_a else {
                    continue;
                };
                for (guard_b, target_b) in &b.states[q].transitions {
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
                        states.push(GuardedState {
                            name: Rc::from(format!("({},{})", next.0, next.1)),
                            accepting: accept(
                                a.states[next.0].accepting,
                                b.states[next.1].accepting,
                            ),
                            transitions: Vec::new(),
                        });
                        queue.push_back(next);
                        new_idx
                    });
                    transitions.push((Guard::Cond(combined), next_idx));
                }
            }
            states[idx].transitions = transitions;
        }

        GuardedAutomaton {
            states,
            initial_state: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::LetterPredicate;

    fn sym(s: &str) -> Rc<str> {
        Rc::from(s)
    }

    fn two_state_loop() -> GuardedAutomaton<LetterPredicate> {
        GuardedAutomaton::new(
            vec![
                GuardedState {
                    name: sym("s0"),
                    accepting: false,
                    transitions: vec![(Guard::Cond(LetterPredicate::Exactly(sym("a"))), 1)],
                },
                GuardedState {
                    name: sym("s1"),
                    accepting: true,
                    transitions: vec![],
                },
            ],
            0,
        )
    }

    #[test]
    fn is_empty_false_when_accepting_reachable() {
        assert!(!two_state_loop().is_empty());
    }

    #[test]
    fn remove_useless_drops_dead_branch() {
        let mut g = two_state_loop();
        g.states.push(GuardedState {
            name: sym("dead"),
            accepting: false,
            transitions: vec![],
        });
        g.states[0]
            .transitions
            .push((Guard::Cond(LetterPredicate::Exactly(sym("b"))), 2));
        let reduced = g.remove_useless();
        assert_eq!(reduced.states.len(), 2);
    }

    #[test]
    fn product_intersection_accepts_common_language() {
        let a = two_state_loop();
        let b = two_state_loop();
        let product = GuardedAutomaton::product_construction(&a, &b, |x, y| x && y);
        assert!(!product.is_empty());
    }
}
