//! # Symbolic transducers (C7)
//! [Transducer] wraps a [GuardedAutomaton] labeled with [TransducerPredicate]s instead of plain
//! predicates, reusing the exact same state/transition machinery [crate::sfa::Sfa] does (a
//! transducer label is itself a [crate::predicate::Predicate], over pairs of symbols).
//! [Transducer::compose] chains two transducers into one computing the composed relation;
//! [Transducer::apply] maps an [crate::sfa::Sfa]'s language through the transducer's relation into
//! a new [crate::sfa::Sfa].
use crate::core::{GuardedAutomaton, GuardedState};
use crate::error::PreconditionError;
use crate::predicate::{Guard, Predicate, TransducerPredicate};
use crate::sfa::Sfa;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transducer<P> {
    automaton: GuardedAutomaton<TransducerPredicate<P>>,
}

impl<P: Predicate> Transducer<P> {
    pub fn new(automaton: GuardedAutomaton<TransducerPredicate<P>>) -> Self {
        Transducer { automaton }
    }

    pub fn automaton(&self) -> &GuardedAutomaton<TransducerPredicate<P>> {
        &self.automaton
    }

    pub fn initial_state(&self) -> usize {
        self.automaton.initial_state()
    }

    /// At most one outgoing transition can ever fire for a given input symbol: the per-state
    /// guards' `input` components are pairwise unsatisfiable when conjoined.
    pub fn is_deterministic(&self) -> bool {
        self.automaton.states().iter().all(|state| {
            let inputs: Vec<&P> = state
                .transitions
                .iter()
                .filter_map(|(g, _)| g.as_predicate())
                .map(|label| &label.input)
                .collect();
            inputs
                .iter()
                .enumerate()
                .all(|(i, p)| inputs[i + 1..].iter().all(|q| !p.and(q).is_satisfiable()))
        })
    }

    /// Composes `self` (relating `x` to `y`) with `other` (relating `y` to `z`) into a transducer
    /// relating `x` to `z`: product state `(p, q)`, a combined transition exists whenever `self`'s
    /// output and `other`'s input overlap, labeled by [TransducerPredicate::combine].
    ///
    /// A product state is final if either factor's state is (matching the grounding's own
    /// composition, which does not require both runs to finish in a final state simultaneously).
    ///
    /// Fails with [PreconditionError::DisjointComposition] if `self`'s output vocabulary and
    /// `other`'s input vocabulary share no symbol at all, since the product would then have no
    /// transition beyond the start state.
    pub fn compose(&self, other: &Transducer<P>) -> Result<Transducer<P>, PreconditionError> {
        let a = &self.automaton;
        let b = &other.automaton;

        let output_vocabulary = a
            .states()
            .iter()
            .flat_map(|state| &state.transitions)
            .filter_map(|(guard, _)| guard.as_predicate())
            .fold(P::none(), |acc, label| acc.or(&label.output));
        let input_vocabulary = b
            .states()
            .iter()
            .flat_map(|state| &state.transitions)
            .filter_map(|(guard, _)| guard.as_predicate())
            .fold(P::none(), |acc, label| acc.or(&label.input));
        if !output_vocabulary.and(&input_vocabulary).is_satisfiable() {
            return Err(PreconditionError::DisjointComposition);
        }

        let mut pair_index = HashMap::new();
        let mut states = Vec::new();
        let mut queue = VecDeque::new();

        let start = (a.initial_state(), b.initial_state());
        pair_index.insert(start, 0usize);
        states.push(GuardedState {
            name: Rc::from(format!("[{}_1|{}_2]", start.0, start.1)),
            accepting: a.states()[start.0].accepting || b.states()[start.1].accepting,
            transitions: Vec::new(),
        });
        queue.push_back(start);

        while let Some((p, q)) = queue.pop_front() {
            let idx = pair_index[&(p, q)];
            let mut transitions = Vec::new();
            for (guard_a, target_a) in &a.states()[p].transitions {
                let Guard::Cond(label_a) = guard_a else {
                    continue;
                };
                for (guard_b, target_b) in &b.states()[q].transitions {
                    let Guard::Cond(label_b) = guard_b else {
                        continue;
                    };
                    if !label_a.output.and(&label_b.input).is_satisfiable() {
                        continue;
                    }
                    let combined = label_a.combine(label_b);
                    if !combined.is_satisfiable() {
                        continue;
                    }
                    let next = (*target_a, *target_b);
                    let next_idx = *pair_index.entry(next).or_insert_with(|| {
                        let new_idx = states.len();
                        states.push(GuardedState {
                            name: Rc::from(format!("[{}_1|{}_2]", next.0, next.1)),
                            accepting: a.states()[next.0].accepting || b.states()[next.1].accepting,
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

        Ok(Transducer::new(
            GuardedAutomaton::new(states, 0).compact_transitions(),
        ))
    }

    /// Maps `input`'s language through this transducer's relation: product state `(t, s)` over the
    /// transducer's and `input`'s own states, accepting when both components do, each transition
    /// guarded by the output predicate of whichever label matched the input side.
    pub fn apply(&self, input: &Sfa<P>) -> Sfa<P> {
        let t = &self.automaton;
        let mut pair_index = HashMap::new();
        let mut states = Vec::new();
        let mut queue = VecDeque::new();

        let start = (t.initial_state(), input.initial_state());
        pair_index.insert(start, 0usize);
        states.push(GuardedState {
            name: Rc::from(format!("({},{})", start.0, start.1)),
            accepting: t.states()[start.0].accepting && input.states()[start.1].accepting,
            transitions: Vec::new(),
        });
        queue.push_back(start);

        while let Some((p, q)) = queue.pop_front() {
            let idx = pair_index[&(p, q)];
            let mut transitions = Vec::new();
            for (guard_t, target_t) in &t.states()[p].transitions {
                let Guard::Cond(label) = guard_t else {
                    continue;
                };
                for (guard_in, target_in) in &input.states()[q].transitions {
                    let Guard::Cond(pred_in) = guard_in else {
                        continue;
                    };
                    let matched_input = label.input.and(pred_in);
                    if !matched_input.is_satisfiable() {
                        continue;
                    }
                    let output = if label.identity {
                        matched_input.clone()
                    } else {
                        label.output.clone()
                    };
                    if !output.is_satisfiable() {
                        continue;
                    }
                    let next = (*target_t, *target_in);
                    let next_idx = *pair_index.entry(next).or_insert_with(|| {
                        let new_idx = states.len();
                        states.push(GuardedState {
                            name: Rc::from(format!("({},{})", next.0, next.1)),
                            accepting: t.states()[next.0].accepting
                                && input.states()[next.1].accepting,
                            transitions: Vec::new(),
                        });
                        queue.push_back(next);
                        new_idx
                    });
                    transitions.push((Guard::Cond(output), next_idx));
                }
            }
            states[idx].transitions = transitions;
        }

        Sfa::new(GuardedAutomaton::new(states, 0))
    }

    /// Whether a run over `input` produces exactly `output`, symbol for symbol.
    pub fn check_translation(&self, input: &[P::Symbol], output: &[P::Symbol]) -> bool {
        self.check_translation_at(self.automaton.initial_state(), input, output)
    }

    fn check_translation_at(&self, state: usize, input: &[P::Symbol], output: &[P::Symbol]) -> bool {
        if input.is_empty() && output.is_empty() {
            return self.automaton.states()[state].accepting;
        }
        if input.len() != output.len() {
            return false;
        }
        let (Some((a, rest_in)), Some((b, rest_out))) =
            (input.split_first(), output.split_first())
        else {
            return false;
        };
        self.automaton.states()[state].transitions.iter().any(|(guard, target)| {
            let Guard::Cond(label) = guard else {
                return false;
            };
            label.translates(a, b) && self.check_translation_at(*target, rest_in, rest_out)
        })
    }

    /// Translates `input` by depth-first search, returning the first successful output found,
    /// choosing a witness output symbol from `alphabet` for each non-identity label.
    pub fn translate_word(&self, input: &[P::Symbol], alphabet: &[P::Symbol]) -> Option<Vec<P::Symbol>> {
        self.translate_word_at(self.automaton.initial_state(), input, alphabet)
    }

    fn translate_word_at(
        &self,
        state: usize,
        input: &[P::Symbol],
        alphabet: &[P::Symbol],
    ) -> Option<Vec<P::Symbol>> {
        if input.is_empty() {
            return self.automaton.states()[state].accepting.then(Vec::new);
        }
        let (a, rest) = input.split_first()?;
        for (guard, target) in &self.automaton.states()[state].transitions {
            let Guard::Cond(label) = guard else {
                continue;
            };
            let Some(b) = label.translate(a, alphabet) else {
                continue;
            };
            if let Some(mut tail) = self.translate_word_at(*target, rest, alphabet) {
                let mut out = vec![b];
                out.append(&mut tail);
                return Some(out);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GuardedState;
    use crate::predicate::LetterPredicate;

    fn sym(s: &str) -> Rc<str> {
        Rc::from(s)
    }

    /// Translates every `a` to `b`, looping: a single accepting state with a self-loop.
    fn a_to_b() -> Transducer<LetterPredicate> {
        Transducer::new(GuardedAutomaton::new(
            vec![GuardedState {
                name: sym("q0"),
                accepting: true,
                transitions: vec![(
                    Guard::Cond(TransducerPredicate::new(
                        LetterPredicate::Exactly(sym("a")),
                        LetterPredicate::Exactly(sym("b")),
                        false,
                    )),
                    0,
                )],
            }],
            0,
        ))
    }

    fn identity() -> Transducer<LetterPredicate> {
        Transducer::new(GuardedAutomaton::new(
            vec![GuardedState {
                name: sym("q0"),
                accepting: true,
                transitions: vec![(
                    Guard::Cond(TransducerPredicate::new(
                        LetterPredicate::Any,
                        LetterPredicate::Any,
                        true,
                    )),
                    0,
                )],
            }],
            0,
        ))
    }

    fn accepts_a_star() -> Sfa<LetterPredicate> {
        Sfa::new(GuardedAutomaton::new(
            vec![crate::core::GuardedState {
                name: sym("s0"),
                accepting: true,
                transitions: vec![(Guard::Cond(LetterPredicate::Exactly(sym("a"))), 0)],
            }],
            0,
        ))
    }

    #[test]
    fn check_translation_accepts_matching_word() {
        let t = a_to_b();
        let input = vec![sym("a"), sym("a")];
        let output = vec![sym("b"), sym("b")];
        assert!(t.check_translation(&input, &output));
        assert!(!t.check_translation(&input, &vec![sym("b"), sym("a")]));
    }

    #[test]
    fn translate_word_rewrites_every_symbol() {
        let t = a_to_b();
        let alphabet = [sym("a"), sym("b")];
        let input = vec![sym("a"), sym("a"), sym("a")];
        let out = t.translate_word(&input, &alphabet).unwrap();
        assert_eq!(out, vec![sym("b"), sym("b"), sym("b")]);
    }

    #[test]
    fn compose_chains_two_rewrites() {
        let first = a_to_b();
        let second = identity();
        let composed = first.compose(&second).unwrap();
        let input = vec![sym("a")];
        let output = vec![sym("b")];
        assert!(composed.check_translation(&input, &output));
    }

    #[test]
    fn compose_rejects_disjoint_vocabularies() {
        // first only ever outputs "b"; second only ever accepts "a" on its input side.
        let first = a_to_b();
        let second = Transducer::new(GuardedAutomaton::new(
            vec![GuardedState {
                name: sym("q0"),
                accepting: true,
                transitions: vec![(
                    Guard::Cond(TransducerPredicate::new(
                        LetterPredicate::Exactly(sym("a")),
                        LetterPredicate::Exactly(sym("a")),
                        false,
                    )),
                    0,
                )],
            }],
            0,
        ));
        assert_eq!(
            first.compose(&second),
            Err(crate::error::PreconditionError::DisjointComposition)
        );
    }

    #[test]
    fn apply_rewrites_a_star_into_b_star() {
        let t = a_to_b();
        let image = t.apply(&accepts_a_star());
        assert!(!image.is_empty());
        let alphabet_b_only = [sym("b")];
        // no transition on "a" should survive in the image automaton.
        assert!(image.states()[image.initial_state()]
            .transitions
            .iter()
            .all(|(guard, _)| {
                let Guard::Cond(pred) = guard else { return true };
                !pred.has_symbol(&sym("a")) || alphabet_b_only.contains(&sym("a"))
            }));
    }
}
