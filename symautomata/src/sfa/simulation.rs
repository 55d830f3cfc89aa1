//! Simulation preorder over symbolic automata, generalizing [crate::nfa::simulation] by testing
//! predicates against a concrete alphabet rather than counting transitions labeled with the same
//! symbol. A predicate algebra has no intrinsic notion of "all the ways out of a state", so the
//! caller supplies the alphabet to quantify over.
use crate::predicate::{Guard, Predicate};
use crate::sfa::Sfa;
use std::collections::{BTreeSet, HashMap};

type PairSet = BTreeSet<(usize, usize)>;

/// Computes the simulation preorder of `sfa` with respect to `alphabet`: `(p, q)` is included iff
/// `p` is *not* known to fail to be simulated by `q`, for every symbol in `alphabet`. Reflexive.
pub fn simulation_preorder<P: Predicate>(sfa: &Sfa<P>, alphabet: &[P::Symbol]) -> PairSet {
    let states = sfa.states();
    let n = states.len();

    // rev[symbol_idx][q] = states k with a transition k --guard--> q where guard accepts symbol
    let mut rev: Vec<HashMap<usize, Vec<usize>>> = vec![HashMap::new(); alphabet.len()];
    for (src, state) in states.iter().enumerate() {
        for (guard, target) in &state.transitions {
            let Guard::Cond(pred) = guard else { continue };
            for (a, symbol) in alphabet.iter().enumerate() {
                if pred.has_symbol(symbol) {
                    rev[a].entry(*target).or_default().push(src);
                }
            }
        }
    }

    let card = |k: usize, a: usize| {
        let symbol = &alphabet[a];
        states[k]
            .transitions
            .iter()
            .filter(|(guard, _)| matches!(guard, Guard::Cond(p) if p.has_symbol(symbol)))
            .count()
    };

    let mut non_sim: PairSet = BTreeSet::new();
    let mut worklist = Vec::new();
    for (p, p_state) in states.iter().enumerate() {
        if !p_state.accepting {
            continue;
        }
        for (q, q_state) in states.iter().enumerate() {
            if !q_state.accepting && non_sim.insert((p, q)) {
                worklist.push((p, q));
            }
        }
    }

    let mut known: HashMap<(usize, (usize, usize)), usize> = HashMap::new();
    while let Some((i, j)) = worklist.pop() {
        for a in 0..alphabet.len() {
            let Some(preds_of_j) = rev[a].get(&j) else {
                continue;
            };
            for &k in preds_of_j {
                let counter = known.entry((a, (i, k))).or_insert(0);
                *counter += 1;
                if *counter == card(k, a) {
                    if let Some(preds_of_i) = rev[a].get(&i) {
                        for &l in preds_of_i {
                            if non_sim.insert((l, k)) {
                                worklist.push((l, k));
                            }
                        }
                    }
                }
            }
        }
    }

    let mut preorder = PairSet::new();
    for p in 0..n {
        preorder.insert((p, p));
        for q in 0..n {
            if p != q && !non_sim.contains(&(p, q)) {
                preorder.insert((p, q));
            }
        }
    }
    preorder
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

    #[test]
    fn final_not_simulated_by_nonfinal() {
        let sfa = Sfa::new(GuardedAutomaton::new(
            vec![
                GuardedState {
                    name: sym("p"),
                    accepting: true,
                    transitions: vec![],
                },
                GuardedState {
                    name: sym("q"),
                    accepting: false,
                    transitions: vec![],
                },
            ],
            0,
        ));
        let preorder = simulation_preorder(&sfa, &[sym("a")]);
        assert!(!preorder.contains(&(0, 1)));
        assert!(preorder.contains(&(0, 0)));
    }
}
