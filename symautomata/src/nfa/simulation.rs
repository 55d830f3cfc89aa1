//! Simulation preorder over letter-labelled NFAs, computed with the
//! Henzinger-Raskin-Schobbens style fixpoint: a pair `(p, q)` starts out
//! assumed non-simulated whenever `p` is final and `q` is not, then that
//! "known non-simulated" fact is propagated backwards along transitions
//! until no more pairs can be added. The preorder `≼` returned is the
//! complement of the final non-simulation set.
use crate::nfa::Nfa;
use std::collections::{BTreeSet, HashMap};

/// `(p, q)` is present iff `p` is *not* known to be simulated by `q`.
type PairSet = BTreeSet<(usize, usize)>;

/// Computes the simulation preorder `≼` of `nfa`, as a set of `(p, q)` pairs
/// meaning `p ≼ q` (every move of `p` is matched by `q`). Reflexive.
pub fn simulation_preorder(nfa: &Nfa) -> PairSet {
    let n = nfa.states().len();
    let alphabet_len = nfa.alphabet().len();

    // reverse adjacency: rev[a][q] = states k with k --a--> q
    let mut rev: Vec<HashMap<usize, Vec<usize>>> = vec![HashMap::new(); alphabet_len];
    for (src, state) in nfa.states().iter().enumerate() {
        for (a, targets) in state.transitions().iter().enumerate() {
            for &tgt in targets {
                rev[a].entry(tgt).or_default().push(src);
            }
        }
    }

    let card = |k: usize, a: usize| nfa.states()[k].transitions()[a].len();

    let mut non_sim: PairSet = BTreeSet::new();
    let mut worklist = Vec::new();
    for (p, p_state) in nfa.states().iter().enumerate() {
        if !p_state.is_accepting() {
            continue;
        }
        for (q, q_state) in nfa.states().iter().enumerate() {
            if !q_state.is_accepting() && non_sim.insert((p, q)) {
                worklist.push((p, q));
            }
        }
    }

    let mut known: HashMap<(usize, (usize, usize)), usize> = HashMap::new();
    while let Some((i, j)) = worklist.pop() {
        for a in 0..alphabet_len {
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
    use crate::parser;

    #[test]
    fn identical_states_simulate_each_other() {
        let src = "
               a
        -> * s1 {s1}
        ";
        let nfa: Nfa = parser::nfa(src).unwrap().try_into().unwrap();
        let preorder = simulation_preorder(&nfa);
        assert!(preorder.contains(&(0, 0)));
    }

    #[test]
    fn final_not_simulated_by_nonfinal() {
        let src = "
               a
        -> * p {p}
              q {q}
        ";
        let nfa: Nfa = parser::nfa(src).unwrap().try_into().unwrap();
        let preorder = simulation_preorder(&nfa);
        // p is final, q is not: p must not be simulated by q
        assert!(!preorder.contains(&(0, 1)));
    }
}
