//! Predicate-partitioning determinization: [merge_transition] folds a new `(predicate, targets)`
//! pair into an existing set of pairwise-disjoint `(predicate, targets)` atoms, splitting both the
//! new pair and any overlapping existing atom along their intersection so the result stays
//! disjoint. This terminates because every predicate algebra used here (see
//! [crate::predicate::Predicate]) is a finite Boolean lattice over a finite alphabet: each
//! recursive call strictly shrinks the satisfiable part left to place, see DESIGN.md OQ-3.
use crate::predicate::Predicate;
use std::collections::BTreeSet;

pub(crate) type Atom<P> = (P, BTreeSet<usize>);

pub(crate) fn merge_transition<P: Predicate>(
    atoms: &mut Vec<Atom<P>>,
    add: P,
    end: BTreeSet<usize>,
) {
    if !add.is_satisfiable() {
        return;
    }

    for i in 0..atoms.len() {
        let (existing, existing_end) = atoms[i].clone();

        if existing == add {
            atoms[i].1.extend(end);
            return;
        }

        if add.is_subset_of(&existing) {
            let merged_end: BTreeSet<usize> = existing_end.union(&end).cloned().collect();
            atoms.remove(i);
            atoms.push((add.clone(), merged_end));
            let rest = existing.and(&add.negate());
            if rest.is_satisfiable() {
                merge_transition(atoms, rest, existing_end);
            }
            return;
        }

        if existing.is_subset_of(&add) {
            let merged_end: BTreeSet<usize> = existing_end.union(&end).cloned().collect();
            atoms[i] = (existing.clone(), merged_end);
            let rest = add.and(&existing.negate());
            if rest.is_satisfiable() {
                merge_transition(atoms, rest, end);
            }
            return;
        }

        let conjunction = existing.and(&add);
        if conjunction.is_satisfiable() {
            let conjunction_end: BTreeSet<usize> = end.union(&existing_end).cloned().collect();
            atoms.remove(i);

            merge_transition(atoms, conjunction.clone(), conjunction_end);

            let left_existing = existing.and(&add.negate());
            if left_existing.is_satisfiable() {
                merge_transition(atoms, left_existing, existing_end);
            }

            let left_add = add.and(&conjunction.negate());
            if left_add.is_satisfiable() {
                merge_transition(atoms, left_add, end);
            }
            return;
        }
    }

    atoms.push((add, end));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::InNotInPredicate;
    use std::rc::Rc;

    fn sym(s: &str) -> Rc<str> {
        Rc::from(s)
    }

    fn targets(xs: &[usize]) -> BTreeSet<usize> {
        xs.iter().copied().collect()
    }

    #[test]
    fn disjoint_inputs_stay_separate() {
        let mut atoms = Vec::new();
        merge_transition(
            &mut atoms,
            InNotInPredicate::in_set([sym("a")]),
            targets(&[0]),
        );
        merge_transition(
            &mut atoms,
            InNotInPredicate::in_set([sym("b")]),
            targets(&[1]),
        );
        assert_eq!(atoms.len(), 2);
    }

    #[test]
    fn overlapping_inputs_split_into_three_atoms() {
        let mut atoms = Vec::new();
        merge_transition(
            &mut atoms,
            InNotInPredicate::in_set([sym("a"), sym("b")]),
            targets(&[0]),
        );
        merge_transition(
            &mut atoms,
            InNotInPredicate::in_set([sym("b"), sym("c")]),
            targets(&[1]),
        );
        // {a}->0, {b}->0,1, {c}->1
        assert_eq!(atoms.len(), 3);
        let total_weight: usize = atoms.iter().map(|(_, ends)| ends.len()).sum();
        assert_eq!(total_weight, 4);
    }

    #[test]
    fn identical_predicate_merges_targets() {
        let mut atoms = Vec::new();
        let p = InNotInPredicate::in_set([sym("a")]);
        merge_transition(&mut atoms, p.clone(), targets(&[0]));
        merge_transition(&mut atoms, p, targets(&[1]));
        assert_eq!(atoms.len(), 1);
        assert_eq!(atoms[0].1, targets(&[0, 1]));
    }
}
