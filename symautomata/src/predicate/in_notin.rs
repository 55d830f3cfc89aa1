//! Predicate over a symbol's membership (or non-membership) in a finite set.
use crate::predicate::Predicate;
use std::collections::BTreeSet;
use std::rc::Rc;

/// `In(S)` is satisfied by symbols in `S`; `NotIn(S)` is satisfied by symbols outside `S`. This is
/// the standard "symbolic alphabet" predicate: it stays compact regardless of how large the
/// concrete alphabet is, since `NotIn({})` denotes "any symbol" without enumerating it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InNotInPredicate {
    In(BTreeSet<Rc<str>>),
    NotIn(BTreeSet<Rc<str>>),
}

impl Predicate for InNotInPredicate {
    type Symbol = Rc<str>;

    fn none() -> Self {
        InNotInPredicate::In(BTreeSet::new())
    }

    fn universal() -> Self {
        InNotInPredicate::NotIn(BTreeSet::new())
    }

    fn negate(&self) -> Self {
        match self {
            InNotInPredicate::In(s) => InNotInPredicate::NotIn(s.clone()),
            InNotInPredicate::NotIn(s) => InNotInPredicate::In(s.clone()),
        }
    }

    fn and(&self, other: &Self) -> Self {
        use InNotInPredicate::*;
        match (self, other) {
            (NotIn(a), NotIn(b)) => NotIn(a.union(b).cloned().collect()),
            (NotIn(a), In(b)) => In(b.difference(a).cloned().collect()),
            (In(a), NotIn(b)) => In(a.difference(b).cloned().collect()),
            (In(a), In(b)) => In(a.intersection(b).cloned().collect()),
        }
    }

    fn or(&self, other: &Self) -> Self {
        use InNotInPredicate::*;
        match (self, other) {
            (NotIn(a), NotIn(b)) => NotIn(a.intersection(b).cloned().collect()),
            (NotIn(a), In(b)) => NotIn(a.difference(b).cloned().collect()),
            (In(a), NotIn(b)) => NotIn(b.difference(a).cloned().collect()),
            (In(a), In(b)) => In(a.union(b).cloned().collect()),
        }
    }

    fn is_subset_of(&self, other: &Self) -> bool {
        use InNotInPredicate::*;
        match (self, other) {
            (In(a), In(b)) => a.is_subset(b),
            (NotIn(a), NotIn(b)) => a.is_superset(b),
            _ => self.and(&other.negate()) == Self::none(),
        }
    }

    fn is_satisfiable(&self) -> bool {
        !matches!(self, InNotInPredicate::In(s) if s.is_empty())
    }

    fn has_symbol(&self, symbol: &Self::Symbol) -> bool {
        match self {
            InNotInPredicate::In(s) => s.contains(symbol),
            InNotInPredicate::NotIn(s) => !s.contains(symbol),
        }
    }
}

impl InNotInPredicate {
    pub fn in_set(symbols: impl IntoIterator<Item = Rc<str>>) -> Self {
        InNotInPredicate::In(symbols.into_iter().collect())
    }

    pub fn not_in_set(symbols: impl IntoIterator<Item = Rc<str>>) -> Self {
        InNotInPredicate::NotIn(symbols.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Rc<str> {
        Rc::from(s)
    }

    #[test]
    fn negate_is_involutive() {
        let p = InNotInPredicate::in_set([sym("a"), sym("b")]);
        assert_eq!(p.negate().negate(), p);
    }

    #[test]
    fn not_in_empty_is_universal() {
        let p = InNotInPredicate::not_in_set([]);
        assert!(p.is_universal());
        assert!(p.has_symbol(&sym("anything")));
    }

    #[test]
    fn conjunction_of_in_and_not_in_is_difference() {
        let a = InNotInPredicate::in_set([sym("a"), sym("b"), sym("c")]);
        let b = InNotInPredicate::not_in_set([sym("b")]);
        let expected = InNotInPredicate::in_set([sym("a"), sym("c")]);
        assert_eq!(a.and(&b), expected);
    }

    #[test]
    fn subset_reflexive_and_antisymmetric() {
        let a = InNotInPredicate::in_set([sym("a")]);
        let b = InNotInPredicate::in_set([sym("a"), sym("b")]);
        assert!(a.is_subset_of(&a));
        assert!(a.is_subset_of(&b));
        assert!(!b.is_subset_of(&a));
    }
}
