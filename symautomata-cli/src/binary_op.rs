//! Single- and double-automaton constructions: determinize, minimize, complement, union,
//! intersection. Shared dispatch on [Loaded] so each operation is written once, generically over
//! the predicate algebra, and applied to whichever format the caller loaded.
use crate::automata::{Format, Loaded};
use symautomata::core::GuardedAutomaton;
use symautomata::predicate::Predicate;
use symautomata::sfa::Sfa;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("inputs have different formats ({0} vs {1}); pass --format consistently for both")]
    FormatMismatch(&'static str, &'static str),
}

pub fn determinize(loaded: Loaded) -> Loaded {
    match loaded {
        Loaded::Lfa(sfa) => Loaded::Lfa(sfa.determinize()),
        Loaded::Infa(sfa) => Loaded::Infa(sfa.determinize()),
    }
}

pub fn minimize(loaded: Loaded) -> Loaded {
    match loaded {
        Loaded::Lfa(sfa) => Loaded::Lfa(sfa.minimize()),
        Loaded::Infa(sfa) => Loaded::Infa(sfa.minimize()),
    }
}

pub fn complement(loaded: Loaded) -> Loaded {
    match loaded {
        Loaded::Lfa(sfa) => Loaded::Lfa(sfa.complement()),
        Loaded::Infa(sfa) => Loaded::Infa(sfa.complement()),
    }
}

pub fn union(a: Loaded, b: Loaded) -> Result<Loaded, Error> {
    match (a, b) {
        (Loaded::Lfa(x), Loaded::Lfa(y)) => Ok(Loaded::Lfa(boolean_op(&x, &y, |p, q| p || q))),
        (Loaded::Infa(x), Loaded::Infa(y)) => Ok(Loaded::Infa(boolean_op(&x, &y, |p, q| p || q))),
        (a, b) => Err(Error::FormatMismatch(a.format().label(), b.format().label())),
    }
}

pub fn intersection(a: Loaded, b: Loaded) -> Result<Loaded, Error> {
    match (a, b) {
        (Loaded::Lfa(x), Loaded::Lfa(y)) => Ok(Loaded::Lfa(boolean_op(&x, &y, |p, q| p && q))),
        (Loaded::Infa(x), Loaded::Infa(y)) => Ok(Loaded::Infa(boolean_op(&x, &y, |p, q| p && q))),
        (a, b) => Err(Error::FormatMismatch(a.format().label(), b.format().label())),
    }
}

/// Determinizes both operands, then runs [GuardedAutomaton::product_construction] over the
/// resulting complete transition functions — the accept closure distinguishes union from
/// intersection, matching the teacher's DFA-level `union`/`intersection` pair built on one shared
/// product routine.
fn boolean_op<P: Predicate>(a: &Sfa<P>, b: &Sfa<P>, accept: impl Fn(bool, bool) -> bool) -> Sfa<P> {
    let da = a.determinize();
    let db = b.determinize();
    let product = GuardedAutomaton::product_construction(da.automaton(), db.automaton(), accept);
    Sfa::new(product)
}

pub fn require_same_format(a: &Loaded, b: &Loaded) -> Result<Format, Error> {
    if a.format() == b.format() {
        Ok(a.format())
    } else {
        Err(Error::FormatMismatch(a.format().label(), b.format().label()))
    }
}
