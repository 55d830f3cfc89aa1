//! # symautomata
//!
//! `symautomata` is a Rust library for symbolic finite automata (SFA), symbolic finite
//! transducers and semi-deterministic Büchi automata (sdBA) over user-defined predicate
//! algebras. Where a classical automaton labels a transition with a concrete symbol, a symbolic
//! automaton labels it with a predicate drawn from a Boolean algebra ([predicate::Predicate]);
//! the same graph algorithms then work uniformly whether that algebra is "one alphabet letter",
//! "a set of letters", or an arbitrary user-defined domain.
//!
//! ## Usage
//!
//! ```rust
//! use symautomata::predicate::InNotInPredicate;
//! use symautomata::sfa::Sfa;
//! use symautomata::core::{GuardedAutomaton, GuardedState};
//! use symautomata::predicate::Guard;
//! use std::rc::Rc;
//!
//! fn main() {
//!     let a: Rc<str> = Rc::from("a");
//!     let sfa = Sfa::new(GuardedAutomaton::new(
//!         vec![
//!             GuardedState {
//!                 name: Rc::from("s0"),
//!                 accepting: false,
//!                 transitions: vec![(Guard::Cond(InNotInPredicate::in_set([a])), 1)],
//!             },
//!             GuardedState {
//!                 name: Rc::from("s1"),
//!                 accepting: true,
//!                 transitions: vec![],
//!             },
//!         ],
//!         0,
//!     ));
//!     assert!(!sfa.is_empty());
//! }
//! ```
//!
//! ## Module layout
//!
//! * [predicate] — the [predicate::Predicate] trait and the [predicate::Guard] enum shared by
//!   every machine kind, plus the two ready-made algebras [predicate::LetterPredicate] and
//!   [predicate::InNotInPredicate], and [predicate::TransducerPredicate] for transducer labels.
//! * [core] — [core::GuardedAutomaton], the state/transition table and graph services
//!   (reachability, product construction, disjoint union) shared by every predicate-guarded
//!   machine.
//! * [dfa] / [nfa] — classical, concrete-alphabet deterministic and nondeterministic automata,
//!   kept for the parts of the text format and CLI that operate on explicit transition tables.
//! * [sfa] — [sfa::Sfa], symbolic finite automata: determinization, completion, minimization,
//!   complementation and simulation preorder.
//! * [inclusion] — language inclusion/equivalence/universality over [sfa::Sfa], via three
//!   strategies of increasing sophistication.
//! * [buchi] — [buchi::SemiDeterministicBuchi], semi-deterministic Büchi automata and the NCSB
//!   complementation family.
//! * [transducer] — [transducer::Transducer], symbolic finite transducers: composition and
//!   application to an [sfa::Sfa].
//! * [parser] — text-format parsing: [parser::dfa]/[parser::nfa] for the classical transition
//!   table format, [parser::text] for the Timbuk-style symbolic format.
//! * [error] — shared error and decision-result types.

pub mod buchi;
pub mod core;
pub mod dfa;
pub mod error;
pub mod inclusion;
pub mod nfa;
pub mod parser;
pub mod predicate;
pub mod sfa;
mod table;
pub mod transducer;
mod util;

#[cfg(test)]
mod tests;
