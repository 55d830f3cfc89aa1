//! Semi-deterministic Büchi subcommands: NCSB complementation (the four variants) and
//! generalized Büchi intersection, grounded on [symautomata::buchi].
use crate::automata::{self, Format, Loaded};
use crate::equivalence::parse_alphabet;
use clap::ValueEnum;
use std::path::PathBuf;
use symautomata::buchi::ncsb::{ncsb_basic, ncsb_early_flush, ncsb_lazy, OnTheFly};
use symautomata::buchi::intersection::intersect;
use symautomata::buchi::SemiDeterministicBuchi;
use symautomata::error::{Decision, PreconditionError};
use symautomata::parser::text;
use symautomata::predicate::InNotInPredicate;
use symautomata::sfa::Sfa;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NcsbVariant {
    #[default]
    Basic,
    Lazy,
    EarlyFlush,
    OnTheFly,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] automata::Error),
    #[error("ncsb-complement and buchi-intersect only operate on INFA files")]
    NotInfa,
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
}

fn load_infa(path: &PathBuf) -> Result<Sfa<InNotInPredicate>, Error> {
    match automata::load_file(path, Format::Infa)? {
        Loaded::Infa(sfa) => Ok(sfa),
        Loaded::Lfa(_) => Err(Error::NotInfa),
    }
}

pub fn ncsb_complement(path: &PathBuf, variant: NcsbVariant, alphabet: &str) -> Result<String, Error> {
    let sfa = load_infa(path)?;
    let sdba = SemiDeterministicBuchi::try_new(sfa.automaton().clone())?;

    if let NcsbVariant::OnTheFly = variant {
        let on_the_fly = OnTheFly::new(&sdba);
        let decision = on_the_fly.decide(&parse_alphabet(alphabet));
        return Ok(format!("complement {}", describe_emptiness(&decision)));
    }

    let complement = match variant {
        NcsbVariant::Basic => ncsb_basic(&sdba),
        NcsbVariant::Lazy => ncsb_lazy(&sdba),
        NcsbVariant::EarlyFlush => ncsb_early_flush(&sdba),
        NcsbVariant::OnTheFly => unreachable!(),
    };
    Ok(text::write_infa("complement", &Sfa::new(complement)))
}

fn describe_emptiness(decision: &Decision<Rc<str>>) -> String {
    if decision.holds {
        "is empty".to_string()
    } else {
        let witness = decision.witness.as_ref().expect("nonempty decision carries a witness");
        let prefix: Vec<&str> = witness.prefix.iter().map(|s| s.as_ref()).collect();
        let cycle: Vec<&str> = witness
            .cycle
            .as_ref()
            .expect("Büchi emptiness witnesses are always lassos")
            .iter()
            .map(|s| s.as_ref())
            .collect();
        format!("is nonempty: witness {}({})^omega", prefix.join("."), cycle.join("."))
    }
}

pub fn buchi_intersect(first: &PathBuf, second: &PathBuf, degeneralize: bool) -> Result<String, Error> {
    let a = load_infa(first)?;
    let b = load_infa(second)?;
    let product = intersect(a.automaton(), b.automaton());

    if degeneralize {
        let single = product.degeneralize();
        Ok(text::write_infa("intersection", &Sfa::new(single)))
    } else {
        Ok(format!(
            "{} states, {} acceptance sets (pass --degeneralize for a single-set Büchi automaton)\n{}",
            product.automaton().states().len(),
            product.final_sets().len(),
            text::write_infa("intersection", &Sfa::new(product.automaton().clone()))
        ))
    }
}
