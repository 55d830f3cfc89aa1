//! Inclusion, equivalence and universality subcommands, backed by
//! [symautomata::inclusion]'s three strategies. These only make sense over a predicate algebra
//! with a concrete [symautomata::predicate::Predicate::Symbol] an alphabet can be spelled out
//! in, so they're restricted to the INFA format.
use crate::automata::{self, Format, Loaded};
use clap::ValueEnum;
use std::path::PathBuf;
use std::rc::Rc;
use symautomata::error::Decision;
use symautomata::inclusion;
use symautomata::predicate::InNotInPredicate;
use symautomata::sfa::Sfa;
use thiserror::Error;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    #[default]
    PairReachability,
    Simple,
    Antichain,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] automata::Error),
    #[error("inclusion/equivalence/universality only operate on INFA files")]
    NotInfa,
}

fn load_infa(path: &PathBuf) -> Result<Sfa<InNotInPredicate>, Error> {
    match automata::load_file(path, Format::Infa)? {
        Loaded::Infa(sfa) => Ok(sfa),
        Loaded::Lfa(_) => Err(Error::NotInfa),
    }
}

pub(crate) fn parse_alphabet(alphabet: &str) -> Vec<Rc<str>> {
    alphabet
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Rc::from)
        .collect()
}

fn run_strategy(
    strategy: Strategy,
    a: &Sfa<InNotInPredicate>,
    b: &Sfa<InNotInPredicate>,
    alphabet: &[Rc<str>],
) -> Decision<Rc<str>> {
    match strategy {
        Strategy::PairReachability => inclusion::is_included_pair_reachability(a, b, alphabet),
        Strategy::Simple => inclusion::is_included_simple(a, b, alphabet),
        Strategy::Antichain => inclusion::is_included_antichain(a, b, alphabet),
    }
}

pub fn inclusion_check(
    first: &PathBuf,
    second: &PathBuf,
    alphabet: &str,
    strategy: Strategy,
) -> Result<(bool, String), Error> {
    let a = load_infa(first)?;
    let b = load_infa(second)?;
    let alphabet = parse_alphabet(alphabet);
    let decision = run_strategy(strategy, &a, &b, &alphabet);
    Ok((decision.holds, describe(&decision)))
}

pub fn equivalence_check(first: &PathBuf, second: &PathBuf, alphabet: &str) -> Result<bool, Error> {
    let a = load_infa(first)?;
    let b = load_infa(second)?;
    let alphabet = parse_alphabet(alphabet);
    Ok(inclusion::is_equivalent(&a, &b, &alphabet))
}

pub fn universal_check(path: &PathBuf, alphabet: &str) -> Result<(bool, String), Error> {
    let a = load_infa(path)?;
    let alphabet = parse_alphabet(alphabet);
    let decision = inclusion::is_universal(&a, &alphabet);
    Ok((decision.holds, describe(&decision)))
}

fn describe(decision: &Decision<Rc<str>>) -> String {
    if decision.holds {
        "holds".to_string()
    } else {
        match &decision.witness {
            Some(witness) => {
                let prefix: Vec<&str> = witness.prefix.iter().map(|s| s.as_ref()).collect();
                match &witness.cycle {
                    Some(cycle) => {
                        let cycle: Vec<&str> = cycle.iter().map(|s| s.as_ref()).collect();
                        format!(
                            "does not hold: witness {}({})^omega",
                            prefix.join("."),
                            cycle.join(".")
                        )
                    }
                    None => format!("does not hold: witness {}", prefix.join(".")),
                }
            }
            None => "does not hold".to_string(),
        }
    }
}
