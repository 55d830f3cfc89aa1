//! Transducer subcommands: composition, application to an INFA automaton, and the two word-level
//! queries, grounded on [symautomata::transducer].
use crate::automata;
use crate::equivalence::parse_alphabet;
use std::path::PathBuf;
use symautomata::error::PreconditionError;
use symautomata::parser::text;
use symautomata::predicate::InNotInPredicate;
use symautomata::sfa::Sfa;
use symautomata::transducer::Transducer;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] automata::Error),
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
}

fn load_transducer(path: &PathBuf) -> Result<Transducer<InNotInPredicate>, Error> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| automata::Error::File(path.clone(), e))?;
    let parsed = text::parse(&contents).map_err(|e| automata::Error::Parse(path.clone(), e))?;
    let transducer =
        text::to_transducer(&parsed).map_err(|e| automata::Error::Parse(path.clone(), e))?;
    Ok(transducer)
}

fn load_infa(path: &PathBuf) -> Result<Sfa<InNotInPredicate>, Error> {
    match automata::load_file(path, automata::Format::Infa)? {
        automata::Loaded::Infa(sfa) => Ok(sfa),
        automata::Loaded::Lfa(_) => Err(Error::Load(automata::Error::Parse(
            path.clone(),
            text::TextError::WrongKind(text::Kind::Int),
        ))),
    }
}

pub fn compose(first: &PathBuf, second: &PathBuf) -> Result<String, Error> {
    let a = load_transducer(first)?;
    let b = load_transducer(second)?;
    let composed = a.compose(&b)?;
    Ok(render(&composed))
}

pub fn apply(transducer: &PathBuf, input: &PathBuf) -> Result<String, Error> {
    let t = load_transducer(transducer)?;
    let sfa = load_infa(input)?;
    let image = t.apply(&sfa);
    Ok(text::write_infa("image", &image))
}

pub fn check_translation(transducer: &PathBuf, input: &str, output: &str) -> Result<bool, Error> {
    let t = load_transducer(transducer)?;
    let input = parse_alphabet(input);
    let output = parse_alphabet(output);
    Ok(t.check_translation(&input, &output))
}

pub fn translate_word(
    transducer: &PathBuf,
    input: &str,
    alphabet: &str,
) -> Result<Option<String>, Error> {
    let t = load_transducer(transducer)?;
    let input = parse_alphabet(input);
    let alphabet = parse_alphabet(alphabet);
    Ok(t
        .translate_word(&input, &alphabet)
        .map(|out| out.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(".")))
}

fn render(t: &Transducer<InNotInPredicate>) -> String {
    use std::fmt::Write;
    let automaton = t.automaton();
    let mut out = String::new();
    let _ = writeln!(out, "initial: q{}", automaton.initial_state());
    for (idx, state) in automaton.states().iter().enumerate() {
        let marker = if state.accepting { "*" } else { " " };
        let _ = writeln!(out, "{marker}q{idx} ({})", state.name);
        for (guard, target) in &state.transitions {
            match guard.as_predicate() {
                Some(label) => {
                    let _ = writeln!(out, "    {label:?} -> q{target}");
                }
                None => {
                    let _ = writeln!(out, "    eps -> q{target}");
                }
            }
        }
    }
    out
}
