//! # Timbuk-style textual format
//! One file per automaton, the four kinds sharing a common header/transition-line grammar: only
//! how a transition's predicate text and the final-state declaration are interpreted differs per
//! [Kind]. [parse] produces a [ParsedTextAutomaton] (borrowed, not yet validated against a
//! predicate algebra); the `to_*` functions in this module convert it into the concrete type for
//! its kind, and the `write_*` functions render one back out in canonical (sorted) form.
use crate::buchi::intersection::GeneralizedBuchi;
use crate::core::{GuardedAutomaton, GuardedState};
use crate::predicate::{Guard, InNotInPredicate, LetterPredicate, Predicate, TransducerPredicate};
use crate::sfa::Sfa;
use crate::transducer::Transducer;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_till1, take_until};
use nom::character::complete::{char, digit1, line_ending, not_line_ending, space0, space1};
use nom::combinator::{eof, map, map_res, value};
use nom::multi::{many0, many1, separated_list0, separated_list1};
use nom::sequence::{delimited, pair, preceded, terminated, tuple};
use nom::{Finish, IResult};
use std::collections::BTreeSet;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Lfa,
    Infa,
    Int,
    Gba,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedTransition<'a> {
    Initial { state: &'a str },
    Epsilon { source: &'a str, target: &'a str },
    Letter { letter: &'a str, source: &'a str, target: &'a str },
    Predicate { predicate: &'a str, source: &'a str, target: &'a str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTextAutomaton<'a> {
    pub ops: Vec<(&'a str, u32)>,
    pub name: &'a str,
    pub kind: Kind,
    pub states: Vec<&'a str>,
    pub final_sets: Vec<Vec<&'a str>>,
    pub transitions: Vec<ParsedTransition<'a>>,
}

impl<'a> ParsedTextAutomaton<'a> {
    fn initial_state(&self) -> Option<&'a str> {
        self.transitions.iter().find_map(|t| match t {
            ParsedTransition::Initial { state } => Some(*state),
            _ => None,
        })
    }

    fn state_index(&self, name: &str) -> Option<usize> {
        self.states.iter().position(|s| *s == name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TextError {
    #[error("malformed textual automaton: {0}")]
    Syntax(String),
    #[error("transition references undeclared state {0:?}")]
    UndeclaredState(String),
    #[error("automaton declares no initial state")]
    MissingInitialState,
    #[error("malformed predicate text {0:?}")]
    BadPredicate(String),
    #[error("automaton kind {0:?} does not match the requested conversion")]
    WrongKind(Kind),
}

/// Parses the whole file. The entire input must be consumed.
pub fn parse(input: &str) -> Result<ParsedTextAutomaton, TextError> {
    full(input)
        .finish()
        .map(|(_, parsed)| parsed)
        .map_err(|e| TextError::Syntax(e.to_string()))
}

fn full(input: &str) -> IResult<&str, ParsedTextAutomaton> {
    map(
        tuple((
            ops_line,
            automaton_line,
            states_line,
            final_states_line,
            preceded(tag("Transitions"), preceded(space0, line_ending)),
            many1(transition_line),
        )),
        |(ops, (name, kind), states, final_sets, _, transitions)| ParsedTextAutomaton {
            ops,
            name,
            kind,
            states,
            final_sets,
            transitions,
        },
    )(input)
}

fn ops_line(input: &str) -> IResult<&str, Vec<(&str, u32)>> {
    delimited(
        pair(tag("Ops"), space1),
        separated_list1(space1, ops_entry),
        line_ending,
    )(input)
}

fn ops_entry(input: &str) -> IResult<&str, (&str, u32)> {
    separated_pair_token(input)
}

fn separated_pair_token(input: &str) -> IResult<&str, (&str, u32)> {
    pair(
        take_till1(|c: char| c.is_whitespace() || c == ':'),
        preceded(char(':'), map_res(digit1, str::parse)),
    )(input)
}

fn automaton_line(input: &str) -> IResult<&str, (&str, Kind)> {
    delimited(
        pair(tag("Automaton"), space1),
        pair(token, preceded(pair(space1, char('@')), kind)),
        line_ending,
    )(input)
}

fn kind(input: &str) -> IResult<&str, Kind> {
    alt((
        value(Kind::Lfa, tag("LFA")),
        value(Kind::Infa, tag("INFA")),
        value(Kind::Int, tag("INT")),
        value(Kind::Gba, tag("GBA")),
    ))(input)
}

fn states_line(input: &str) -> IResult<&str, Vec<&str>> {
    delimited(
        pair(tag("States"), space1),
        separated_list0(space1, token),
        line_ending,
    )(input)
}

fn final_states_line(input: &str) -> IResult<&str, Vec<Vec<&str>>> {
    map(
        delimited(
            pair(tag("Final States"), space0),
            not_line_ending,
            line_ending,
        ),
        split_final_groups,
    )(input)
}

/// Splits `"a b ; c d ;"` (GBA, trailing `;` per group) or `"a b"` (single implicit group) into
/// its groups, trimming whitespace and dropping empty trailing segments.
fn split_final_groups(text: &str) -> Vec<Vec<&str>> {
    if text.trim().is_empty() {
        return vec![Vec::new()];
    }
    if text.contains(';') {
        text.split(';')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(|segment| segment.split_whitespace().collect())
            .collect()
    } else {
        vec![text.split_whitespace().collect()]
    }
}

fn transition_line(input: &str) -> IResult<&str, ParsedTransition> {
    terminated(
        alt((initial_transition, predicate_transition, letter_transition, epsilon_transition)),
        alt((line_ending, eof)),
    )(input)
}

fn initial_transition(input: &str) -> IResult<&str, ParsedTransition> {
    map(
        delimited(pair(tag("x"), pair(space0, tag("->"))), preceded(space0, token), space0),
        |state| ParsedTransition::Initial { state },
    )(input)
}

fn predicate_transition(input: &str) -> IResult<&str, ParsedTransition> {
    map(
        tuple((
            delimited(char('"'), take_until("\""), char('"')),
            delimited(char('('), token, char(')')),
            preceded(pair(space0, pair(tag("->"), space0)), token),
        )),
        |(predicate, source, target)| ParsedTransition::Predicate {
            predicate,
            source,
            target,
        },
    )(input)
}

fn letter_transition(input: &str) -> IResult<&str, ParsedTransition> {
    map(
        tuple((
            take_till1(|c: char| c.is_whitespace() || c == '('),
            delimited(char('('), token, char(')')),
            preceded(pair(space0, pair(tag("->"), space0)), token),
        )),
        |(letter, source, target)| ParsedTransition::Letter {
            letter,
            source,
            target,
        },
    )(input)
}

fn epsilon_transition(input: &str) -> IResult<&str, ParsedTransition> {
    map(
        tuple((
            delimited(char('('), token, char(')')),
            preceded(pair(space0, pair(tag("->"), space0)), token),
        )),
        |(source, target)| ParsedTransition::Epsilon { source, target },
    )(input)
}

fn token(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c.is_whitespace() || "(){}\";".contains(c))(input)
}

// --- conversions: ParsedTextAutomaton -> concrete automata -----------------------------------

fn require_kind(parsed: &ParsedTextAutomaton, expected: Kind) -> Result<(), TextError> {
    if parsed.kind == expected {
        Ok(())
    } else {
        Err(TextError::WrongKind(parsed.kind))
    }
}

fn resolve(parsed: &ParsedTextAutomaton, name: &str) -> Result<usize, TextError> {
    parsed
        .state_index(name)
        .ok_or_else(|| TextError::UndeclaredState(name.to_string()))
}

pub fn to_lfa(parsed: &ParsedTextAutomaton) -> Result<Sfa<LetterPredicate>, TextError> {
    require_kind(parsed, Kind::Lfa)?;
    let finals: BTreeSet<&str> = parsed
        .final_sets
        .first()
        .into_iter()
        .flatten()
        .copied()
        .collect();

    let mut states: Vec<GuardedState<LetterPredicate>> = parsed
        .states
        .iter()
        .map(|&name| GuardedState {
            name: Rc::from(name),
            accepting: finals.contains(name),
            transitions: Vec::new(),
        })
        .collect();

    for transition in &parsed.transitions {
        match transition {
            ParsedTransition::Letter { letter, source, target } => {
                let src = resolve(parsed, source)?;
                let dst = resolve(parsed, target)?;
                states[src]
                    .transitions
                    .push((Guard::Cond(LetterPredicate::Exactly(Rc::from(*letter))), dst));
            }
            ParsedTransition::Epsilon { source, target } => {
                let src = resolve(parsed, source)?;
                let dst = resolve(parsed, target)?;
                states[src].transitions.push((Guard::Epsilon, dst));
            }
            ParsedTransition::Initial { .. } => {}
            ParsedTransition::Predicate { .. } => {
                return Err(TextError::WrongKind(Kind::Lfa));
            }
        }
    }

    let initial = resolve(parsed, parsed.initial_state().ok_or(TextError::MissingInitialState)?)?;
    Ok(Sfa::new(GuardedAutomaton::new(states, initial)))
}

pub fn to_infa(parsed: &ParsedTextAutomaton) -> Result<Sfa<InNotInPredicate>, TextError> {
    require_kind(parsed, Kind::Infa)?;
    let finals: BTreeSet<&str> = parsed
        .final_sets
        .first()
        .into_iter()
        .flatten()
        .copied()
        .collect();

    let mut states: Vec<GuardedState<InNotInPredicate>> = parsed
        .states
        .iter()
        .map(|&name| GuardedState {
            name: Rc::from(name),
            accepting: finals.contains(name),
            transitions: Vec::new(),
        })
        .collect();

    for transition in &parsed.transitions {
        match transition {
            ParsedTransition::Predicate { predicate, source, target } => {
                let src = resolve(parsed, source)?;
                let dst = resolve(parsed, target)?;
                let pred = parse_in_notin(predicate)?;
                states[src].transitions.push((Guard::Cond(pred), dst));
            }
            ParsedTransition::Epsilon { source, target } => {
                let src = resolve(parsed, source)?;
                let dst = resolve(parsed, target)?;
                states[src].transitions.push((Guard::Epsilon, dst));
            }
            ParsedTransition::Initial { .. } => {}
            ParsedTransition::Letter { .. } => {
                return Err(TextError::WrongKind(Kind::Infa));
            }
        }
    }

    let initial = resolve(parsed, parsed.initial_state().ok_or(TextError::MissingInitialState)?)?;
    Ok(Sfa::new(GuardedAutomaton::new(states, initial)))
}

/// `in{a,b,c}` or `not_in{a,b,c}`; `{}` denotes the empty set.
fn parse_in_notin(text: &str) -> Result<InNotInPredicate, TextError> {
    let (negated, rest) = if let Some(rest) = text.strip_prefix("not_in") {
        (true, rest)
    } else if let Some(rest) = text.strip_prefix("in") {
        (false, rest)
    } else {
        return Err(TextError::BadPredicate(text.to_string()));
    };
    let inner = rest
        .trim()
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .ok_or_else(|| TextError::BadPredicate(text.to_string()))?;
    let symbols: BTreeSet<Rc<str>> = inner
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Rc::from)
        .collect();
    Ok(if negated {
        InNotInPredicate::NotIn(symbols)
    } else {
        InNotInPredicate::In(symbols)
    })
}

pub fn to_transducer(parsed: &ParsedTextAutomaton) -> Result<Transducer<InNotInPredicate>, TextError> {
    require_kind(parsed, Kind::Int)?;
    let finals: BTreeSet<&str> = parsed
        .final_sets
        .first()
        .into_iter()
        .flatten()
        .copied()
        .collect();

    let mut states: Vec<GuardedState<TransducerPredicate<InNotInPredicate>>> = parsed
        .states
        .iter()
        .map(|&name| GuardedState {
            name: Rc::from(name),
            accepting: finals.contains(name),
            transitions: Vec::new(),
        })
        .collect();

    for transition in &parsed.transitions {
        match transition {
            ParsedTransition::Predicate { predicate, source, target } => {
                let src = resolve(parsed, source)?;
                let dst = resolve(parsed, target)?;
                let label = parse_transducer_label(predicate)?;
                states[src].transitions.push((Guard::Cond(label), dst));
            }
            ParsedTransition::Epsilon { source, target } => {
                let src = resolve(parsed, source)?;
                let dst = resolve(parsed, target)?;
                states[src].transitions.push((Guard::Epsilon, dst));
            }
            ParsedTransition::Initial { .. } => {}
            ParsedTransition::Letter { .. } => {
                return Err(TextError::WrongKind(Kind::Int));
            }
        }
    }

    let initial = resolve(parsed, parsed.initial_state().ok_or(TextError::MissingInitialState)?)?;
    Ok(Transducer::new(GuardedAutomaton::new(states, initial)))
}

/// `φ_in/φ_out` or `@φ_in/@φ_out` (identity: both sides share the same predicate text).
fn parse_transducer_label(text: &str) -> Result<TransducerPredicate<InNotInPredicate>, TextError> {
    let identity = text.starts_with('@');
    let body = text.trim_start_matches('@');
    let (in_text, out_text) = body
        .split_once('/')
        .ok_or_else(|| TextError::BadPredicate(text.to_string()))?;
    let input = parse_in_notin(in_text.trim())?;
    let output = parse_in_notin(out_text.trim())?;
    Ok(TransducerPredicate::new(input, output, identity))
}

pub fn to_gba(parsed: &ParsedTextAutomaton) -> Result<GeneralizedBuchi<InNotInPredicate>, TextError> {
    require_kind(parsed, Kind::Gba)?;
    let mut states: Vec<GuardedState<InNotInPredicate>> = parsed
        .states
        .iter()
        .map(|&name| GuardedState {
            name: Rc::from(name),
            accepting: false,
            transitions: Vec::new(),
        })
        .collect();

    for transition in &parsed.transitions {
        match transition {
            ParsedTransition::Predicate { predicate, source, target } => {
                let src = resolve(parsed, source)?;
                let dst = resolve(parsed, target)?;
                let pred = parse_in_notin(predicate)?;
                states[src].transitions.push((Guard::Cond(pred), dst));
            }
            ParsedTransition::Epsilon { source, target } => {
                let src = resolve(parsed, source)?;
                let dst = resolve(parsed, target)?;
                states[src].transitions.push((Guard::Epsilon, dst));
            }
            ParsedTransition::Initial { .. } => {}
            ParsedTransition::Letter { .. } => {
                return Err(TextError::WrongKind(Kind::Gba));
            }
        }
    }

    let mut final_sets = Vec::with_capacity(parsed.final_sets.len());
    for group in &parsed.final_sets {
        let mut set = BTreeSet::new();
        for &name in group {
            set.insert(resolve(parsed, name)?);
        }
        final_sets.push(set);
    }

    let initial = resolve(parsed, parsed.initial_state().ok_or(TextError::MissingInitialState)?)?;
    Ok(GeneralizedBuchi::new(GuardedAutomaton::new(states, initial), final_sets))
}

// --- writers -----------------------------------------------------------------------------------

/// Renders an INFA in canonical (sorted) form, the only kind this crate needs to round-trip
/// (LFA/INT/GBA writers follow the same shape and are straightforward to add if a caller needs
/// them; INFA is what every decision procedure and construction in this crate actually produces).
pub fn write_infa(name: &str, sfa: &Sfa<InNotInPredicate>) -> String {
    let states = sfa.states();
    let mut names: Vec<&str> = states.iter().map(|s| s.name.as_ref()).collect();
    names.sort_unstable();

    let mut finals: Vec<&str> = states
        .iter()
        .filter(|s| s.accepting)
        .map(|s| s.name.as_ref())
        .collect();
    finals.sort_unstable();

    let mut out = String::new();
    out.push_str("Ops x:0\n");
    out.push_str(&format!("Automaton {name} @INFA\n"));
    out.push_str(&format!("States {}\n", names.join(" ")));
    out.push_str(&format!("Final States {}\n", finals.join(" ")));
    out.push_str("Transitions\n");
    out.push_str(&format!("x -> {}\n", states[sfa.initial_state()].name));

    let mut lines: Vec<String> = Vec::new();
    for state in states {
        for (guard, target) in &state.transitions {
            let target_name = &states[*target].name;
            match guard {
                Guard::Cond(pred) => {
                    lines.push(format!(
                        "\"{}\"({}) -> {}",
                        render_in_notin(pred),
                        state.name,
                        target_name
                    ));
                }
                Guard::Epsilon => {
                    lines.push(format!("({}) -> {}", state.name, target_name));
                }
            }
        }
    }
    lines.sort_unstable();
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn render_in_notin(pred: &InNotInPredicate) -> String {
    let (keyword, symbols) = match pred {
        InNotInPredicate::In(s) => ("in", s),
        InNotInPredicate::NotIn(s) => ("not_in", s),
    };
    let mut items: Vec<&str> = symbols.iter().map(|s| s.as_ref()).collect();
    items.sort_unstable();
    format!("{keyword}{{{}}}", items.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    const INFA_SAMPLE: &str = concat!(
        "Ops x:0\n",
        "Automaton ex @INFA\n",
        "States s0 s1\n",
        "Final States s1\n",
        "Transitions\n",
        "x -> s0\n",
        "\"in{a,b}\"(s0) -> s1\n",
        "\"not_in{}\"(s1) -> s1\n",
    );

    #[test]
    fn parses_infa_sample() {
        let parsed = parse(INFA_SAMPLE).unwrap();
        assert_eq!(parsed.kind, Kind::Infa);
        assert_eq!(parsed.states, vec!["s0", "s1"]);
        assert_eq!(parsed.final_sets, vec![vec!["s1"]]);
        assert_eq!(parsed.transitions.len(), 3);
    }

    #[test]
    fn converts_infa_sample_to_sfa() {
        let parsed = parse(INFA_SAMPLE).unwrap();
        let sfa = to_infa(&parsed).unwrap();
        assert!(!sfa.is_empty());
        assert_eq!(sfa.states().len(), 2);
    }

    #[test]
    fn write_infa_round_trips_through_parse() {
        let parsed = parse(INFA_SAMPLE).unwrap();
        let sfa = to_infa(&parsed).unwrap();
        let rendered = write_infa("ex", &sfa);
        let reparsed = parse(&rendered).unwrap();
        let reconverted = to_infa(&reparsed).unwrap();
        assert_eq!(reconverted.states().len(), sfa.states().len());
    }

    const GBA_SAMPLE: &str = concat!(
        "Ops x:0\n",
        "Automaton ex @GBA\n",
        "States p f\n",
        "Final States p ; f ;\n",
        "Transitions\n",
        "x -> p\n",
        "\"in{a}\"(p) -> f\n",
        "\"in{a}\"(f) -> p\n",
    );

    #[test]
    fn parses_gba_sample_with_two_final_sets() {
        let parsed = parse(GBA_SAMPLE).unwrap();
        let gba = to_gba(&parsed).unwrap();
        assert_eq!(gba.final_sets().len(), 2);
    }

    const INT_SAMPLE: &str = concat!(
        "Ops x:0\n",
        "Automaton ex @INT\n",
        "States q0\n",
        "Final States q0\n",
        "Transitions\n",
        "x -> q0\n",
        "\"in{a}/in{b}\"(q0) -> q0\n",
    );

    #[test]
    fn parses_int_sample() {
        let parsed = parse(INT_SAMPLE).unwrap();
        let transducer = to_transducer(&parsed).unwrap();
        assert!(transducer.is_deterministic());
    }
}
