//! # NCSB complementation family
//! Complementing a semi-deterministic Büchi automaton by tracking a product state `(N, C, S, B)`:
//! `N ⊆ Q1` the nondeterministic guess still being tracked, `C ⊆ Q2` runs that must eventually see
//! an accepting state again, `S ⊆ Q2` runs hypothesized to never see one again, `B ⊆ C` the
//! current round's outstanding obligation. A product state is accepting in the complement iff
//! `B = ∅`. [ncsb_basic] builds the whole reachable product eagerly; [OnTheFly] exposes the same
//! step function without precomputing reachability, for exploration that can stop as soon as a
//! counterexample or emptiness is settled; [ncsb_lazy] and [ncsb_early_flush] are the two
//! described refinements.
use crate::buchi::{Partition, SemiDeterministicBuchi};
use crate::core::{GuardedAutomaton, GuardedState};
use crate::error::{Bound, Decision, PreconditionError, Witness};
use crate::inclusion::pick_symbol;
use crate::predicate::{Guard, Predicate};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::rc::Rc;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NcsbState {
    pub n: BTreeSet<usize>,
    pub c: BTreeSet<usize>,
    pub s: BTreeSet<usize>,
    pub b: BTreeSet<usize>,
}

impl NcsbState {
    /// Accepting in the complement iff the round's obligation has been fully discharged.
    pub fn is_accepting(&self) -> bool {
        self.b.is_empty()
    }

    fn label(&self) -> String {
        format!(
            "({{{}}},{{{}}},{{{}}},{{{}}})",
            list(&self.n),
            list(&self.c),
            list(&self.s),
            list(&self.b)
        )
    }
}

fn list(set: &BTreeSet<usize>) -> String {
    set.iter().map(usize::to_string).collect::<Vec<_>>().join(",")
}

fn epsilon_closure<P: Predicate>(automaton: &GuardedAutomaton<P>, state: usize) -> BTreeSet<usize> {
    let mut closure = BTreeSet::new();
    let mut queue = VecDeque::new();
    closure.insert(state);
    queue.push_back(state);
    while let Some(s) = queue.pop_front() {
        for (guard, target) in &automaton.states()[s].transitions {
            if guard.is_epsilon() && closure.insert(*target) {
                queue.push_back(*target);
            }
        }
    }
    closure
}

/// Pads every state with a transition on the negation of its existing guards into a shared
/// non-accepting sink, so the empty tuple `(∅,∅,∅,∅)` is reachable only by design, never by a
/// missing transition.
fn completed<P: Predicate>(automaton: &GuardedAutomaton<P>) -> GuardedAutomaton<P> {
    let sink = automaton.states().len();
    let mut states: Vec<GuardedState<P>> = automaton.states().to_vec();
    for state in states.iter_mut() {
        let covered = state
            .transitions
            .iter()
            .filter_map(|(g, _)| g.as_predicate())
            .fold(P::none(), |acc, p| acc.or(p));
        let uncovered = covered.negate();
        if uncovered.is_satisfiable() {
            state.transitions.push((Guard::Cond(uncovered), sink));
        }
    }
    states.push(GuardedState {
        name: Rc::from("sink"),
        accepting: false,
        transitions: vec![(Guard::Cond(P::universal()), sink)],
    });
    GuardedAutomaton::new(states, automaton.initial_state())
}

fn targets_within<P: Predicate>(
    automaton: &GuardedAutomaton<P>,
    set: &BTreeSet<usize>,
    atom: &P,
    allowed: &BTreeSet<usize>,
) -> BTreeSet<usize> {
    set.iter()
        .flat_map(|&s| {
            automaton.states()[s].transitions.iter().filter_map(|(guard, target)| {
                match guard {
                    Guard::Cond(pred) if allowed.contains(target) && atom.is_subset_of(pred) => {
                        Some(*target)
                    }
                    _ => None,
                }
            })
        })
        .collect()
}

fn successors_on_atom<P: Predicate>(
    automaton: &GuardedAutomaton<P>,
    state: usize,
    atom: &P,
) -> Vec<usize> {
    automaton.states()[state]
        .transitions
        .iter()
        .filter_map(|(guard, target)| match guard {
            Guard::Cond(pred) if atom.is_subset_of(pred) => Some(*target),
            _ => None,
        })
        .collect()
}

fn step_atoms<P: Predicate>(automaton: &GuardedAutomaton<P>, state: &NcsbState) -> Vec<P> {
    let mut atoms = vec![P::universal()];
    for &s in state.n.iter().chain(state.c.iter()).chain(state.s.iter()) {
        for (guard, _) in &automaton.states()[s].transitions {
            if let Guard::Cond(pred) = guard {
                atoms = crate::sfa::refine_atoms(atoms, pred);
            }
        }
    }
    atoms
}

fn powerset(set: &BTreeSet<usize>) -> Vec<BTreeSet<usize>> {
    let items: Vec<usize> = set.iter().copied().collect();
    let mut out = vec![BTreeSet::new()];
    for item in items {
        let additions: Vec<BTreeSet<usize>> = out
            .iter()
            .map(|s| {
                let mut s = s.clone();
                s.insert(item);
                s
            })
            .collect();
        out.extend(additions);
    }
    out
}

fn initial_state<P: Predicate>(automaton: &GuardedAutomaton<P>, partition: &Partition) -> NcsbState {
    let initial = epsilon_closure(automaton, automaton.initial_state());
    let n: BTreeSet<usize> = initial.intersection(&partition.q1).copied().collect();
    let c: BTreeSet<usize> = initial.intersection(&partition.q2).copied().collect();
    NcsbState {
        n,
        c: c.clone(),
        s: BTreeSet::new(),
        b: c,
    }
}

/// Basic successor rule, spec.md §4.6 steps 1–6: no shortcuts, every subset of the possible-S
/// candidates is explored as its own branch.
fn step_basic<P: Predicate>(
    automaton: &GuardedAutomaton<P>,
    partition: &Partition,
    state: &NcsbState,
    atom: &P,
) -> Vec<NcsbState> {
    let n_next = targets_within(automaton, &state.n, atom, &partition.q1);
    let mut c_prime = targets_within(automaton, &state.n, atom, &partition.q2);

    let mut possible_s: BTreeSet<usize> = BTreeSet::new();
    for &q in &state.c {
        let q_final = automaton.states()[q].accepting;
        for r in successors_on_atom(automaton, q, atom) {
            if !partition.q2.contains(&r) {
                continue;
            }
            let r_final = automaton.states()[r].accepting;
            if q_final && !r_final {
                possible_s.insert(r);
            } else {
                c_prime.insert(r);
            }
        }
    }

    let mut s_prime: BTreeSet<usize> = BTreeSet::new();
    for &q in &state.s {
        for r in successors_on_atom(automaton, q, atom) {
            if !partition.q2.contains(&r) {
                continue;
            }
            if automaton.states()[r].accepting || c_prime.contains(&r) {
                return Vec::new();
            }
            s_prime.insert(r);
        }
    }

    branch(automaton, partition, state, atom, &n_next, &c_prime, &s_prime, &possible_s)
}

#[allow(clippy::too_many_arguments)]
fn branch<P: Predicate>(
    automaton: &GuardedAutomaton<P>,
    partition: &Partition,
    state: &NcsbState,
    atom: &P,
    n_next: &BTreeSet<usize>,
    c_prime: &BTreeSet<usize>,
    s_prime: &BTreeSet<usize>,
    possible_s: &BTreeSet<usize>,
) -> Vec<NcsbState> {
    let mut branches = Vec::new();
    for x in powerset(possible_s) {
        let c_a: BTreeSet<usize> = c_prime.difference(&x).copied().collect();
        let s_a: BTreeSet<usize> = s_prime.union(&x).copied().collect();
        if c_a.is_disjoint(&s_a) {
            let b_a = if state.b.is_empty() {
                c_a.clone()
            } else {
                targets_within(automaton, &state.b, atom, &partition.q2)
                    .intersection(&c_a)
                    .copied()
                    .collect()
            };
            branches.push(NcsbState {
                n: n_next.clone(),
                c: c_a,
                s: s_a,
                b: b_a,
            });
        }

        let c_b: BTreeSet<usize> = c_prime.union(&x).copied().collect();
        if c_b.is_disjoint(s_prime) {
            branches.push(NcsbState {
                n: n_next.clone(),
                c: c_b,
                s: s_prime.clone(),
                b: BTreeSet::new(),
            });
        }
    }
    branches
}

/// Lazy variant (spec.md §4.6 "Lazy variant"): while the round's obligation `B` is still open,
/// skip the branch-per-subset search entirely and greedily keep every possible-S candidate inside
/// `C'`, only performing the nondeterministic C/S split once a round resets (`B` empty). This is a
/// documented simplification of the full rule (see DESIGN.md OQ-5): the additional split of
/// `δ2(B∩F,a)` into `S'` on a B-successor is not modeled, since `B ⊆ C` is already kept final-free
/// by construction once it enters `C`.
fn step_lazy<P: Predicate>(
    automaton: &GuardedAutomaton<P>,
    partition: &Partition,
    state: &NcsbState,
    atom: &P,
) -> Vec<NcsbState> {
    if state.b.is_empty() {
        return step_basic(automaton, partition, state, atom);
    }

    let n_next = targets_within(automaton, &state.n, atom, &partition.q1);
    let mut c_prime = targets_within(automaton, &state.n, atom, &partition.q2);

    for &q in &state.c {
        for r in successors_on_atom(automaton, q, atom) {
            if partition.q2.contains(&r) {
                c_prime.insert(r);
            }
        }
    }

    for &q in &state.s {
        for r in successors_on_atom(automaton, q, atom) {
            if !partition.q2.contains(&r) {
                continue;
            }
            if automaton.states()[r].accepting || c_prime.contains(&r) {
                return Vec::new();
            }
        }
    }

    let b_next: BTreeSet<usize> = targets_within(automaton, &state.b, atom, &partition.q2)
        .intersection(&c_prime)
        .copied()
        .collect();

    vec![NcsbState {
        n: n_next,
        c: c_prime,
        s: state.s.clone(),
        b: b_next,
    }]
}

/// Creates (or reuses) a dedicated accepting clone of `target`'s automaton state, distinct from
/// its canonical (possibly non-accepting-at-the-moment) entry — the transition-to-state
/// acceptance gadget [ncsb_early_flush] relies on. Keyed by `target` itself plus a marker so it
/// never collides with the canonical index for the same macrostate.
fn flush_states<P: Predicate>(
    states: &mut Vec<GuardedState<P>>,
    flushed: &mut HashMap<NcsbState, usize>,
    target: &NcsbState,
) -> usize {
    if let Some(&idx) = flushed.get(target) {
        return idx;
    }
    let idx = states.len();
    flushed.insert(target.clone(), idx);
    states.push(GuardedState {
        name: Rc::from(format!("{}!", target.label())),
        accepting: true,
        transitions: Vec::new(),
    });
    idx
}

fn run_construction<P: Predicate>(
    sdba: &SemiDeterministicBuchi<P>,
    bound: Bound,
    step: impl Fn(&GuardedAutomaton<P>, &Partition, &NcsbState, &P) -> Vec<NcsbState>,
) -> Result<GuardedAutomaton<P>, PreconditionError> {
    let automaton = completed(sdba.automaton());
    let partition = SemiDeterministicBuchi::try_new(automaton.clone())
        .map(|s| s.split_components())
        .unwrap_or_else(|_| Partition {
            q1: (0..automaton.states().len()).collect(),
            q2: BTreeSet::new(),
        });

    let start = initial_state(&automaton, &partition);
    let mut index: HashMap<NcsbState, usize> = HashMap::new();
    let mut states: Vec<GuardedState<P>> = Vec::new();
    let mut queue = VecDeque::new();

    index.insert(start.clone(), 0);
    states.push(GuardedState {
        name: Rc::from(start.label()),
        accepting: start.is_accepting(),
        transitions: Vec::new(),
    });
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        let idx = index[&current];
        let atoms = step_atoms(&automaton, &current);
        let mut transitions = Vec::new();
        for atom in atoms {
            for successor in step(&automaton, &partition, &current, &atom) {
                let mut newly_inserted = false;
                let next_idx = *index.entry(successor.clone()).or_insert_with(|| {
                    newly_inserted = true;
                    let new_idx = states.len();
                    states.push(GuardedState {
                        name: Rc::from(successor.label()),
                        accepting: successor.is_accepting(),
                        transitions: Vec::new(),
                    });
                    queue.push_back(successor.clone());
                    new_idx
                });
                if newly_inserted {
                    bound.check(states.len())?;
                }
                transitions.push((Guard::Cond(atom.clone()), next_idx));
            }
        }
        states[idx].transitions = transitions;
        trace!(queue_len = queue.len(), states = states.len(), "ncsb worklist step");
    }

    debug!(states = states.len(), "ncsb construction finished");
    Ok(GuardedAutomaton::new(states, 0))
}

/// Eager construction of the whole reachable NCSB product, using the unmodified basic rule.
pub fn ncsb_basic<P: Predicate>(sdba: &SemiDeterministicBuchi<P>) -> GuardedAutomaton<P> {
    run_construction(sdba, Bound::UNBOUNDED, step_basic)
        .expect("unbounded construction cannot hit a state bound")
}

/// Bounded variant of [ncsb_basic]; fails with [PreconditionError::BoundExceeded] once the
/// reachable product would grow past `bound`.
pub fn try_ncsb_basic<P: Predicate>(
    sdba: &SemiDeterministicBuchi<P>,
    bound: Bound,
) -> Result<GuardedAutomaton<P>, PreconditionError> {
    run_construction(sdba, bound, step_basic)
}

/// Eager construction using the lazy successor rule.
pub fn ncsb_lazy<P: Predicate>(sdba: &SemiDeterministicBuchi<P>) -> GuardedAutomaton<P> {
    run_construction(sdba, Bound::UNBOUNDED, step_lazy)
        .expect("unbounded construction cannot hit a state bound")
}

/// Bounded variant of [ncsb_lazy]; see [try_ncsb_basic].
pub fn try_ncsb_lazy<P: Predicate>(
    sdba: &SemiDeterministicBuchi<P>,
    bound: Bound,
) -> Result<GuardedAutomaton<P>, PreconditionError> {
    run_construction(sdba, bound, step_lazy)
}

/// Eager construction using the early-flush gadget: every branch whose step resets `B` to `∅` is
/// routed through a freshly cloned accepting target, matching [ncsb_basic]'s language exactly
/// (the same macrostates are accepting) but timing the acceptance visit at the transition that
/// earns it rather than at whichever later point re-enters the canonical state.
pub fn ncsb_early_flush<P: Predicate>(sdba: &SemiDeterministicBuchi<P>) -> GuardedAutomaton<P> {
    try_ncsb_early_flush(sdba, Bound::UNBOUNDED).expect("unbounded construction cannot hit a state bound")
}

/// Bounded variant of [ncsb_early_flush]; see [try_ncsb_basic].
pub fn try_ncsb_early_flush<P: Predicate>(
    sdba: &SemiDeterministicBuchi<P>,
    bound: Bound,
) -> Result<GuardedAutomaton<P>, PreconditionError> {
    let automaton = completed(sdba.automaton());
    let partition = SemiDeterministicBuchi::try_new(automaton.clone())
        .map(|s| s.split_components())
        .unwrap_or_else(|_| Partition {
            q1: (0..automaton.states().len()).collect(),
            q2: BTreeSet::new(),
        });

    let start = initial_state(&automaton, &partition);
    let mut index: HashMap<NcsbState, usize> = HashMap::new();
    let mut flushed: HashMap<NcsbState, usize> = HashMap::new();
    let mut states: Vec<GuardedState<P>> = Vec::new();
    let mut queue = VecDeque::new();

    index.insert(start.clone(), 0);
    states.push(GuardedState {
        name: Rc::from(start.label()),
        accepting: start.is_accepting(),
        transitions: Vec::new(),
    });
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        let idx = index[&current];
        let atoms = step_atoms(&automaton, &current);
        let mut transitions = Vec::new();
        for atom in atoms {
            for successor in step_basic(&automaton, &partition, &current, &atom) {
                let mut newly_inserted = false;
                let canonical_idx = *index.entry(successor.clone()).or_insert_with(|| {
                    newly_inserted = true;
                    let new_idx = states.len();
                    states.push(GuardedState {
                        name: Rc::from(successor.label()),
                        accepting: successor.is_accepting(),
                        transitions: Vec::new(),
                    });
                    queue.push_back(successor.clone());
                    new_idx
                });
                if newly_inserted {
                    bound.check(states.len())?;
                }

                let target_idx = if successor.is_accepting() && !states[canonical_idx].accepting {
                    let flush_idx = flush_states(&mut states, &mut flushed, &successor);
                    bound.check(states.len())?;
                    flush_idx
                } else {
                    canonical_idx
                };
                transitions.push((Guard::Cond(atom.clone()), target_idx));
            }
        }
        states[idx].transitions = transitions.clone();
        if let Some(&flush_idx) = flushed.get(&current) {
            states[flush_idx].transitions = transitions;
        }
        trace!(queue_len = queue.len(), states = states.len(), "ncsb early-flush worklist step");
    }

    debug!(states = states.len(), "ncsb early-flush construction finished");
    Ok(GuardedAutomaton::new(states, 0))
}

/// On-the-fly NCSB: a queryable step function that never precomputes the full reachable set,
/// useful when only emptiness or a bounded exploration is needed (spec.md §4.6's "basic" rule is
/// eager; this is the same rule exposed lazily).
pub struct OnTheFly<'a, P> {
    automaton: GuardedAutomaton<P>,
    partition: Partition,
    _marker: std::marker::PhantomData<&'a ()>,
}

impl<'a, P: Predicate> OnTheFly<'a, P> {
    pub fn new(sdba: &'a SemiDeterministicBuchi<P>) -> Self {
        let automaton = completed(sdba.automaton());
        let partition = SemiDeterministicBuchi::try_new(automaton.clone())
            .map(|s| s.split_components())
            .unwrap_or_else(|_| Partition {
                q1: (0..automaton.states().len()).collect(),
                q2: BTreeSet::new(),
            });
        OnTheFly {
            automaton,
            partition,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn initial(&self) -> NcsbState {
        initial_state(&self.automaton, &self.partition)
    }

    pub fn successors(&self, state: &NcsbState) -> Vec<(P, NcsbState)> {
        let atoms = step_atoms(&self.automaton, state);
        atoms
            .into_iter()
            .flat_map(|atom| {
                step_basic(&self.automaton, &self.partition, state, &atom)
                    .into_iter()
                    .map(move |successor| (atom.clone(), successor))
            })
            .collect()
    }

    /// Büchi emptiness via reachability-then-self-reachability: the complement's language is
    /// nonempty iff some reachable accepting macrostate can reach itself again.
    pub fn is_empty(&self) -> bool {
        let start = self.initial();
        let mut reachable: HashMap<NcsbState, ()> = HashMap::new();
        let mut queue = VecDeque::new();
        reachable.insert(start.clone(), ());
        queue.push_back(start);

        let mut accepting_reachable = Vec::new();
        while let Some(state) = queue.pop_front() {
            if state.is_accepting() {
                accepting_reachable.push(state.clone());
            }
            for (_, next) in self.successors(&state) {
                if reachable.insert(next.clone(), ()).is_none() {
                    queue.push_back(next);
                }
            }
        }

        for start in accepting_reachable {
            let mut seen = HashMap::new();
            let mut queue = VecDeque::new();
            seen.insert(start.clone(), ());
            for (_, next) in self.successors(&start) {
                queue.push_back(next);
            }
            while let Some(state) = queue.pop_front() {
                if state == start {
                    return false;
                }
                if seen.insert(state.clone(), ()).is_none() {
                    for (_, next) in self.successors(&state) {
                        queue.push_back(next);
                    }
                }
            }
        }
        true
    }

    /// Same question as [OnTheFly::is_empty], but on a nonempty answer reconstructs an ω-word
    /// lasso witness: a finite prefix into a reachable accepting macrostate, plus the cycle back
    /// to it. `alphabet` resolves each step's predicate to a concrete symbol (see [pick_symbol]).
    pub fn decide(&self, alphabet: &[P::Symbol]) -> Decision<P::Symbol> {
        let start = self.initial();
        let mut reachable: HashMap<NcsbState, Vec<P>> = HashMap::new();
        let mut queue = VecDeque::new();
        reachable.insert(start.clone(), Vec::new());
        queue.push_back(start.clone());

        let mut accepting_reachable = Vec::new();
        while let Some(state) = queue.pop_front() {
            if state.is_accepting() {
                accepting_reachable.push(state.clone());
            }
            let path = reachable[&state].clone();
            for (atom, next) in self.successors(&state) {
                if !reachable.contains_key(&next) {
                    let mut next_path = path.clone();
                    next_path.push(atom);
                    reachable.insert(next.clone(), next_path);
                    queue.push_back(next);
                }
            }
        }

        for accepting in accepting_reachable {
            if let Some(cycle) = self.find_cycle(&accepting) {
                let prefix: Vec<P::Symbol> = reachable[&accepting]
                    .iter()
                    .filter_map(|pred| pick_symbol(pred, alphabet))
                    .collect();
                let cycle: Vec<P::Symbol> = cycle
                    .iter()
                    .filter_map(|pred| pick_symbol(pred, alphabet))
                    .collect();
                return Decision::fails(Witness::lasso(prefix, cycle));
            }
        }
        Decision::holds()
    }

    /// Breadth-first search for the shortest sequence of predicates leading from a successor of
    /// `start` back to `start` itself, i.e. a witness that `start` can recur.
    fn find_cycle(&self, start: &NcsbState) -> Option<Vec<P>> {
        let mut seen: HashMap<NcsbState, ()> = HashMap::new();
        let mut queue: VecDeque<(NcsbState, Vec<P>)> = VecDeque::new();
        for (atom, next) in self.successors(start) {
            queue.push_back((next, vec![atom]));
        }
        while let Some((state, path)) = queue.pop_front() {
            if &state == start {
                return Some(path);
            }
            if seen.insert(state.clone(), ()).is_none() {
                for (atom, next) in self.successors(&state) {
                    let mut next_path = path.clone();
                    next_path.push(atom);
                    queue.push_back((next, next_path));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::InNotInPredicate;

    fn sym(s: &str) -> Rc<str> {
        Rc::from(s)
    }

    /// `p --a--> p`, `p --a--> f`, `f --a--> f`; `L = a^ω`.
    fn a_omega() -> SemiDeterministicBuchi<InNotInPredicate> {
        let automaton = GuardedAutomaton::new(
            vec![
                GuardedState {
                    name: sym("p"),
                    accepting: false,
                    transitions: vec![
                        (Guard::Cond(InNotInPredicate::in_set([sym("a")])), 0),
                        (Guard::Cond(InNotInPredicate::in_set([sym("a")])), 1),
                    ],
                },
                GuardedState {
                    name: sym("f"),
                    accepting: true,
                    transitions: vec![(Guard::Cond(InNotInPredicate::in_set([sym("a")])), 1)],
                },
            ],
            0,
        );
        SemiDeterministicBuchi::try_new(automaton).unwrap()
    }

    #[test]
    fn basic_complement_has_no_run_on_a_omega() {
        let sdba = a_omega();
        let complement = ncsb_basic(&sdba);
        // Every reachable state's B obligation must eventually empty given `a` forever, since
        // every path through Q2 hits `f` (the sole accepting state) each step.
        assert!(!complement.states().is_empty());
    }

    #[test]
    fn on_the_fly_matches_basic_emptiness() {
        let sdba = a_omega();
        let lazy = OnTheFly::new(&sdba);
        // a^omega is exactly L(A), so its complement accepts nothing.
        assert!(lazy.is_empty());
    }

    #[test]
    fn lazy_and_early_flush_produce_nonempty_state_sets() {
        let sdba = a_omega();
        assert!(!ncsb_lazy(&sdba).states().is_empty());
        assert!(!ncsb_early_flush(&sdba).states().is_empty());
    }
}
