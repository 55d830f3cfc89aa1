use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::rc::Rc;
use symautomata::buchi::ncsb::{ncsb_basic, ncsb_early_flush, ncsb_lazy};
use symautomata::buchi::SemiDeterministicBuchi;
use symautomata::inclusion;
use symautomata::parser::text;
use symautomata::predicate::InNotInPredicate;
use symautomata::sfa::Sfa;

const INFA_A: &str = concat!(
    "Ops x:0\n",
    "Automaton a @INFA\n",
    "States s0 s1 s2\n",
    "Final States s2\n",
    "Transitions\n",
    "x -> s0\n",
    "\"in{a,b}\"(s0) -> s1\n",
    "\"in{b,c}\"(s1) -> s2\n",
    "\"in{a,b,c}\"(s2) -> s2\n",
);

const INFA_B: &str = concat!(
    "Ops x:0\n",
    "Automaton b @INFA\n",
    "States t0 t1 t2\n",
    "Final States t2\n",
    "Transitions\n",
    "x -> t0\n",
    "\"in{a}\"(t0) -> t1\n",
    "\"in{b,c}\"(t1) -> t2\n",
    "\"in{a,b,c}\"(t2) -> t0\n",
);

const INFA_BUCHI: &str = concat!(
    "Ops x:0\n",
    "Automaton buchi @INFA\n",
    "States p f\n",
    "Final States f\n",
    "Transitions\n",
    "x -> p\n",
    "\"in{a}\"(p) -> f\n",
    "\"in{a,b}\"(f) -> p\n",
    "\"in{b}\"(f) -> f\n",
);

fn sample_sfa(text: &str) -> Sfa<InNotInPredicate> {
    let parsed = text::parse(text).unwrap();
    text::to_infa(&parsed).unwrap()
}

fn alphabet() -> Vec<Rc<str>> {
    vec![Rc::from("a"), Rc::from("b"), Rc::from("c")]
}

pub fn determinize(c: &mut Criterion) {
    let sfa = sample_sfa(INFA_A);
    c.bench_function("determinize", |b| b.iter(|| black_box(&sfa).determinize()));
}

pub fn minimize(c: &mut Criterion) {
    let sfa = sample_sfa(INFA_A);
    c.bench_function("minimize", |b| b.iter(|| black_box(&sfa).minimize()));
}

pub fn boolean_ops(c: &mut Criterion) {
    let a = sample_sfa(INFA_A).determinize();
    let b = sample_sfa(INFA_B).determinize();
    c.bench_function("complement", |bencher| {
        bencher.iter(|| black_box(&a).complement())
    });
    c.bench_function("product construction", |bencher| {
        bencher.iter(|| {
            symautomata::core::GuardedAutomaton::product_construction(
                black_box(a.automaton()),
                black_box(b.automaton()),
                |p, q| p || q,
            )
        })
    });
}

pub fn inclusion_strategies(c: &mut Criterion) {
    let a = sample_sfa(INFA_A);
    let b = sample_sfa(INFA_B);
    let alphabet = alphabet();
    c.bench_function("inclusion: pair reachability", |bencher| {
        bencher.iter(|| {
            inclusion::is_included_pair_reachability(black_box(&a), black_box(&b), &alphabet)
        })
    });
    c.bench_function("inclusion: antichain", |bencher| {
        bencher.iter(|| inclusion::is_included_antichain(black_box(&a), black_box(&b), &alphabet))
    });
}

pub fn ncsb_variants(c: &mut Criterion) {
    let sfa = sample_sfa(INFA_BUCHI);
    let sdba = SemiDeterministicBuchi::try_new(sfa.automaton().clone()).unwrap();
    c.bench_function("ncsb basic", |b| b.iter(|| ncsb_basic(black_box(&sdba))));
    c.bench_function("ncsb lazy", |b| b.iter(|| ncsb_lazy(black_box(&sdba))));
    c.bench_function("ncsb early flush", |b| {
        b.iter(|| ncsb_early_flush(black_box(&sdba)))
    });
}

criterion_group!(
    benches,
    determinize,
    minimize,
    boolean_ops,
    inclusion_strategies,
    ncsb_variants
);
criterion_main!(benches);
