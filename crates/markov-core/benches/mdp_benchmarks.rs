//! Benchmarks for building, rendering and parsing MDPs

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use markov_core::{Mdp, Transition};

/// Chain `s0 -> s1 -> ... -> s{n-1}` with two actions per state
fn chain(n: usize) -> Mdp {
    let mut mdp = Mdp::new();
    mdp.add_action("next").unwrap();
    mdp.add_action("stay").unwrap();
    for i in 0..n {
        mdp.add_state(&format!("s{i}"), i + 1 == n, -1.0, Vec::<(String, Transition)>::new())
            .unwrap();
    }
    for i in 0..n {
        let here = format!("s{i}");
        let next = format!("s{}", (i + 1).min(n - 1));
        mdp.set_transition(&here, &next, "next", 0.9).unwrap();
        mdp.set_transition(&here, &here, "stay", 1.0).unwrap();
    }
    mdp
}

fn bench_add_state(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_state");
    for n in [100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(chain(n)));
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    for n in [100, 1_000] {
        let mdp = chain(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &mdp, |b, mdp| {
            b.iter(|| black_box(mdp.render()));
        });
    }
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for n in [100, 1_000] {
        let text = chain(n).render();
        group.bench_with_input(BenchmarkId::from_parameter(n), &text, |b, text| {
            b.iter(|| black_box(text.parse::<Mdp>().unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_add_state, bench_render, bench_parse);
criterion_main!(benches);
