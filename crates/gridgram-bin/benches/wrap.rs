//! Toroidal wrap arithmetic is on the hot path of both Matcher and Applier
//! (every pattern cell goes through it); this benchmark tracks its cost in
//! isolation from the rest of a derivation step.
use core_memory::Derivation;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn wrap_benchmark(c: &mut Criterion) {
    let derivation = Derivation::new(80, 200, 79, 200);

    c.bench_function("wrap_in_range", |b| {
        b.iter(|| derivation.wrap(black_box(40), black_box(100)))
    });

    c.bench_function("wrap_positive_overflow", |b| {
        b.iter(|| derivation.wrap(black_box(1_000), black_box(1_000)))
    });

    c.bench_function("wrap_negative", |b| {
        b.iter(|| derivation.wrap(black_box(-50), black_box(-50)))
    });
}

criterion_group!(benches, wrap_benchmark);
criterion_main!(benches);
