use callwrap::{memoize, with_deadline};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::Duration;

fn fib(n: u64) -> u64 {
    if n < 2 {
        n
    } else {
        fib(n - 1) + fib(n - 2)
    }
}

fn memoize_hit_benchmark(c: &mut Criterion) {
    let cached = memoize(fib);
    cached.call(24);

    c.bench_function("memoize hit", |b| {
        b.iter(|| cached.call(black_box(24)));
    });
}

fn memoize_miss_benchmark(c: &mut Criterion) {
    c.bench_function("memoize miss", |b| {
        b.iter(|| {
            let cached = memoize(fib);
            cached.call(black_box(24))
        });
    });
}

fn deadline_overhead_benchmark(c: &mut Criterion) {
    let deadline = with_deadline(Duration::from_secs(1));

    c.bench_function("deadline blocking call", |b| {
        b.iter(|| deadline.call(|| fib(black_box(10))).unwrap());
    });

    let runtime = tokio::runtime::Runtime::new().unwrap();
    c.bench_function("deadline async run", |b| {
        b.to_async(&runtime)
            .iter(|| async { deadline.run(async { fib(black_box(10)) }).await.unwrap() });
    });
}

criterion_group!(
    benches,
    memoize_hit_benchmark,
    memoize_miss_benchmark,
    deadline_overhead_benchmark
);
criterion_main!(benches);
