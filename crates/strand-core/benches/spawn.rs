use criterion::{black_box, criterion_group, criterion_main, Criterion};
use strand_core::Pool;

fn bench_spawn_noop(c: &mut Criterion) {
    let pool = Pool::with_workers(4);
    c.bench_function("spawn_noop", |b| {
        b.iter(|| {
            let future = pool.spawn(async { black_box(0u64) });
            black_box(future.block())
        })
    });
}

fn bench_spawn_batch(c: &mut Criterion) {
    let pool = Pool::with_workers(4);
    c.bench_function("spawn_batch_64", |b| {
        b.iter(|| {
            let futures: Vec<_> = (0..64u64)
                .map(|i| pool.spawn(async move { black_box(i) }))
                .collect();
            for future in &futures {
                future.wait();
            }
        })
    });
}

criterion_group!(benches, bench_spawn_noop, bench_spawn_batch);
criterion_main!(benches);
