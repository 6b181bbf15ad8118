use collatz_arc::{collatz, AdaptiveCache};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::{thread_rng, Rng};

fn keys(cases: usize, range: u64) -> Vec<u64> {
    let mut rng = thread_rng();
    black_box((0..cases).map(|_| rng.gen_range(1..=range)).collect())
}

fn bench_uncached(c: &mut Criterion) {
    c.bench_function("Test collatz steps uncached", move |b| {
        let cases = 10_000;
        b.iter_batched(
            || keys(cases, 256),
            |nums| {
                nums.iter().for_each(|k| {
                    black_box(collatz::steps(*k));
                });
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_arc_cache_hot_keys(c: &mut Criterion) {
    c.bench_function("Test AdaptiveCache hot keys", move |b| {
        let cases = 10_000;
        b.iter_batched(
            || (AdaptiveCache::new(128), keys(cases, 64)),
            |(mut l, nums)| {
                nums.iter().for_each(|k| {
                    black_box(l.lookup(*k));
                });
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_arc_cache_wide_keys(c: &mut Criterion) {
    c.bench_function("Test AdaptiveCache wide keys", move |b| {
        let cases = 10_000;
        b.iter_batched(
            || (AdaptiveCache::new(128), keys(cases, 1 << 20)),
            |(mut l, nums)| {
                nums.iter().for_each(|k| {
                    black_box(l.lookup(*k));
                });
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_arc_cache_ghost_hits(c: &mut Criterion) {
    c.bench_function("Test AdaptiveCache ghost hits", move |b| {
        let cases = 10_000;
        b.iter_batched(
            || (AdaptiveCache::new(128), keys(cases, 512)),
            |(mut l, nums)| {
                nums.iter().enumerate().for_each(|(i, k)| {
                    if i % 2 == 0 {
                        l.seed_recent_ghost(*k);
                    } else {
                        l.seed_frequent_ghost(*k);
                    }
                    black_box(l.lookup(*k));
                });
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(
    adaptive_cache,
    bench_uncached,
    bench_arc_cache_hot_keys,
    bench_arc_cache_wide_keys,
    bench_arc_cache_ghost_hits
);

criterion_main!(adaptive_cache);
