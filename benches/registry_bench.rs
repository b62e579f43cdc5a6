//! Performance benchmarks for registry operations

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;
use std::time::Duration;

use meterhub::{Arbiter, Counter, MetricSource, Registry, StandardRegistry};

fn bench_registry(registry_size: usize) -> StandardRegistry {
    let registry =
        StandardRegistry::with_arbiter(Arc::new(Arbiter::with_period(Duration::from_secs(60))));
    for i in 0..registry_size {
        registry
            .register(&format!("foo{i:07}"), Counter::new())
            .unwrap();
    }
    registry
}

fn each_benchmark(c: &mut Criterion) {
    let small = bench_registry(1);
    let huge = bench_registry(10_000);

    let mut group = c.benchmark_group("each");

    group.bench_function("small", |b| {
        b.iter(|| small.each(&mut |_, _| {}))
    });

    group.bench_function("huge_collect_names", |b| {
        let mut names: Vec<String> = Vec::with_capacity(10_000);
        b.iter(|| {
            names.clear();
            huge.each(&mut |name, _| names.push(name.to_string()));
            black_box(names.len());
        })
    });

    group.finish();
}

fn get_or_register_benchmark(c: &mut Criterion) {
    let registry = bench_registry(0);
    let counter = Counter::new();

    let mut group = c.benchmark_group("get_or_register");
    group.throughput(Throughput::Elements(1));

    group.bench_function("existing_ready", |b| {
        b.iter(|| {
            let handle = registry.get_or_register("foo", counter.clone().into());
            black_box(handle);
        })
    });

    group.bench_function("existing_lazy", |b| {
        b.iter(|| {
            let handle = registry.get_or_register("foo", MetricSource::lazy(Counter::default));
            black_box(handle);
        })
    });

    // Contended path: several threads hammering one name
    group.bench_function("contended_4_threads", |b| {
        b.iter_custom(|iters| {
            let threads = 4;
            let per_thread = (iters / threads).max(1);
            let start = std::time::Instant::now();
            std::thread::scope(|scope| {
                for _ in 0..threads {
                    let registry = &registry;
                    let counter = counter.clone();
                    scope.spawn(move || {
                        for _ in 0..per_thread {
                            let handle =
                                registry.get_or_register("foo", counter.clone().into());
                            black_box(handle);
                        }
                    });
                }
            });
            start.elapsed()
        })
    });

    group.finish();
}

fn metric_update_benchmark(c: &mut Criterion) {
    let registry = bench_registry(0);
    registry.register("hits", Counter::new()).unwrap();
    let counter = registry.get_as::<Counter>("hits").unwrap();

    let mut group = c.benchmark_group("metric_update");
    group.throughput(Throughput::Elements(1));

    group.bench_function("counter_inc", |b| {
        b.iter(|| counter.inc(black_box(1)))
    });

    group.bench_function("lookup_then_inc", |b| {
        b.iter(|| {
            registry.get_as::<Counter>("hits").unwrap().inc(1);
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    each_benchmark,
    get_or_register_benchmark,
    metric_update_benchmark,
);
criterion_main!(benches);
