use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mapset::collections::LinkedHashMap;
use std::collections::HashMap;

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    group.bench_function("std::HashMap", |b| {
        b.iter(|| {
            let mut map = HashMap::new();
            for i in 0..1000 {
                map.insert(i, i);
            }
            black_box(map)
        })
    });

    group.bench_function("LinkedHashMap", |b| {
        b.iter(|| {
            let mut map = LinkedHashMap::new();
            for i in 0..1000 {
                map.insert(i, i);
            }
            black_box(map)
        })
    });

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");
    let n = 10000;

    let std_map: HashMap<_, _> = (0..n).map(|i| (i, i)).collect();
    let map: LinkedHashMap<_, _> = (0..n).map(|i| (i, i)).collect();

    group.bench_function("std::HashMap", |b| {
        b.iter(|| {
            for i in 0..n {
                black_box(std_map.get(&i));
            }
        })
    });

    group.bench_function("LinkedHashMap", |b| {
        b.iter(|| {
            for i in 0..n {
                black_box(map.get(&i));
            }
        })
    });

    group.finish();
}

fn bench_iter(c: &mut Criterion) {
    let mut group = c.benchmark_group("iter");
    let n = 10000;

    let std_map: HashMap<_, _> = (0..n).map(|i| (i, i)).collect();
    let map: LinkedHashMap<_, _> = (0..n).map(|i| (i, i)).collect();

    group.bench_function("std::HashMap", |b| {
        b.iter(|| {
            for (k, v) in &std_map {
                black_box((k, v));
            }
        })
    });

    group.bench_function("LinkedHashMap", |b| {
        b.iter(|| {
            for (k, v) in &map {
                black_box((k, v));
            }
        })
    });

    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");

    group.bench_function("std::HashMap", |b| {
        b.iter(|| {
            let mut map = HashMap::new();
            for i in 0..1000 {
                map.insert(i, i);
                if i >= 16 {
                    map.remove(&(i - 16));
                }
            }
            black_box(map)
        })
    });

    group.bench_function("LinkedHashMap", |b| {
        b.iter(|| {
            let mut map = LinkedHashMap::new();
            for i in 0..1000 {
                map.insert(i, i);
                if i >= 16 {
                    map.remove(&(i - 16));
                }
            }
            black_box(map)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_insert, bench_lookup, bench_iter, bench_churn);
criterion_main!(benches);
