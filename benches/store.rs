use cow_trie::{Trie, TrieStore};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn populated_store(size: usize) -> TrieStore {
    let store = TrieStore::new();
    for i in 0..size {
        store.put(format!("key{:06}", i), i as u64);
    }
    store
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_get");
    for size in [100usize, 10_000] {
        let store = populated_store(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut i = 0;
            b.iter(|| {
                let guard = store.get::<u64>(format!("key{:06}", i % size));
                i += 1;
                black_box(guard.map(|g| *g))
            });
        });
    }
    group.finish();
}

fn bench_put(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_put");
    for size in [100usize, 10_000] {
        let store = populated_store(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut i = 0u64;
            b.iter(|| {
                store.put(format!("key{:06}", i as usize % size), i);
                i += 1;
            });
        });
    }
    group.finish();
}

fn bench_put_remove_trie(c: &mut Criterion) {
    let base = (0..10_000).fold(Trie::new(), |t, i| t.put(format!("key{:06}", i), i as u64));

    c.bench_function("trie_put_remove_10000", |b| {
        b.iter(|| {
            let next = base.put("key999999", 1u64);
            black_box(next.remove("key000042"))
        });
    });
}

criterion_group!(benches, bench_get, bench_put, bench_put_remove_trie);
criterion_main!(benches);
