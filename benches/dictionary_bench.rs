use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use multitable_dict::{CopyMode, Dictionary, TypeTag, Value};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> Value {
    Value::from(format!("k{:016x}", n))
}

fn dict(array_count: u16, mode: CopyMode) -> Dictionary {
    Dictionary::new(array_count, 1024, TypeTag::Str, TypeTag::U64, mode).unwrap()
}

fn bench_insert(c: &mut Criterion) {
    for (name, count) in [("dict_insert_10k_1x", 1u16), ("dict_insert_10k_8x", 8)] {
        c.bench_function(name, |b| {
            b.iter_batched(
                || dict(count, CopyMode::Deep),
                |mut d| {
                    for (i, x) in lcg(1).take(10_000).enumerate() {
                        d.insert(key(x), Value::U64(i as u64)).unwrap();
                    }
                    black_box(d)
                },
                BatchSize::SmallInput,
            )
        });
    }
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("dict_get_hit", |b| {
        let mut d = dict(8, CopyMode::Deep);
        let keys: Vec<_> = lcg(7).take(20_000).map(key).collect();
        for (i, k) in keys.iter().enumerate() {
            d.insert(k.clone(), Value::U64(i as u64)).unwrap();
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(d.get(k));
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("dict_get_miss", |b| {
        let mut d = dict(8, CopyMode::Deep);
        for (i, x) in lcg(11).take(10_000).enumerate() {
            d.insert(key(x), Value::U64(i as u64)).unwrap();
        }
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            // generate keys unlikely in map
            let k = key(miss.next().unwrap());
            black_box(d.get(&k));
        })
    });
}

fn bench_insert_delete_churn(c: &mut Criterion) {
    c.bench_function("dict_insert_delete_shallow", |b| {
        let mut d = dict(4, CopyMode::Shallow);
        let mut it = lcg(3);
        b.iter(|| {
            let k = key(it.next().unwrap());
            d.insert(k.clone(), Value::U64(0)).unwrap();
            black_box(d.delete(&k));
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert, bench_get_hit, bench_get_miss, bench_insert_delete_churn
}
criterion_main!(benches);
