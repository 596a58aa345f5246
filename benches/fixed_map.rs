use core::hash::BuildHasher;
use core::hint::black_box;

use criterion::AxisScale;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use fixed_slot_map::FixedHashMap;
use hashbrown::HashMap as HashbrownHashMap;
use rand::Rng;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand_distr::Zipf;
use siphasher::sip::SipHasher;

const SIZES: [usize; 5] = [64, 256, 1024, 4096, 16384];
const WIDTH: usize = 8;

#[derive(Clone, Copy, Default)]
struct SipHashBuilder;

impl BuildHasher for SipHashBuilder {
    type Hasher = SipHasher;

    fn build_hasher(&self) -> Self::Hasher {
        SipHasher::new()
    }
}

type Key = [u8; WIDTH];

/// Fills three quarters of `capacity` with distinct random keys.
fn random_keys(capacity: usize) -> Vec<Key> {
    let mut rng = OsRng;
    let mut seen = HashbrownHashMap::with_capacity_and_hasher(capacity, SipHashBuilder);
    let target = capacity * 3 / 4;
    while seen.len() < target {
        let key = rng.try_next_u64().unwrap().to_le_bytes();
        seen.insert(key, ());
    }
    seen.into_keys().collect()
}

fn fixed_with(keys: &[Key], capacity: usize) -> FixedHashMap<SipHashBuilder> {
    let mut map = FixedHashMap::with_hasher(WIDTH, WIDTH, capacity, SipHashBuilder);
    for key in keys {
        map.set(key, key).unwrap();
    }
    map
}

fn hashbrown_with(keys: &[Key]) -> HashbrownHashMap<Key, Key, SipHashBuilder> {
    let mut map = HashbrownHashMap::with_capacity_and_hasher(keys.len(), SipHashBuilder);
    for key in keys {
        map.insert(*key, *key);
    }
    map
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES.iter() {
        let keys = random_keys(size);
        group.throughput(Throughput::Elements(keys.len() as u64));

        group.bench_function(format!("fixed_map/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut keys = keys.clone();
                    keys.shuffle(&mut SmallRng::from_os_rng());
                    keys
                },
                |keys| {
                    let mut map = FixedHashMap::with_hasher(WIDTH, WIDTH, size, SipHashBuilder);
                    for key in &keys {
                        black_box(map.set(key, key).unwrap());
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut keys = keys.clone();
                    keys.shuffle(&mut SmallRng::from_os_rng());
                    keys
                },
                |keys| {
                    let mut map =
                        HashbrownHashMap::with_capacity_and_hasher(size, SipHashBuilder);
                    for key in &keys {
                        black_box(map.insert(*key, *key));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_find_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_hit");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES.iter() {
        let keys = random_keys(size);
        let fixed = fixed_with(&keys, size);
        let hashbrown = hashbrown_with(&keys);
        group.throughput(Throughput::Elements(keys.len() as u64));

        group.bench_function(format!("fixed_map/{size}"), |b| {
            b.iter(|| {
                for key in &keys {
                    black_box(fixed.get(key).unwrap());
                }
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for key in &keys {
                    black_box(hashbrown.get(key).unwrap());
                }
            })
        });
    }

    group.finish();
}

fn bench_find_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_miss");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES.iter() {
        let keys = random_keys(size);
        let fixed = fixed_with(&keys, size);
        let hashbrown = hashbrown_with(&keys);
        let mut rng = OsRng;
        let misses = (0..keys.len())
            .map(|_| rng.try_next_u64().unwrap().to_le_bytes())
            .filter(|key| !hashbrown.contains_key(key))
            .collect::<Vec<Key>>();
        group.throughput(Throughput::Elements(misses.len() as u64));

        group.bench_function(format!("fixed_map/{size}"), |b| {
            b.iter(|| {
                for key in &misses {
                    black_box(fixed.get(key).is_err());
                }
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for key in &misses {
                    black_box(hashbrown.get(key).is_none());
                }
            })
        });
    }

    group.finish();
}

fn bench_find_zipf(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_zipf");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES.iter() {
        let keys = random_keys(size);
        let fixed = fixed_with(&keys, size);
        let hashbrown = hashbrown_with(&keys);

        let zipf = Zipf::new(keys.len() as f64, 1.1).unwrap();
        let mut rng = SmallRng::from_os_rng();
        let lookups = (0..keys.len())
            .map(|_| keys[rng.sample(zipf) as usize - 1])
            .collect::<Vec<Key>>();
        group.throughput(Throughput::Elements(lookups.len() as u64));

        group.bench_function(format!("fixed_map/{size}"), |b| {
            b.iter(|| {
                for key in &lookups {
                    black_box(fixed.get(key).unwrap());
                }
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for key in &lookups {
                    black_box(hashbrown.get(key).unwrap());
                }
            })
        });
    }

    group.finish();
}

fn bench_delete(c: &mut Criterion) {
    let mut group = c.benchmark_group("delete");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES.iter() {
        let keys = random_keys(size);
        let fixed = fixed_with(&keys, size);
        let hashbrown = hashbrown_with(&keys);
        group.throughput(Throughput::Elements(keys.len() as u64));

        group.bench_function(format!("fixed_map/{size}"), |b| {
            b.iter_batched(
                || fixed.clone(),
                |mut map| {
                    for key in &keys {
                        map.delete(key).unwrap();
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || hashbrown.clone(),
                |mut map| {
                    for key in &keys {
                        black_box(map.remove(key).unwrap());
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES.iter() {
        let keys = random_keys(size);
        let fixed = fixed_with(&keys, size);
        let hashbrown = hashbrown_with(&keys);
        let replacements = random_keys(size);
        group.throughput(Throughput::Elements(keys.len() as u64 * 2));

        group.bench_function(format!("fixed_map/{size}"), |b| {
            b.iter_batched(
                || fixed.clone(),
                |mut map| {
                    for (old, new) in keys.iter().zip(&replacements) {
                        map.delete(old).unwrap();
                        // Replacements may collide with a live key.
                        black_box(map.set(new, new).ok());
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || hashbrown.clone(),
                |mut map| {
                    for (old, new) in keys.iter().zip(&replacements) {
                        map.remove(old).unwrap();
                        black_box(map.insert(*new, *new));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert,
    bench_find_hit,
    bench_find_miss,
    bench_find_zipf,
    bench_delete,
    bench_churn,
);

criterion_main!(benches);
