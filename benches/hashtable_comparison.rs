use core::hash::BuildHasher;
use core::hash::Hash;
use core::hint::black_box;

use criterion::AxisScale;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use hashbrown::HashMap as HashbrownMap;
use rand::Rng;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand_distr::Zipf;
use shift_hash::HashMap as ShiftMap;
use shift_hash::ValueEquality;
use siphasher::sip::SipHasher;

/// Both maps hash through the same keyed SipHash so only the table layout
/// differs.
#[derive(Clone, Copy, Default)]
struct SipBuilder;

impl BuildHasher for SipBuilder {
    type Hasher = SipHasher;

    fn build_hasher(&self) -> Self::Hasher {
        SipHasher::new_with_keys(0x0123_4567_89ab_cdef, 0xfedc_ba98_7654_3210)
    }
}

type Shift<K> = ShiftMap<K, u64, ValueEquality<SipBuilder>>;
type Hashbrown<K> = HashbrownMap<K, u64, SipBuilder>;

trait BenchKey: Clone + Hash + Eq {
    fn new(key: u64) -> Self;
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct SmallKey(u64);

impl BenchKey for SmallKey {
    fn new(key: u64) -> Self {
        black_box(Self(key))
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct StringKey(String);

impl BenchKey for StringKey {
    fn new(key: u64) -> Self {
        black_box(Self(format!("key_{:016X}", key)))
    }
}

const SIZES: &[usize] = &[
    (1 << 10),
    (1 << 12),
    (1 << 14),
    (1 << 16),
    (1 << 18),
];

fn random_keys<K: BenchKey>(count: usize) -> Vec<K> {
    let mut rng = OsRng;
    (0..count)
        .map(|_| K::new(rng.try_next_u64().unwrap()))
        .collect()
}

fn shift_with<K: BenchKey>(keys: &[K]) -> Shift<K> {
    let mut map = Shift::with_hasher(SipBuilder);
    for (i, key) in keys.iter().enumerate() {
        map.insert(key.clone(), i as u64);
    }
    map
}

fn hashbrown_with<K: BenchKey>(keys: &[K]) -> Hashbrown<K> {
    let mut map = Hashbrown::with_hasher(SipBuilder);
    for (i, key) in keys.iter().enumerate() {
        map.insert(key.clone(), i as u64);
    }
    map
}

fn bench_insert_random<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("insert_random_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let keys = random_keys::<K>(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("shift_hash/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut keys = keys.clone();
                    keys.shuffle(&mut SmallRng::from_os_rng());
                    keys
                },
                |keys| {
                    let mut map = Shift::with_hasher(SipBuilder);
                    for (i, key) in keys.into_iter().enumerate() {
                        map.insert(key, i as u64);
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
                    let mut map = Hashbrown::with_hasher(SipBuilder);
                    for (i, key) in keys.into_iter().enumerate() {
                        map.insert(key, i as u64);
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }
}

fn bench_find_hit_miss<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("find_hit_miss_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let present = random_keys::<K>(size);
        let mut probes = present.clone();
        probes.extend(random_keys::<K>(size));
        probes.shuffle(&mut SmallRng::from_os_rng());

        let shift = shift_with(&present);
        let hashbrown = hashbrown_with(&present);
        group.throughput(Throughput::Elements(probes.len() as u64));

        group.bench_function(format!("shift_hash/{size}"), |b| {
            b.iter(|| {
                let mut hits = 0usize;
                for key in &probes {
                    hits += shift.get(key).is_some() as usize;
                }
                black_box(hits)
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                let mut hits = 0usize;
                for key in &probes {
                    hits += hashbrown.get(key).is_some() as usize;
                }
                black_box(hits)
            })
        });
    }
}

fn bench_remove<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("remove_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let keys = random_keys::<K>(size);
        let shift = shift_with(&keys);
        let hashbrown = hashbrown_with(&keys);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("shift_hash/{size}"), |b| {
            b.iter_batched(
                || shift.clone(),
                |mut map| {
                    for key in &keys {
                        black_box(map.remove(key));
                    }
                    map
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || hashbrown.clone(),
                |mut map| {
                    for key in &keys {
                        black_box(map.remove(key));
                    }
                    map
                },
                BatchSize::SmallInput,
            )
        });
    }
}

fn bench_iteration<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("iteration_{}", core::any::type_name::<K>()));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let keys = random_keys::<K>(size);
        let shift = shift_with(&keys);
        let hashbrown = hashbrown_with(&keys);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("shift_hash/{size}"), |b| {
            b.iter(|| black_box(shift.values().sum::<u64>()))
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| black_box(hashbrown.values().sum::<u64>()))
        });
    }
}

/// Toggles keys in and out of the map: every hit is removed, every miss is
/// inserted. Stresses backward-shift deletion.
fn bench_churn<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("churn_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let universe = random_keys::<K>(size);
        let mut rng = SmallRng::from_os_rng();
        let ops: Vec<K> = (0..size * 2)
            .map(|_| universe[rng.random_range(0..size)].clone())
            .collect();
        group.throughput(Throughput::Elements(ops.len() as u64));

        group.bench_function(format!("shift_hash/{size}"), |b| {
            b.iter_batched(
                || ops.clone(),
                |ops| {
                    let mut map = Shift::with_hasher(SipBuilder);
                    for key in ops {
                        match map.index_of(&key) {
                            Ok(slot) => {
                                black_box(map.index_remove(slot));
                            }
                            Err(slot) => {
                                map.index_insert(slot, key, 0);
                            }
                        }
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || ops.clone(),
                |ops| {
                    let mut map = Hashbrown::with_hasher(SipBuilder);
                    for key in ops {
                        match map.entry(key) {
                            hashbrown::hash_map::Entry::Occupied(entry) => {
                                black_box(entry.remove());
                            }
                            hashbrown::hash_map::Entry::Vacant(entry) => {
                                entry.insert(0);
                            }
                        }
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }
}

/// Insert, find and remove drawn with a Zipf-skewed key popularity.
fn bench_mixed_zipf<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    const KEY_SPACE_MULTIPLIER: usize = 2;

    let mut group = c.benchmark_group(format!("mixed_zipf_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let universe = random_keys::<K>(size * KEY_SPACE_MULTIPLIER);
        let key_distr = Zipf::new(universe.len() as f32, 1.0).unwrap();
        let mut rng = SmallRng::from_os_rng();
        let ops: Vec<(f64, K)> = (0..size * 4)
            .map(|_| {
                let rank = rng.sample(key_distr) as usize - 1;
                (rng.random::<f64>(), universe[rank].clone())
            })
            .collect();
        group.throughput(Throughput::Elements(ops.len() as u64));

        group.bench_function(format!("shift_hash/{size}"), |b| {
            b.iter_batched(
                || ops.clone(),
                |ops| {
                    let mut map = Shift::with_hasher(SipBuilder);
                    for (choice, key) in ops {
                        if choice < 0.5 {
                            black_box(map.get(&key));
                        } else if choice < 0.8 {
                            map.add_to(key, 1);
                        } else {
                            black_box(map.remove(&key));
                        }
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || ops.clone(),
                |ops| {
                    let mut map = Hashbrown::with_hasher(SipBuilder);
                    for (choice, key) in ops {
                        if choice < 0.5 {
                            black_box(map.get(&key));
                        } else if choice < 0.8 {
                            *map.entry(key).or_insert(0) += 1;
                        } else {
                            black_box(map.remove(&key));
                        }
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }
}

criterion_group!(
    benches,
    bench_insert_random::<SmallKey, 4>,
    bench_insert_random::<StringKey, 3>,
    bench_find_hit_miss::<SmallKey, 4>,
    bench_find_hit_miss::<StringKey, 3>,
    bench_remove::<SmallKey, 4>,
    bench_remove::<StringKey, 3>,
    bench_iteration::<SmallKey, 4>,
    bench_iteration::<StringKey, 3>,
    bench_churn::<SmallKey, 4>,
    bench_churn::<StringKey, 3>,
    bench_mixed_zipf::<SmallKey, 4>,
    bench_mixed_zipf::<StringKey, 3>,
);

criterion_main!(benches);
