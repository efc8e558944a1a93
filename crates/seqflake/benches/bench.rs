use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use seqflake::{EPOCH_2017_UTC, FixedPressure, SnowflakeUidGenerator, TimeSource};
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    thread::scope,
    time::Instant,
};

/// A clock that ticks one millisecond every other read, so most calls find
/// the counter behind and take the reset-and-retry path.
struct RunawayTime {
    reads: AtomicU64,
}

impl TimeSource for RunawayTime {
    fn current_millis(&self) -> u64 {
        EPOCH_2017_UTC.as_millis() as u64 + self.reads.fetch_add(1, Ordering::Relaxed) / 2
    }
}

// Number of IDs generated per benchmark iteration (per-thread for
// multi-threaded).
const TOTAL_IDS: usize = 4096;

fn bench_system_clock(c: &mut Criterion) {
    let mut group = c.benchmark_group("system_clock");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        let generator = SnowflakeUidGenerator::new(1).unwrap();
        b.iter(|| {
            for _ in 0..TOTAL_IDS {
                black_box(generator.next_id().unwrap());
            }
        });
    });

    group.finish();
}

fn bench_catch_up(c: &mut Criterion) {
    let mut group = c.benchmark_group("catch_up");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let time = RunawayTime {
                reads: AtomicU64::new(0),
            };
            let generator =
                SnowflakeUidGenerator::with_parts(1, EPOCH_2017_UTC, time, FixedPressure(1))
                    .unwrap();

            let start = Instant::now();
            for _ in 0..iters {
                for _ in 0..TOTAL_IDS {
                    black_box(generator.next_id().unwrap());
                }
            }
            start.elapsed()
        });
    });

    group.finish();
}

fn bench_contended(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended");

    for threads in [2, 4, 8, 16] {
        group.throughput(Throughput::Elements((TOTAL_IDS * threads) as u64));
        group.bench_function(format!("threads/{threads}/elems/{TOTAL_IDS}"), |b| {
            b.iter_custom(|iters| {
                let generator = Arc::new(SnowflakeUidGenerator::new(1).unwrap());

                let start = Instant::now();
                for _ in 0..iters {
                    scope(|s| {
                        for _ in 0..threads {
                            let generator = Arc::clone(&generator);
                            s.spawn(move || {
                                for _ in 0..TOTAL_IDS {
                                    black_box(generator.next_id().unwrap());
                                }
                            });
                        }
                    });
                }
                start.elapsed()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_system_clock, bench_catch_up, bench_contended);
criterion_main!(benches);
