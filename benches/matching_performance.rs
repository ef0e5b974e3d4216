//! Performance benchmarks for round execution
//!
//! Run with: cargo bench

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use arena_queue::{MatchQueue, Player, QueueConfig};

/// Build a queue holding `parties` random parties of 1-4 players.
fn populated_queue(parties: usize) -> MatchQueue {
    let mut queue = MatchQueue::new(QueueConfig::default()).expect("default config is valid");
    let mut rng = StdRng::seed_from_u64(7);

    let mut next_id = 1u64;
    for _ in 0..parties {
        let size = rng.gen_range(1..=4);
        let players: Vec<Player> = (0..size)
            .map(|_| {
                let player = Player::new(next_id, rng.gen_range(0.0..50.0));
                next_id += 1;
                player
            })
            .collect();
        queue.add_player(players);
    }

    queue
}

fn bench_proc_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("proc_matching");

    for &parties in &[100usize, 500, 2000] {
        let queue = populated_queue(parties);

        group.bench_with_input(
            BenchmarkId::from_parameter(parties),
            &queue,
            |b, queue| {
                b.iter_batched(
                    || queue.clone(),
                    |mut q| q.proc_matching().expect("round succeeds"),
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

fn bench_add_player(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_player");

    for &parties in &[100usize, 2000] {
        let queue = populated_queue(parties);

        group.bench_with_input(
            BenchmarkId::from_parameter(parties),
            &queue,
            |b, queue| {
                b.iter_batched(
                    || queue.clone(),
                    |mut q| q.add_player(vec![Player::new(u64::MAX, 25.0)]),
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_proc_matching, bench_add_player);
criterion_main!(benches);
