//! Queue Simulation Driver
//!
//! Command-line tool that stands in for the external round driver: it seeds
//! random parties into a matchmaking queue, triggers rounds, and reports the
//! groups that come out.
//!
//! Usage:
//!   cargo run --bin queue-sim -- --rounds 30 --parties-per-round 6
//!   cargo run --bin queue-sim -- --config queue.toml --seed 42
//!   RUST_LOG=debug cargo run --bin queue-sim

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use arena_queue::{MatchQueue, Notification, Player, QueueConfig, QueueError};

#[derive(Parser)]
#[command(name = "queue-sim")]
#[command(about = "Round driver simulation for the arena-queue matchmaking core")]
struct Cli {
    /// Number of rounds to simulate
    #[arg(long, default_value_t = 30)]
    rounds: u32,

    /// Parties enqueued before each round
    #[arg(long, default_value_t = 6)]
    parties_per_round: u32,

    /// Largest party size to generate
    #[arg(long, default_value_t = 4)]
    max_party_size: u64,

    /// RNG seed for reproducible runs
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Optional TOML file overriding the default tunables
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => QueueConfig::from_file(path)?,
        None => QueueConfig::default(),
    };
    let notify_threshold = config.notify_threshold_wait;

    let mut queue = MatchQueue::new(config)?;
    let mut rng = StdRng::seed_from_u64(cli.seed);
    let mut next_id: u64 = 1;
    let mut dry_rounds: u32 = 0;

    for round in 1..=cli.rounds {
        for _ in 0..cli.parties_per_round {
            let size = rng.gen_range(1..=cli.max_party_size);
            let players: Vec<Player> = (0..size)
                .map(|_| {
                    let id = next_id;
                    next_id += 1;
                    Player::new(id, rng.gen_range(0.0..50.0))
                })
                .collect();
            queue.add_player(players);
        }

        let groups = match queue.proc_matching() {
            Ok(groups) => groups,
            Err(err)
                if matches!(
                    err.downcast_ref::<QueueError>(),
                    Some(QueueError::NotEnoughPlayers)
                ) =>
            {
                debug!(round, "not enough players queued, retrying next round");
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        for group in &groups {
            let notification = Notification::new("group_created")
                .with_data("group_id", json!(group.id))
                .with_data("round", json!(group.created_round))
                .with_data("team0", json!(group.team_ids(0)))
                .with_data("team1", json!(group.team_ids(1)));
            emit(&notification)?;
        }

        // the delivery mechanism decides what to do with a stalled queue;
        // here we just surface it
        if groups.is_empty() {
            dry_rounds += 1;
            if dry_rounds == notify_threshold {
                let notification = Notification::new("queue_stalled")
                    .with_data("round", json!(round))
                    .with_data("players_queued", json!(queue.player_count()));
                emit(&notification)?;
            }
        } else {
            dry_rounds = 0;
        }

        info!(
            round,
            groups = groups.len(),
            parties = queue.party_count(),
            players = queue.player_count(),
            window = queue.match_window(),
            "round complete"
        );
    }

    println!("{}", serde_json::to_string_pretty(&queue.state())?);

    Ok(())
}

fn emit(notification: &Notification) -> Result<()> {
    info!(
        message = %notification.message,
        data = %serde_json::to_string(&notification.data)?,
        "notification"
    );
    Ok(())
}
