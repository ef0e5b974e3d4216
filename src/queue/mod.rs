//! The waiting pool of parties
//!
//! This module owns the queued parties and the two synchronized orderings over
//! them: arrival order (lookup and removal) and priority order (the scan order
//! for matching). Parties live in an arena keyed by their leader's id; both
//! orderings hold handles into it, and every mutation updates all three
//! together.

pub mod round;

use std::collections::HashMap;
use tracing::{debug, error, warn};

use crate::config::QueueConfig;
use crate::error::Result;
use crate::filter::ScoreFilter;
use crate::party::Party;
use crate::state::QueueState;
use crate::types::{Group, GroupId, Player, PlayerId, RemoveReason};
use crate::utils::{elapsed_seconds, insert_position};

/// Core trait for a matchmaking queue
pub trait Queue {
    /// Add players to the queue as one party and derive its matching factors.
    fn add_player(&mut self, players: Vec<Player>);

    /// Remove a party from the queue by its leader's id.
    /// All players added together are removed together.
    fn remove_player(&mut self, leader: PlayerId, reason: RemoveReason);

    /// Execute one matching round. Called once per external tick.
    fn proc_matching(&mut self) -> Result<Vec<Group>>;

    /// The queue's current state snapshot.
    fn state(&self) -> QueueState;
}

/// A skill-based matchmaking queue over a single pool of parties.
///
/// Single-threaded and call-driven: all mutation happens synchronously inside
/// the `Queue` methods, and exactly one in-flight call per instance is
/// assumed. Independent instances (per game mode or region) need no
/// coordination.
#[derive(Debug, Clone, Default)]
pub struct MatchQueue {
    pub(crate) config: QueueConfig,

    // party arena plus the two orderings of its handles
    pub(crate) parties: HashMap<PlayerId, Party>,
    pub(crate) arrival: Vec<PlayerId>,
    pub(crate) ranked: Vec<PlayerId>,

    // match filter; a default-constructed queue has none and refuses to match
    pub(crate) filter: Option<ScoreFilter>,

    // match state
    pub(crate) match_window: f64,
    pub(crate) player_cnt: usize,
    pub(crate) round_group_created: u64,

    pub(crate) state: QueueState,

    pub(crate) id_pool: GroupId,
}

impl MatchQueue {
    /// Create a new matching queue. Validates the configuration and builds
    /// the filter chain from it.
    pub fn new(config: QueueConfig) -> Result<Self> {
        config.validate()?;

        let filter = ScoreFilter::new(
            config.score_bound_filter,
            config.matching_window_filter,
            config.score_mod_ratio.clone(),
        );

        Ok(Self {
            match_window: config.init_match_window,
            filter: Some(filter),
            config,
            ..Self::default()
        })
    }

    /// Current global match window.
    pub fn match_window(&self) -> f64 {
        self.match_window
    }

    /// Number of players waiting in the pool.
    pub fn player_count(&self) -> usize {
        self.player_cnt
    }

    /// Number of parties waiting in the pool.
    pub fn party_count(&self) -> usize {
        self.arrival.len()
    }

    pub fn add_player(&mut self, players: Vec<Player>) {
        if players.is_empty() {
            return;
        }

        let Some(filter) = self.filter.as_ref() else {
            error!("add_player called on an uninitialized queue");
            return;
        };

        let Some(mut party) = Party::new(filter, &self.config, players) else {
            return;
        };
        party.update_window_size(filter, &self.config, self.match_window);

        self.add_party(party);
    }

    fn add_party(&mut self, party: Party) {
        let leader = party.leader;
        if self.parties.contains_key(&leader) {
            warn!(leader, "party leader already queued, enqueue ignored");
            return;
        }

        // first slot in the priority ordering where the newcomer outranks the
        // incumbent; past the end means it ranks below everything queued
        let rank = insert_position(self.ranked.len(), |i| {
            party.has_priority_to(&self.parties[&self.ranked[i]])
        });

        debug!(
            leader,
            players = ?party.player_ids(),
            rank,
            "party enqueued"
        );

        self.player_cnt += party.size();
        self.parties.insert(leader, party);
        self.arrival.push(leader);
        self.ranked.insert(rank, leader);
    }

    pub fn remove_player(&mut self, leader: PlayerId, reason: RemoveReason) {
        if leader == 0 {
            return;
        }

        let Some(party) = self.parties.remove(&leader) else {
            return;
        };
        self.arrival.retain(|id| *id != leader);
        self.ranked.retain(|id| *id != leader);

        self.player_cnt = self.player_cnt.saturating_sub(party.size());

        let wait_secs = elapsed_seconds(party.created_at);
        match reason {
            RemoveReason::Canceled => self.state.add_canceled(wait_secs, party.size()),
            RemoveReason::Matched => self.state.add_matched(wait_secs, party.size()),
        }

        debug!(leader, members = party.size(), %reason, wait_secs, "party removed");
    }

    pub fn state(&self) -> QueueState {
        self.state.clone()
    }
}

impl Queue for MatchQueue {
    fn add_player(&mut self, players: Vec<Player>) {
        MatchQueue::add_player(self, players);
    }

    fn remove_player(&mut self, leader: PlayerId, reason: RemoveReason) {
        MatchQueue::remove_player(self, leader, reason);
    }

    fn proc_matching(&mut self) -> Result<Vec<Group>> {
        MatchQueue::proc_matching(self)
    }

    fn state(&self) -> QueueState {
        MatchQueue::state(self)
    }
}
