//! Round execution: group creation, aging, window adaptation
//!
//! One `proc_matching` call is one round — the queue's only notion of time.
//! A round conditionally attempts group creation over the priority ordering,
//! ages the parties that stay behind, and adapts the global match window to
//! stabilize throughput.

use std::collections::HashSet;
use tracing::{debug, info};

use crate::error::{QueueError, Result};
use crate::queue::MatchQueue;
use crate::types::{Group, Player, PlayerId, RemoveReason};

impl MatchQueue {
    /// Execute one matching round.
    ///
    /// Creation is attempted when enough rounds have passed since the last
    /// group was produced (bounding worst-case wait) or when the pool is
    /// large enough to batch early. If an attempt ran, every remaining party
    /// ages: its score compresses toward the midpoint and its window may
    /// widen. The global window adapts afterwards from the fraction of
    /// parties that left the pool.
    pub fn proc_matching(&mut self) -> Result<Vec<Group>> {
        if self.filter.is_none() {
            return Err(QueueError::NotInitialized.into());
        }

        self.state.round += 1;
        self.state.player_queued = self.player_cnt;
        self.state.match_window = self.match_window;

        let mut created = Vec::new();

        if self.player_cnt > 0 {
            let old_cnt = self.arrival.len();

            let attempt = self.state.round
                >= self.round_group_created + self.config.num_round_to_create_group
                || self.player_cnt >= self.config.num_player_to_create_group;

            if attempt {
                created = self.proc_create()?;
                if !created.is_empty() {
                    self.round_group_created = self.state.round;
                }

                // the parties left behind age: score and window refresh
                let window = self.match_window;
                if let Some(filter) = self.filter.as_ref() {
                    for leader in &self.arrival {
                        if let Some(party) = self.parties.get_mut(leader) {
                            party.wait_cnt += 1;
                            party.adjust_matching_factor(filter, &self.config, window);
                        }
                    }
                }
            }

            self.adjust_match_window(old_cnt);
        }

        debug!(
            round = self.state.round,
            groups = created.len(),
            queued = self.player_cnt,
            window = self.match_window,
            "round processed"
        );

        Ok(created)
    }

    /// Attempt to create groups from the current pool.
    ///
    /// Fails with [`QueueError::NotEnoughPlayers`] when the pool holds fewer
    /// players than the configured group minimum. Candidate sets that fail
    /// team balancing stay queued but remain claimed for the rest of this
    /// pass.
    pub(crate) fn proc_create(&mut self) -> Result<Vec<Group>> {
        if self.player_cnt < self.config.min_num_to_create_group {
            return Err(QueueError::NotEnoughPlayers.into());
        }

        let candidate_sets = self.collect_candidates();

        let mut groups = Vec::new();
        for candidates in candidate_sets {
            let Some(group) = self.new_group(&candidates) else {
                continue;
            };

            for leader in &candidates {
                self.remove_player(*leader, RemoveReason::Matched);
            }
            self.state.group_created += 1;

            info!(
                group_id = group.id,
                round = group.created_round,
                team0 = group.teams[0].len(),
                team1 = group.teams[1].len(),
                "group created"
            );
            groups.push(group);
        }

        Ok(groups)
    }

    /// One scan over the priority ordering, producing sets of mutually
    /// compatible parties.
    ///
    /// Each unclaimed party in turn becomes a base that greedily accumulates
    /// unclaimed parties further down the ordering, as long as the total
    /// player count fits the group maximum and the base's window accepts the
    /// candidate (the first accepted party needs no check). A set commits
    /// once it reaches the group minimum with at least two parties — one per
    /// team — and its members are claimed whether or not materialization
    /// later succeeds.
    fn collect_candidates(&self) -> Vec<Vec<PlayerId>> {
        let mut claimed: HashSet<PlayerId> = HashSet::new();
        let mut results = Vec::new();

        for (base_idx, base_id) in self.ranked.iter().enumerate() {
            if claimed.contains(base_id) {
                continue;
            }
            let Some(base) = self.parties.get(base_id) else {
                continue;
            };

            let mut candidates: Vec<PlayerId> = Vec::new();
            let mut player_cnt = 0usize;

            for leader in &self.ranked[base_idx..] {
                if claimed.contains(leader) {
                    continue;
                }
                let Some(party) = self.parties.get(leader) else {
                    continue;
                };

                if player_cnt + party.size() > self.config.max_num_to_create_group {
                    continue;
                }
                if player_cnt != 0 && !base.can_match(party) {
                    continue;
                }

                candidates.push(*leader);
                player_cnt += party.size();

                if player_cnt >= self.config.max_num_to_create_group && candidates.len() >= 2 {
                    // enough players gathered
                    break;
                }
            }

            // two teams need at least two parties
            if player_cnt >= self.config.min_num_to_create_group && candidates.len() >= 2 {
                claimed.extend(candidates.iter().copied());
                results.push(candidates);
            }
        }

        results
    }

    /// Materialize a candidate set into a group of two teams.
    ///
    /// Whole parties are dealt to whichever team is currently smaller,
    /// largest parties first. Returns `None` when the final team sizes differ
    /// by more than one; group ids are only spent on success.
    fn new_group(&mut self, candidates: &[PlayerId]) -> Option<Group> {
        let mut members: Vec<&crate::party::Party> = candidates
            .iter()
            .filter_map(|leader| self.parties.get(leader))
            .collect();
        members.sort_by(|a, b| b.size().cmp(&a.size()));

        let mut teams: [Vec<Player>; 2] = [Vec::new(), Vec::new()];
        let mut team = 0;
        for party in &members {
            // deal to the team with fewer players; ties keep the current side
            if teams[team].len() > teams[1 - team].len() {
                team = 1 - team;
            }
            teams[team].extend(party.players.iter().cloned());
        }

        if teams[0].len().abs_diff(teams[1].len()) > 1 {
            debug!(
                team0 = teams[0].len(),
                team1 = teams[1].len(),
                "candidate set unbalanced, discarded"
            );
            return None;
        }

        self.id_pool += 1;
        Some(Group {
            id: self.id_pool,
            teams,
            created_round: self.state.round,
        })
    }

    /// Adapt the global match window from the fraction of parties that left
    /// the pool this round.
    ///
    /// A rate outside the keep range widens the window by one step (more
    /// matches next round, at the cost of looser skill proximity); a rate
    /// inside it narrows by one step. Both directions clamp to the configured
    /// bounds, and a changed window propagates to every queued party.
    fn adjust_match_window(&mut self, old_cnt: usize) {
        if old_cnt == 0 || self.config.window_adjust_step <= 0.0 {
            return;
        }

        let old_window = self.match_window;

        // fraction of parties matched away this round
        let rate = 1.0 - self.arrival.len() as f64 / old_cnt as f64;

        if rate < self.config.min_rate_to_keep_window || rate > self.config.max_rate_to_keep_window
        {
            self.match_window =
                (self.match_window + self.config.window_adjust_step).min(self.config.max_match_window);
        } else {
            self.match_window =
                (self.match_window - self.config.window_adjust_step).max(self.config.min_match_window);
        }

        if self.match_window != old_window {
            debug!(
                old = old_window,
                new = self.match_window,
                rate,
                "match window adjusted"
            );

            let window = self.match_window;
            if let Some(filter) = self.filter.as_ref() {
                for party in self.parties.values_mut() {
                    party.update_window_size(filter, &self.config, window);
                }
            }
        }
    }
}
