//! Party: players enqueued together and matched as one unit
//!
//! A party owns its derived matching factors: the party-size-adjusted average
//! score, the bounded score (cached once), the wait-adjusted modified score
//! that matching actually compares, and the per-party match window. The queue
//! passes its filter chain and config into every adjustment; parties hold no
//! back-reference.

use chrono::{DateTime, Utc};

use crate::config::QueueConfig;
use crate::filter::ScoreFilter;
use crate::types::{Player, PlayerId};
use crate::utils::{clamp, current_timestamp};

#[derive(Debug, Clone)]
pub(crate) struct Party {
    pub(crate) leader: PlayerId,
    pub(crate) players: Vec<Player>,
    pub(crate) created_at: DateTime<Utc>,

    // matching factors
    pub(crate) avg_score: f64,
    pub(crate) avg_score_bound: Option<f64>,
    pub(crate) avg_score_mod: f64,
    pub(crate) match_window: f64,

    // state
    pub(crate) wait_cnt: u32,
}

impl Party {
    /// Build a party from the given players and compute its initial matching
    /// factors. Returns `None` for an empty player list.
    ///
    /// Only the bounded score is derived here (the factor-adjustment pass runs
    /// with window 0); the caller assigns a real window afterwards via
    /// [`Party::update_window_size`].
    pub(crate) fn new(
        filter: &ScoreFilter,
        config: &QueueConfig,
        players: Vec<Player>,
    ) -> Option<Self> {
        if players.is_empty() {
            return None;
        }

        let sum: f64 = players.iter().map(|p| p.score).sum();
        let avg = sum / players.len() as f64;

        let mut party = Self {
            leader: players[0].id,
            avg_score: filter.adjust_party_score(players.len(), avg),
            players,
            created_at: current_timestamp(),
            avg_score_bound: None,
            avg_score_mod: 0.0,
            match_window: 0.0,
            wait_cnt: 0,
        };

        party.adjust_matching_factor(filter, config, 0.0);

        Some(party)
    }

    pub(crate) fn size(&self) -> usize {
        self.players.len()
    }

    pub(crate) fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    /// Refresh the party's modified score, and with it the window size.
    ///
    /// The bounded score is computed exactly once and frozen; the modified
    /// score is always a pure function of `(bounded score, wait count)`. The
    /// window is only touched when the modified score actually moved and a
    /// positive queue window was supplied.
    pub(crate) fn adjust_matching_factor(
        &mut self,
        filter: &ScoreFilter,
        config: &QueueConfig,
        match_window: f64,
    ) {
        let old_score = self.avg_score_mod;

        let bound = *self
            .avg_score_bound
            .get_or_insert_with(|| filter.bound_score(self.avg_score));

        self.avg_score_mod = filter.modify_score(self.wait_cnt, bound);

        if old_score != self.avg_score_mod && match_window > 0.0 {
            self.update_window_size(filter, config, match_window);
        }
    }

    /// Derive this party's window from the queue's global window: filter
    /// adjustment plus a linear per-retry bonus, clamped to the configured
    /// range.
    pub(crate) fn update_window_size(
        &mut self,
        filter: &ScoreFilter,
        config: &QueueConfig,
        match_window: f64,
    ) {
        self.match_window = clamp(
            filter.adjust_window(self.avg_score_mod, match_window)
                + f64::from(self.wait_cnt) * config.window_adjust_per_retry,
            config.min_match_window,
            config.max_match_window,
        );
    }

    /// Whether `target` falls inside this party's window. Asymmetric: the
    /// caller's window governs.
    pub(crate) fn can_match(&self, target: &Party) -> bool {
        (target.avg_score_mod - self.avg_score_mod).abs() <= self.match_window
    }

    /// Whether this party outranks `target` in the priority ordering: larger
    /// parties first, ties broken by higher modified score.
    pub(crate) fn has_priority_to(&self, target: &Party) -> bool {
        if self.players.len() != target.players.len() {
            return self.players.len() > target.players.len();
        }

        self.avg_score_mod > target.avg_score_mod
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_mod_ratios;
    use crate::filter::{BoundStrategy, WindowStrategy};
    use proptest::prelude::*;

    fn bare_party(avg_score: f64) -> Party {
        Party {
            leader: 1,
            players: vec![Player::new(1, avg_score)],
            created_at: current_timestamp(),
            avg_score,
            avg_score_bound: None,
            avg_score_mod: 0.0,
            match_window: 0.0,
            wait_cnt: 0,
        }
    }

    fn party_of_size(size: usize, avg_score_mod: f64) -> Party {
        Party {
            leader: 1,
            players: (1..=size as u64).map(|id| Player::new(id, 0.0)).collect(),
            created_at: current_timestamp(),
            avg_score: 0.0,
            avg_score_bound: None,
            avg_score_mod,
            match_window: 0.0,
            wait_cnt: 0,
        }
    }

    #[test]
    fn test_new_party() {
        let filter = ScoreFilter::new(
            BoundStrategy::Simple,
            WindowStrategy::Simple,
            default_mod_ratios(),
        );
        let config = QueueConfig::default();
        let players = vec![
            Player::new(1, 34.0),
            Player::new(2, 23.25),
            Player::new(3, 22.5),
            Player::new(4, 19.25),
        ];

        let party = Party::new(&filter, &config, players).unwrap();

        assert_eq!(party.leader, 1);
        assert_eq!(party.avg_score, 37.125);
        assert_eq!(party.avg_score_bound, Some(74.25));
        assert_eq!(party.avg_score_mod, 74.25);
        // window is assigned separately by the caller
        assert_eq!(party.match_window, 0.0);
    }

    #[test]
    fn test_new_party_empty() {
        let filter = ScoreFilter::new(BoundStrategy::Simple, WindowStrategy::Simple, vec![]);
        let config = QueueConfig::default();

        assert!(Party::new(&filter, &config, vec![]).is_none());
    }

    #[test]
    fn test_player_ids() {
        let filter = ScoreFilter::new(BoundStrategy::Simple, WindowStrategy::Simple, vec![]);
        let config = QueueConfig::default();
        let players = vec![
            Player::new(1, 0.0),
            Player::new(3, 0.0),
            Player::new(6, 0.0),
            Player::new(9, 0.0),
        ];

        let party = Party::new(&filter, &config, players).unwrap();

        assert_eq!(party.player_ids(), vec![1, 3, 6, 9]);
    }

    #[test]
    fn test_adjust_matching_factor_simple() {
        let filter = ScoreFilter::new(
            BoundStrategy::Simple,
            WindowStrategy::Simple,
            default_mod_ratios(),
        );
        let config = QueueConfig {
            min_match_window: 0.0,
            max_match_window: 100.0,
            window_adjust_per_retry: 0.0,
            ..QueueConfig::default()
        };
        let mut party = bare_party(24.4);

        party.adjust_matching_factor(&filter, &config, 15.0);

        assert_eq!(party.avg_score_mod, 48.8);
        assert_eq!(party.match_window, 15.0);
    }

    #[test]
    fn test_adjust_matching_factor_curve_calculated() {
        let filter = ScoreFilter::new(
            BoundStrategy::Curve,
            WindowStrategy::Calculated,
            default_mod_ratios(),
        );
        let config = QueueConfig {
            min_match_window: 0.0,
            max_match_window: 100.0,
            window_adjust_per_retry: 0.0,
            ..QueueConfig::default()
        };
        let mut party = bare_party(24.4);

        party.adjust_matching_factor(&filter, &config, 15.0);

        assert!((party.avg_score_mod - 47.712116831117335).abs() < 1e-9);
        assert!((party.match_window - 14.92154188734874).abs() < 1e-9);
    }

    #[test]
    fn test_bound_score_cached_once() {
        let filter = ScoreFilter::new(
            BoundStrategy::Simple,
            WindowStrategy::Simple,
            default_mod_ratios(),
        );
        let config = QueueConfig::default();
        let mut party = bare_party(24.4);

        party.adjust_matching_factor(&filter, &config, 0.0);
        let first_bound = party.avg_score_bound;

        // mutating the raw average must not reopen the cached bound
        party.avg_score = 999.0;
        party.adjust_matching_factor(&filter, &config, 0.0);

        assert_eq!(party.avg_score_bound, first_bound);
    }

    #[test]
    fn test_can_match() {
        let mut party = bare_party(0.0);
        party.avg_score_mod = 67.3;
        party.match_window = 15.2;

        let mut target = bare_party(0.0);
        target.avg_score_mod = 55.5;

        assert!(party.can_match(&target));

        party.match_window = 10.2;
        assert!(!party.can_match(&target));
    }

    #[test]
    fn test_has_priority_to() {
        let party = party_of_size(4, 50.0);

        assert!(party.has_priority_to(&party_of_size(3, 50.0)));
        assert!(!party.has_priority_to(&party_of_size(5, 50.0)));
        assert!(party.has_priority_to(&party_of_size(4, 49.99)));
        assert!(!party.has_priority_to(&party_of_size(4, 50.01)));
    }

    proptest! {
        #[test]
        fn prop_priority_is_asymmetric(
            size_a in 1usize..6, score_a in 0.0..100.0f64,
            size_b in 1usize..6, score_b in 0.0..100.0f64,
        ) {
            let a = party_of_size(size_a, score_a);
            let b = party_of_size(size_b, score_b);

            // never both a > b and b > a
            prop_assert!(!(a.has_priority_to(&b) && b.has_priority_to(&a)));
        }

        #[test]
        fn prop_priority_is_transitive(
            sizes in proptest::array::uniform3(1usize..4),
            scores in proptest::array::uniform3(0.0..100.0f64),
        ) {
            let a = party_of_size(sizes[0], scores[0]);
            let b = party_of_size(sizes[1], scores[1]);
            let c = party_of_size(sizes[2], scores[2]);

            if a.has_priority_to(&b) && b.has_priority_to(&c) {
                prop_assert!(a.has_priority_to(&c));
            }
        }

        #[test]
        fn prop_window_stays_clamped(
            score in 0.0..100.0f64,
            window in 0.0..200.0f64,
            wait_cnt in 0u32..50,
        ) {
            let filter = ScoreFilter::new(
                BoundStrategy::Curve,
                WindowStrategy::Calculated,
                default_mod_ratios(),
            );
            let config = QueueConfig::default();
            let mut party = bare_party(score);
            party.wait_cnt = wait_cnt;

            party.update_window_size(&filter, &config, window);

            prop_assert!(party.match_window >= config.min_match_window);
            prop_assert!(party.match_window <= config.max_match_window);
        }
    }
}
