//! Round and lifetime statistics for a queue
//!
//! A snapshot of the latest round plus running totals. Averages are recomputed
//! from the sums on every update; no per-party history is retained.

use serde::{Deserialize, Serialize};

/// Statistics accumulated over a queue's lifetime
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueState {
    // snapshot of the latest round
    /// Last round number.
    pub round: u64,
    /// Players queued when the latest round started.
    pub player_queued: usize,
    /// Global match window when the latest round started.
    pub match_window: f64,

    // accumulations
    /// Number of groups created.
    pub group_created: u64,
    /// Sum of wait time (seconds) of all matched players.
    pub wait_time_all: u64,
    /// Average wait time (seconds) of all matched players.
    pub wait_time_avg: u64,
    /// Maximum wait time (seconds) among all matched players.
    pub wait_time_max: u64,
    /// Number of matched players.
    pub player_matched: u64,
    /// Sum of wait time (seconds) of all canceled players.
    pub canceled_wait_time_all: u64,
    /// Average wait time (seconds) of all canceled players.
    pub canceled_wait_time_avg: u64,
    /// Maximum wait time (seconds) among all canceled players.
    pub canceled_wait_time_max: u64,
    /// Number of canceled players.
    pub player_canceled: u64,
}

impl QueueState {
    /// Record `cnt` players matched after waiting `wait_secs`.
    pub fn add_matched(&mut self, wait_secs: u64, cnt: usize) {
        if cnt == 0 {
            return;
        }

        self.player_matched += cnt as u64;
        self.wait_time_all += wait_secs * cnt as u64;
        self.wait_time_avg = self.wait_time_all / self.player_matched;
        self.wait_time_max = self.wait_time_max.max(wait_secs);
    }

    /// Record `cnt` players canceled after waiting `wait_secs`.
    pub fn add_canceled(&mut self, wait_secs: u64, cnt: usize) {
        if cnt == 0 {
            return;
        }

        self.player_canceled += cnt as u64;
        self.canceled_wait_time_all += wait_secs * cnt as u64;
        self.canceled_wait_time_avg = self.canceled_wait_time_all / self.player_canceled;
        self.canceled_wait_time_max = self.canceled_wait_time_max.max(wait_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_matched() {
        let mut state = QueueState::default();

        state.add_matched(10, 4);
        assert_eq!(state.player_matched, 4);
        assert_eq!(state.wait_time_all, 40);
        assert_eq!(state.wait_time_avg, 10);
        assert_eq!(state.wait_time_max, 10);

        state.add_matched(40, 2);
        assert_eq!(state.player_matched, 6);
        assert_eq!(state.wait_time_all, 120);
        assert_eq!(state.wait_time_avg, 20);
        assert_eq!(state.wait_time_max, 40);
    }

    #[test]
    fn test_add_canceled() {
        let mut state = QueueState::default();

        state.add_canceled(6, 3);
        state.add_canceled(30, 1);

        assert_eq!(state.player_canceled, 4);
        assert_eq!(state.canceled_wait_time_all, 48);
        assert_eq!(state.canceled_wait_time_avg, 12);
        assert_eq!(state.canceled_wait_time_max, 30);
    }

    #[test]
    fn test_zero_count_is_ignored() {
        let mut state = QueueState::default();

        state.add_matched(99, 0);
        state.add_canceled(99, 0);

        assert_eq!(state, QueueState::default());
    }
}
