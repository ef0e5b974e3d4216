//! Common types used throughout the matchmaking queue

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for players. Valid ids are positive.
pub type PlayerId = u64;

/// Unique identifier for groups, allocated monotonically starting at 1.
pub type GroupId = u64;

/// A player waiting to be matched. Scores are supplied pre-computed by the
/// caller; this crate never derives them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub score: f64,
}

impl Player {
    pub fn new(id: PlayerId, score: f64) -> Self {
        Self { id, score }
    }
}

/// A finalized match: two nearly-equal teams of players.
///
/// Invariant: team sizes never differ by more than one; a grouping that
/// cannot satisfy this is discarded instead of created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub teams: [Vec<Player>; 2],
    pub created_round: u64,
}

impl Group {
    /// Player ids of one team.
    pub fn team_ids(&self, team: usize) -> Vec<PlayerId> {
        self.teams[team].iter().map(|p| p.id).collect()
    }

    /// Total number of players across both teams.
    pub fn player_count(&self) -> usize {
        self.teams[0].len() + self.teams[1].len()
    }
}

/// Why a party left the queue. Statistics are recorded according to the
/// reason: cancellations feed the canceled-wait accumulators, matched
/// removals feed the matched-wait accumulators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoveReason {
    /// The party was removed by an explicit caller request.
    Canceled,
    /// The party was absorbed into a created group.
    Matched,
}

impl std::fmt::Display for RemoveReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoveReason::Canceled => write!(f, "canceled"),
            RemoveReason::Matched => write!(f, "matched"),
        }
    }
}

/// Message payload shared with an external delivery mechanism.
///
/// The queue core never decides when notifications fire; this is vocabulary
/// for the surrounding service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub data: HashMap<String, serde_json::Value>,
}

impl Notification {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: HashMap::new(),
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }
}
