//! Queue configuration
//!
//! This module defines the flat tunables struct for a matchmaking queue,
//! loading from TOML files, and validation. Configuration is read at queue
//! construction and immutable thereafter.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{QueueError, Result};
use crate::filter::{BoundStrategy, WindowStrategy};

/// The canonical modifier-ratio table: parties keep their bounded score for
/// the first five rounds, then trend toward the midpoint as they wait.
///
/// Constructed explicitly and handed to the filter factory; there is no
/// ambient process-wide default.
pub fn default_mod_ratios() -> Vec<f64> {
    vec![
        1.0, 1.0, 1.0, 1.0, 1.0, 0.8, 0.6, 0.4, 0.2, 0.2, 0.2, 0.2, 0.2, 0.2, 0.2, 0.2, 0.2, 0.2,
        0.2, 0.2,
    ]
}

/// Tunables for a matchmaking queue
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    // match window
    pub init_match_window: f64,
    pub min_match_window: f64,
    pub max_match_window: f64,
    pub window_adjust_step: f64,
    pub min_rate_to_keep_window: f64,
    pub max_rate_to_keep_window: f64,
    pub window_adjust_per_retry: f64,

    // filter
    pub score_bound_filter: BoundStrategy,
    pub score_mod_ratio: Vec<f64>,
    pub matching_window_filter: WindowStrategy,

    // group
    pub min_num_to_create_group: usize,
    pub max_num_to_create_group: usize,
    pub num_player_to_create_group: usize,
    pub num_round_to_create_group: u64,

    // notification
    pub notify_threshold_wait: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            init_match_window: 10.0,
            min_match_window: 5.0,
            max_match_window: 50.0,
            window_adjust_step: 0.1,
            min_rate_to_keep_window: 0.85,
            max_rate_to_keep_window: 0.95,
            window_adjust_per_retry: 0.5,
            score_bound_filter: BoundStrategy::Curve,
            score_mod_ratio: default_mod_ratios(),
            matching_window_filter: WindowStrategy::Calculated,
            min_num_to_create_group: 10,
            max_num_to_create_group: 16,
            num_player_to_create_group: 40,
            num_round_to_create_group: 2,
            notify_threshold_wait: 10,
        }
    }
}

impl QueueConfig {
    /// Load configuration from a TOML file. Missing fields fall back to the
    /// documented defaults; unknown strategy names fail here rather than
    /// silently defaulting later.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: QueueConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the tunables are mutually consistent.
    pub fn validate(&self) -> Result<()> {
        if self.min_match_window > self.max_match_window {
            return Err(invalid("min_match_window exceeds max_match_window"));
        }
        if self.init_match_window < self.min_match_window
            || self.init_match_window > self.max_match_window
        {
            return Err(invalid(
                "init_match_window outside [min_match_window, max_match_window]",
            ));
        }
        if self.window_adjust_step < 0.0 {
            return Err(invalid("window_adjust_step must not be negative"));
        }
        if self.window_adjust_per_retry < 0.0 {
            return Err(invalid("window_adjust_per_retry must not be negative"));
        }
        if !(0.0..=1.0).contains(&self.min_rate_to_keep_window)
            || !(0.0..=1.0).contains(&self.max_rate_to_keep_window)
            || self.min_rate_to_keep_window > self.max_rate_to_keep_window
        {
            return Err(invalid(
                "rate-to-keep bounds must satisfy 0 <= min <= max <= 1",
            ));
        }
        if self.score_mod_ratio.is_empty() {
            return Err(invalid("score_mod_ratio must not be empty"));
        }
        if self.score_mod_ratio.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(invalid("score_mod_ratio entries must be finite and >= 0"));
        }
        if self.min_num_to_create_group < 2 {
            return Err(invalid(
                "min_num_to_create_group must allow at least one player per team",
            ));
        }
        if self.max_num_to_create_group < self.min_num_to_create_group {
            return Err(invalid(
                "max_num_to_create_group below min_num_to_create_group",
            ));
        }
        if self.num_round_to_create_group == 0 {
            return Err(invalid("num_round_to_create_group must be at least 1"));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> anyhow::Error {
    QueueError::InvalidConfiguration {
        message: message.to_string(),
    }
    .into()
}
