//! Score-transform filter chain
//!
//! Pure numeric transforms that reshape a party's raw score into the bounded
//! coordinate matching actually happens in, and that rescale matching windows
//! to stay meaningful under that transform. All functions are total over the
//! reals; degenerate inputs are clamped rather than rejected.

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_2_PI, FRAC_PI_2};

use crate::utils::clamp;

/// Lower edge of the bounded score domain.
pub const SCORE_BOUND_MIN: f64 = 0.0;
/// Upper edge of the bounded score domain.
pub const SCORE_BOUND_MAX: f64 = 100.0;

const SCORE_BOUND_MID: f64 = (SCORE_BOUND_MAX + SCORE_BOUND_MIN) / 2.0;
const SCORE_BOUND_RANGE: f64 = (SCORE_BOUND_MAX - SCORE_BOUND_MIN) / 2.0;

// Raw-score parameters shared by the curve, its inverse, and its derivative.
const RAW_SCORE_MID: f64 = 25.0;
const RAW_SCORE_RANGE: f64 = 25.0;
const CURVE_SLOPE: f64 = 3.0;

// Peak derivative of the bound curve, reached at the raw midpoint with slope 3.0.
const CURVE_PEAK_DERIVATIVE: f64 = 3.82;

// Multi-player parties get their average score inflated by this factor.
const PARTY_SCORE_PENALTY: f64 = 1.5;

/// Strategy for mapping a raw score into the bounded domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundStrategy {
    /// `clamp(2 * score, 0, 100)`
    #[default]
    Simple,
    /// S-curve centered at 50: compresses outliers, near-linear mid-range.
    Curve,
}

/// Strategy for adjusting a matching window against the bounded domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowStrategy {
    /// Window passes through unchanged.
    #[default]
    Simple,
    /// Window is rescaled by the local slope of the bound curve so that the
    /// tolerance stays roughly constant in raw-score units.
    Calculated,
}

/// The filter chain consumed by parties: party-score adjustment, score
/// bounding, wait-based score modification, and window adjustment.
///
/// The modifier-ratio table is supplied at construction; index = wait-round
/// bucket, clamped to the last entry past the end of the table.
#[derive(Debug, Clone)]
pub struct ScoreFilter {
    bound: BoundStrategy,
    window: WindowStrategy,
    mod_ratios: Vec<f64>,
}

impl ScoreFilter {
    pub fn new(bound: BoundStrategy, window: WindowStrategy, mod_ratios: Vec<f64>) -> Self {
        Self {
            bound,
            window,
            mod_ratios,
        }
    }

    /// Party-size adjustment of an averaged score. Parties of more than one
    /// player carry a fixed penalty factor.
    pub fn adjust_party_score(&self, member_cnt: usize, score: f64) -> f64 {
        if member_cnt > 1 {
            PARTY_SCORE_PENALTY * score
        } else {
            score
        }
    }

    /// Map a raw score into `[SCORE_BOUND_MIN, SCORE_BOUND_MAX]`.
    pub fn bound_score(&self, score: f64) -> f64 {
        match self.bound {
            BoundStrategy::Simple => clamp(2.0 * score, SCORE_BOUND_MIN, SCORE_BOUND_MAX),
            BoundStrategy::Curve => bound_curve(score),
        }
    }

    /// Pull a bounded score toward the midpoint according to how long the
    /// party has waited. Ratio 1.0 is identity; smaller ratios progressively
    /// widen who the party can match against.
    pub fn modify_score(&self, wait_cnt: u32, score: f64) -> f64 {
        if self.mod_ratios.is_empty() {
            return score;
        }

        let idx = (wait_cnt as usize).min(self.mod_ratios.len() - 1);
        SCORE_BOUND_MID + (score - SCORE_BOUND_MID) * self.mod_ratios[idx]
    }

    /// Adjust a raw matching window for comparison in the bounded domain.
    pub fn adjust_window(&self, score: f64, window: f64) -> f64 {
        match self.window {
            WindowStrategy::Simple => window,
            WindowStrategy::Calculated => {
                window * derivative_bound(inverse_bound(score)) / CURVE_PEAK_DERIVATIVE
            }
        }
    }
}

fn bound_curve(score: f64) -> f64 {
    SCORE_BOUND_MID
        + SCORE_BOUND_RANGE
            * FRAC_2_PI
            * ((score - RAW_SCORE_MID) * (CURVE_SLOPE / RAW_SCORE_RANGE)).atan()
}

fn inverse_bound(t: f64) -> f64 {
    RAW_SCORE_MID
        + (RAW_SCORE_RANGE / CURVE_SLOPE)
            * ((t - SCORE_BOUND_MID) * FRAC_PI_2 / SCORE_BOUND_RANGE).tan()
}

fn derivative_bound(score: f64) -> f64 {
    (FRAC_2_PI * CURVE_SLOPE * SCORE_BOUND_RANGE / RAW_SCORE_RANGE)
        * (1.0 / (1.0 + (CURVE_SLOPE * (score - RAW_SCORE_MID) / RAW_SCORE_RANGE).powi(2)))
}
