//! Crash point distribution and the multiplier curve.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{GameError, GameRng};

/// Curve exponent on elapsed seconds.
pub const CURVE_EXPONENT: f64 = 1.3;

/// One band of the crash point distribution. A tier is picked with
/// probability proportional to `weight`, then a point is drawn uniformly
/// from `[min, max)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrashTier {
    pub weight: f64,
    pub min: f64,
    pub max: f64,
}

impl CrashTier {
    #[must_use]
    pub const fn new(weight: f64, min: f64, max: f64) -> Self {
        Self { weight, min, max }
    }

    /// 50% [1.1, 2), 30% [2, 5), 15% [5, 10), 5% [10, 50).
    #[must_use]
    pub fn default_tiers() -> Vec<CrashTier> {
        vec![
            CrashTier::new(0.50, 1.1, 2.0),
            CrashTier::new(0.30, 2.0, 5.0),
            CrashTier::new(0.15, 5.0, 10.0),
            CrashTier::new(0.05, 10.0, 50.0),
        ]
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(GameError::InvalidConfig("tier weight must be non-negative".into()));
        }
        if !(self.min >= 1.0) || !self.max.is_finite() || self.max <= self.min {
            return Err(GameError::InvalidConfig(format!(
                "tier range [{}, {}) is invalid",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Draw a crash point, rounded down to two decimals.
///
/// `tiers` must have passed validation with at least one positive weight.
pub fn generate_crash_point(rng: &mut GameRng, tiers: &[CrashTier]) -> f64 {
    let total: f64 = tiers.iter().map(|t| t.weight).sum();
    let mut roll = rng.gen_f64() * total;

    let tier = tiers
        .iter()
        .find(|t| {
            if roll < t.weight {
                return true;
            }
            roll -= t.weight;
            false
        })
        .or_else(|| tiers.iter().rev().find(|t| t.weight > 0.0))
        .copied()
        .unwrap_or(CrashTier::new(1.0, 1.1, 2.0));

    let point = rng.gen_f64_range(tier.min, tier.max);
    ((point * 100.0).floor() / 100.0).max(tier.min)
}

/// Displayed multiplier after `elapsed`: `1 + t^1.3 × scaling`, clamped
/// at `crash_point`.
#[must_use]
pub fn multiplier_at(elapsed: Duration, scaling: f64, crash_point: f64) -> f64 {
    let t = elapsed.as_secs_f64();
    (1.0 + t.powf(CURVE_EXPONENT) * scaling).min(crash_point)
}
