//! Engine configuration.
//!
//! Each engine is configured at construction:
//! - `StackemConfig`: ante, difficulty, dealing and board geometry
//! - `CrashConfig`: betting limits, multiplier curve and crash distribution
//!
//! Defaults reproduce the shipped game rules. Builders return `Self` so
//! configs read top to bottom, and `validate()` rejects values the engines
//! cannot run with.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::GameError;
use super::leveling::{LevelCurve, LEVEL_UP_BONUS_CHIPS};
use crate::crash::CrashTier;
use crate::stackem::BoardLayout;

/// Stack'em starting board difficulty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Cards placed on the board before the first deal.
    #[must_use]
    pub const fn preplaced_cards(self) -> usize {
        match self {
            Self::Easy => 0,
            Self::Medium => 3,
            Self::Hard => 6,
        }
    }
}

/// Configuration for a Stack'em session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StackemConfig {
    /// Chips deducted per placement until the ante locks.
    pub ante: u64,

    /// Starting board difficulty.
    pub difficulty: Difficulty,

    /// Cards taken into hand per deal.
    pub hand_size: usize,

    /// Fresh decks allowed after the first one runs low.
    pub max_reshuffles: u32,

    /// Largest distance (px) from a drop point to a slot center that still
    /// counts as a drop on that slot.
    pub drop_threshold: f32,

    /// Board geometry used to resolve drop points.
    pub layout: BoardLayout,

    /// Delay between collecting winnings and re-evaluating the level.
    pub level_check_delay: Duration,

    /// Experience curve.
    pub level_curve: LevelCurve,

    /// Chips paid per level gained.
    pub level_bonus_chips: u64,
}

impl Default for StackemConfig {
    fn default() -> Self {
        Self {
            ante: 10,
            difficulty: Difficulty::Easy,
            hand_size: 3,
            max_reshuffles: 3,
            drop_threshold: 80.0,
            layout: BoardLayout::default(),
            level_check_delay: Duration::from_millis(500),
            level_curve: LevelCurve::STACKEM,
            level_bonus_chips: LEVEL_UP_BONUS_CHIPS,
        }
    }
}

impl StackemConfig {
    #[must_use]
    pub fn with_ante(mut self, ante: u64) -> Self {
        self.ante = ante;
        self
    }

    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    #[must_use]
    pub fn with_max_reshuffles(mut self, reshuffles: u32) -> Self {
        self.max_reshuffles = reshuffles;
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: BoardLayout) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_level_check_delay(mut self, delay: Duration) -> Self {
        self.level_check_delay = delay;
        self
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.ante == 0 {
            return Err(GameError::InvalidConfig("ante must be positive".into()));
        }
        if self.hand_size == 0 {
            return Err(GameError::InvalidConfig("hand_size must be positive".into()));
        }
        if !(self.drop_threshold > 0.0) {
            return Err(GameError::InvalidConfig("drop_threshold must be positive".into()));
        }
        self.layout.validate()
    }
}

/// Configuration for a Space Crash session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrashConfig {
    /// Smallest accepted bet.
    pub min_bet: u64,

    /// Curve coefficient: `multiplier = 1 + t^1.3 * scaling`.
    pub scaling: f64,

    /// Weighted crash point distribution.
    pub tiers: Vec<CrashTier>,

    /// Crash points kept in the rolling history.
    pub history_len: usize,

    /// Resolved bets kept for display.
    pub recent_bets_len: usize,

    /// Flat experience granted on every reset.
    pub xp_per_round: u64,

    /// Experience curve.
    pub level_curve: LevelCurve,

    /// Chips paid per level gained.
    pub level_bonus_chips: u64,
}

impl Default for CrashConfig {
    fn default() -> Self {
        Self {
            min_bet: 1,
            scaling: 0.1,
            tiers: CrashTier::default_tiers(),
            history_len: 10,
            recent_bets_len: 20,
            xp_per_round: 10,
            level_curve: LevelCurve::CRASH,
            level_bonus_chips: LEVEL_UP_BONUS_CHIPS,
        }
    }
}

impl CrashConfig {
    #[must_use]
    pub fn with_min_bet(mut self, min_bet: u64) -> Self {
        self.min_bet = min_bet;
        self
    }

    #[must_use]
    pub fn with_scaling(mut self, scaling: f64) -> Self {
        self.scaling = scaling;
        self
    }

    #[must_use]
    pub fn with_tiers(mut self, tiers: Vec<CrashTier>) -> Self {
        self.tiers = tiers;
        self
    }

    #[must_use]
    pub fn with_xp_per_round(mut self, xp: u64) -> Self {
        self.xp_per_round = xp;
        self
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if !(self.scaling > 0.0) || !self.scaling.is_finite() {
            return Err(GameError::InvalidConfig("scaling must be positive".into()));
        }
        if self.min_bet == 0 {
            return Err(GameError::InvalidConfig("min_bet must be positive".into()));
        }
        if self.history_len == 0 {
            return Err(GameError::InvalidConfig("history_len must be positive".into()));
        }
        if self.tiers.is_empty() || self.tiers.iter().all(|t| t.weight <= 0.0) {
            return Err(GameError::InvalidConfig("at least one tier needs weight".into()));
        }
        for tier in &self.tiers {
            tier.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_preplaced() {
        assert_eq!(Difficulty::Easy.preplaced_cards(), 0);
        assert_eq!(Difficulty::Medium.preplaced_cards(), 3);
        assert_eq!(Difficulty::Hard.preplaced_cards(), 6);
    }

    #[test]
    fn test_stackem_defaults() {
        let config = StackemConfig::default();
        assert_eq!(config.hand_size, 3);
        assert_eq!(config.max_reshuffles, 3);
        assert_eq!(config.drop_threshold, 80.0);
        assert_eq!(config.level_check_delay, Duration::from_millis(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_stackem_builder() {
        let config = StackemConfig::default()
            .with_ante(25)
            .with_difficulty(Difficulty::Hard)
            .with_max_reshuffles(1);

        assert_eq!(config.ante, 25);
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert_eq!(config.max_reshuffles, 1);
    }

    #[test]
    fn test_stackem_rejects_zero_ante() {
        assert!(StackemConfig::default().with_ante(0).validate().is_err());
    }

    #[test]
    fn test_crash_defaults_validate() {
        let config = CrashConfig::default();
        assert_eq!(config.tiers.len(), 4);
        assert_eq!(config.history_len, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_crash_rejects_bad_scaling() {
        assert!(CrashConfig::default().with_scaling(0.0).validate().is_err());
        assert!(CrashConfig::default().with_scaling(f64::NAN).validate().is_err());
        assert!(CrashConfig::default().with_tiers(vec![]).validate().is_err());
    }

    #[test]
    fn test_config_serde() {
        let config = StackemConfig::default().with_difficulty(Difficulty::Medium);
        let json = serde_json::to_string(&config).unwrap();
        let back: StackemConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
