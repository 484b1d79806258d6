//! Experience curves and level-up bonuses.
//!
//! Both games convert play into experience and pay a flat chip bonus for
//! every level gained, but they use different curves:
//!
//! - Stack'em: level *n* needs *n*×1000 XP on top of every earlier level's
//!   requirement ([`LevelCurve::Triangular`]).
//! - Space Crash: every level costs the same flat amount
//!   ([`LevelCurve::Linear`]).

use serde::{Deserialize, Serialize};

use crate::persistence::Wallet;

/// Chip bonus paid per level gained in either game.
pub const LEVEL_UP_BONUS_CHIPS: u64 = 500;

/// Mapping from cumulative experience to level. Levels start at 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelCurve {
    /// Leaving level *n* costs `n * step` XP.
    Triangular { step: u64 },
    /// Leaving any level costs `step` XP.
    Linear { step: u64 },
}

impl LevelCurve {
    /// Stack'em curve.
    pub const STACKEM: Self = Self::Triangular { step: 1000 };

    /// Space Crash curve.
    pub const CRASH: Self = Self::Linear { step: 1000 };

    /// Cumulative XP needed to reach `level`.
    #[must_use]
    pub fn xp_for_level(self, level: u32) -> u64 {
        let below = u64::from(level.saturating_sub(1));
        match self {
            Self::Triangular { step } => step.saturating_mul(below * (below + 1) / 2),
            Self::Linear { step } => step.saturating_mul(below),
        }
    }

    /// Level reached with `xp` cumulative experience.
    #[must_use]
    pub fn level_for_xp(self, xp: u64) -> u32 {
        match self {
            Self::Linear { step } if step > 0 => {
                u32::try_from(xp / step).unwrap_or(u32::MAX - 1) + 1
            }
            Self::Linear { .. } | Self::Triangular { step: 0 } => 1,
            Self::Triangular { .. } => {
                let mut level = 1;
                while level < u32::MAX && self.xp_for_level(level + 1) <= xp {
                    level += 1;
                }
                level
            }
        }
    }
}

/// Result of re-evaluating a wallet's level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelChange {
    pub from: u32,
    pub to: u32,
    pub bonus_chips: u64,
}

impl LevelChange {
    /// Number of levels gained.
    #[must_use]
    pub fn levels_gained(&self) -> u32 {
        self.to.saturating_sub(self.from)
    }
}

/// Recompute `wallet.level` from its experience and pay `bonus` chips per
/// level gained. A level is never lowered.
pub fn apply_level_ups(wallet: &mut Wallet, curve: LevelCurve, bonus: u64) -> LevelChange {
    let from = wallet.level;
    let to = curve.level_for_xp(wallet.experience).max(from);
    let bonus_chips = bonus.saturating_mul(u64::from(to - from));

    wallet.level = to;
    wallet.chips = wallet.chips.saturating_add(bonus_chips);

    LevelChange {
        from,
        to,
        bonus_chips,
    }
}
