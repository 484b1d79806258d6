//! Records exchanged with the external wallet store.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Which minigame a stats bump or tutorial flag belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameKey {
    Stackem,
    SpaceCrash,
}

impl GameKey {
    /// Key used by the store for this game.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stackem => "stackem",
            Self::SpaceCrash => "space_crash",
        }
    }

    /// Preferences flag recording that the tutorial was shown.
    #[must_use]
    pub fn tutorial_flag(self) -> String {
        format!("{}_tutorial_seen", self.as_str())
    }
}

impl std::fmt::Display for GameKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A player's chip balance and progression, owned by the remote store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub chips: u64,
    pub level: u32,
    pub experience: u64,
}

impl Default for Wallet {
    fn default() -> Self {
        Self {
            chips: 0,
            level: 1,
            experience: 0,
        }
    }
}

impl Wallet {
    /// Overwrite the fields present in `patch`.
    pub fn apply(&mut self, patch: &WalletPatch) {
        if let Some(chips) = patch.chips {
            self.chips = chips;
        }
        if let Some(level) = patch.level {
            self.level = level;
        }
        if let Some(experience) = patch.experience {
            self.experience = experience;
        }
    }
}

/// Partial wallet update. Absent fields are left untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletPatch {
    pub chips: Option<u64>,
    pub level: Option<u32>,
    pub experience: Option<u64>,
}

impl WalletPatch {
    /// Patch writing every field of `wallet`.
    #[must_use]
    pub fn full(wallet: &Wallet) -> Self {
        Self {
            chips: Some(wallet.chips),
            level: Some(wallet.level),
            experience: Some(wallet.experience),
        }
    }

    /// Patch writing only the chip balance.
    #[must_use]
    pub fn chips(chips: u64) -> Self {
        Self {
            chips: Some(chips),
            ..Self::default()
        }
    }

    /// Fold a later patch into this one; later fields win.
    pub fn merge(&mut self, later: &WalletPatch) {
        self.chips = later.chips.or(self.chips);
        self.level = later.level.or(self.level);
        self.experience = later.experience.or(self.experience);
    }

    /// True if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chips.is_none() && self.level.is_none() && self.experience.is_none()
    }
}

/// Player preferences. Only the one-time flags under `game_stats` are used.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub game_stats: FxHashMap<String, bool>,
}

impl Preferences {
    /// Value of a flag, `false` when absent.
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        self.game_stats.get(name).copied().unwrap_or(false)
    }

    /// Merge a patch into these preferences.
    pub fn apply(&mut self, patch: &PreferencesPatch) {
        for (name, value) in &patch.game_stats {
            self.game_stats.insert(name.clone(), *value);
        }
    }
}

/// Flags to set on a player's preferences.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencesPatch {
    pub game_stats: FxHashMap<String, bool>,
}

impl PreferencesPatch {
    /// Patch setting a single flag.
    #[must_use]
    pub fn flag(name: impl Into<String>, value: bool) -> Self {
        let mut game_stats = FxHashMap::default();
        game_stats.insert(name.into(), value);
        Self { game_stats }
    }
}

/// Per-game play counters kept by the store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    pub played: u64,
    pub won: u64,
}
