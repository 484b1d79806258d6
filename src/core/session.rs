//! Per-screen session context.
//!
//! A `Session` is created when a game screen mounts, moved into exactly
//! one engine, and handed back by the engine's `into_session()` when the
//! screen unmounts. It holds the cached wallet and preferences and queues
//! every change for the store in its [`Outbox`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{GameError, StoreError};
use super::leveling::{apply_level_ups, LevelChange, LevelCurve};
use crate::persistence::{
    FlushReport, GameKey, Outbox, OutboxConfig, PendingWrite, Preferences, PreferencesPatch,
    Wallet, WalletPatch, WalletStore,
};

/// Cached player data plus pending store writes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    user_id: String,
    wallet: Wallet,
    preferences: Preferences,
    outbox: Outbox,
}

impl Session {
    /// Create a session from an already-known wallet.
    #[must_use]
    pub fn new(user_id: impl Into<String>, wallet: Wallet) -> Self {
        Self {
            user_id: user_id.into(),
            wallet,
            preferences: Preferences::default(),
            outbox: Outbox::default(),
        }
    }

    /// Load wallet and preferences from the store.
    pub fn load(
        store: &dyn WalletStore,
        user_id: impl Into<String>,
        outbox: OutboxConfig,
    ) -> Result<Self, StoreError> {
        let user_id = user_id.into();
        let wallet = store.get_wallet(&user_id)?;
        let preferences = store.get_preferences(&user_id)?;
        debug!(user_id = %user_id, chips = wallet.chips, level = wallet.level, "session loaded");

        Ok(Self {
            user_id,
            wallet,
            preferences,
            outbox: Outbox::new(outbox),
        })
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The cached wallet. Authoritative for the rest of the session.
    #[must_use]
    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    #[must_use]
    pub fn chips(&self) -> u64 {
        self.wallet.chips
    }

    #[must_use]
    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    #[must_use]
    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    /// Remove `amount` chips, refusing if the balance is too low.
    pub fn debit(&mut self, amount: u64) -> Result<(), GameError> {
        if amount > self.wallet.chips {
            return Err(GameError::InsufficientFunds {
                needed: amount,
                available: self.wallet.chips,
            });
        }
        self.wallet.chips -= amount;
        self.outbox.push(PendingWrite::Wallet(WalletPatch::chips(self.wallet.chips)));
        Ok(())
    }

    /// Add `amount` chips.
    pub fn credit(&mut self, amount: u64) {
        if amount == 0 {
            return;
        }
        self.wallet.chips = self.wallet.chips.saturating_add(amount);
        self.outbox.push(PendingWrite::Wallet(WalletPatch::chips(self.wallet.chips)));
    }

    /// Add experience without re-evaluating the level.
    pub fn add_experience(&mut self, xp: u64) {
        if xp == 0 {
            return;
        }
        self.wallet.experience = self.wallet.experience.saturating_add(xp);
        self.outbox.push(PendingWrite::Wallet(WalletPatch {
            experience: Some(self.wallet.experience),
            ..WalletPatch::default()
        }));
    }

    /// Re-evaluate the level on `curve`, paying `bonus` chips per level gained.
    pub fn apply_level_ups(&mut self, curve: LevelCurve, bonus: u64) -> LevelChange {
        let change = apply_level_ups(&mut self.wallet, curve, bonus);
        if change.levels_gained() > 0 {
            self.outbox.push(PendingWrite::Wallet(WalletPatch::full(&self.wallet)));
        }
        change
    }

    /// Queue a play counter bump.
    pub fn record_result(&mut self, game: GameKey, won: bool) {
        self.outbox.push(PendingWrite::GameStats { game, won });
    }

    #[must_use]
    pub fn has_seen_tutorial(&self, game: GameKey) -> bool {
        self.preferences.flag(&game.tutorial_flag())
    }

    /// Set the tutorial flag for `game`. Returns true the first time only.
    pub fn mark_tutorial_seen(&mut self, game: GameKey) -> bool {
        if self.has_seen_tutorial(game) {
            return false;
        }
        let patch = PreferencesPatch::flag(game.tutorial_flag(), true);
        self.preferences.apply(&patch);
        self.outbox.push(PendingWrite::Preferences(patch));
        true
    }

    /// Push queued writes to the store.
    pub fn flush(&mut self, store: &mut dyn WalletStore) -> FlushReport {
        self.outbox.flush(store, &self.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn session(chips: u64) -> Session {
        Session::new("u", Wallet {
            chips,
            level: 1,
            experience: 0,
        })
    }

    #[test]
    fn test_debit_refuses_overdraft() {
        let mut s = session(10);
        assert_eq!(
            s.debit(11),
            Err(GameError::InsufficientFunds {
                needed: 11,
                available: 10
            })
        );
        assert_eq!(s.chips(), 10);
        assert!(s.outbox().is_empty());

        s.debit(10).unwrap();
        assert_eq!(s.chips(), 0);
        assert_eq!(s.outbox().len(), 1);
    }

    #[test]
    fn test_tutorial_flag_once() {
        let mut s = session(0);
        assert!(!s.has_seen_tutorial(GameKey::Stackem));
        assert!(s.mark_tutorial_seen(GameKey::Stackem));
        assert!(!s.mark_tutorial_seen(GameKey::Stackem));
        assert!(s.has_seen_tutorial(GameKey::Stackem));
        assert!(!s.has_seen_tutorial(GameKey::SpaceCrash));
    }

    #[test]
    fn test_load_and_flush() {
        let mut store = MemoryStore::new();
        store.insert_user("u", Wallet {
            chips: 500,
            level: 2,
            experience: 1200,
        });

        let mut s = Session::load(&store, "u", OutboxConfig::default()).unwrap();
        assert_eq!(s.chips(), 500);

        s.credit(25);
        s.add_experience(25);
        s.mark_tutorial_seen(GameKey::SpaceCrash);
        s.record_result(GameKey::SpaceCrash, true);

        let report = s.flush(&mut store);
        assert!(report.is_clean());

        let wallet = store.get_wallet("u").unwrap();
        assert_eq!(wallet.chips, 525);
        assert_eq!(wallet.experience, 1225);
        assert!(store.get_preferences("u").unwrap().flag("space_crash_tutorial_seen"));
        assert_eq!(store.game_stats("u", GameKey::SpaceCrash).won, 1);
    }

    #[test]
    fn test_load_unknown_user() {
        let store = MemoryStore::new();
        assert!(Session::load(&store, "ghost", OutboxConfig::default()).is_err());
    }
}
