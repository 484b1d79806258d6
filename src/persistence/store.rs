//! The wallet store contract and an in-process implementation.

use rustc_hash::FxHashMap;

use super::types::{GameKey, GameStats, Preferences, PreferencesPatch, Wallet, WalletPatch};
use crate::core::StoreError;

/// Backing data store for wallets, preferences and play counters.
///
/// Implemented by the hosting application (usually over a remote API).
/// Engines never call this directly: they queue writes in the session
/// [`Outbox`](super::Outbox), which the host flushes when convenient.
pub trait WalletStore {
    /// Fetch a player's wallet.
    fn get_wallet(&self, user_id: &str) -> Result<Wallet, StoreError>;

    /// Apply a partial wallet update.
    fn set_wallet(&mut self, user_id: &str, patch: &WalletPatch) -> Result<(), StoreError>;

    /// Fetch a player's preferences.
    fn get_preferences(&self, user_id: &str) -> Result<Preferences, StoreError>;

    /// Merge flags into a player's preferences.
    fn set_preferences(&mut self, user_id: &str, patch: &PreferencesPatch) -> Result<(), StoreError>;

    /// Best-effort play counter bump.
    fn increment_game_stats(&mut self, user_id: &str, game: GameKey, won: bool) -> Result<(), StoreError>;
}

#[derive(Clone, Debug, Default)]
struct UserRecord {
    wallet: Wallet,
    preferences: Preferences,
    stats: FxHashMap<GameKey, GameStats>,
}

/// In-memory [`WalletStore`] for tests, simulations and offline play.
///
/// Writes can be made to fail on demand to exercise the retry path.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    users: FxHashMap<String, UserRecord>,
    failing_writes: u32,
    write_count: u64,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user with an initial wallet.
    pub fn insert_user(&mut self, user_id: impl Into<String>, wallet: Wallet) {
        self.users.insert(
            user_id.into(),
            UserRecord {
                wallet,
                ..UserRecord::default()
            },
        );
    }

    /// Make the next `count` writes fail with `StoreError::Unavailable`.
    pub fn fail_next_writes(&mut self, count: u32) {
        self.failing_writes = count;
    }

    /// Number of writes that succeeded.
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.write_count
    }

    /// Play counters for a user and game.
    #[must_use]
    pub fn game_stats(&self, user_id: &str, game: GameKey) -> GameStats {
        self.users
            .get(user_id)
            .and_then(|u| u.stats.get(&game).copied())
            .unwrap_or_default()
    }

    fn user(&self, user_id: &str) -> Result<&UserRecord, StoreError> {
        self.users
            .get(user_id)
            .ok_or_else(|| StoreError::UnknownUser(user_id.to_string()))
    }

    fn user_for_write(&mut self, user_id: &str) -> Result<&mut UserRecord, StoreError> {
        if self.failing_writes > 0 {
            self.failing_writes -= 1;
            return Err(StoreError::Unavailable("injected failure".into()));
        }
        let user = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| StoreError::UnknownUser(user_id.to_string()))?;
        self.write_count += 1;
        Ok(user)
    }
}

impl WalletStore for MemoryStore {
    fn get_wallet(&self, user_id: &str) -> Result<Wallet, StoreError> {
        Ok(self.user(user_id)?.wallet)
    }

    fn set_wallet(&mut self, user_id: &str, patch: &WalletPatch) -> Result<(), StoreError> {
        self.user_for_write(user_id)?.wallet.apply(patch);
        Ok(())
    }

    fn get_preferences(&self, user_id: &str) -> Result<Preferences, StoreError> {
        Ok(self.user(user_id)?.preferences.clone())
    }

    fn set_preferences(&mut self, user_id: &str, patch: &PreferencesPatch) -> Result<(), StoreError> {
        self.user_for_write(user_id)?.preferences.apply(patch);
        Ok(())
    }

    fn increment_game_stats(&mut self, user_id: &str, game: GameKey, won: bool) -> Result<(), StoreError> {
        let stats = self.user_for_write(user_id)?.stats.entry(game).or_default();
        stats.played += 1;
        if won {
            stats.won += 1;
        }
        Ok(())
    }
}
