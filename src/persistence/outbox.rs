//! Write-behind queue for wallet, preference and stats updates.
//!
//! Engines never wait on the store. Every mutation that should reach the
//! store is queued here and the host calls [`Outbox::flush`] whenever it
//! likes (end of frame, on a timer, on unmount). A failed write stops the
//! flush and stays at the head of the queue, so writes reach the store in
//! the order they were made. It is retried on later flushes until
//! `max_attempts` is reached, then dropped and logged. In-memory state
//! stays authoritative for the rest of the session either way.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::store::WalletStore;
use super::types::{GameKey, PreferencesPatch, WalletPatch};
use crate::core::{GameError, StoreError};

/// One queued store call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingWrite {
    Wallet(WalletPatch),
    Preferences(PreferencesPatch),
    GameStats { game: GameKey, won: bool },
}

impl PendingWrite {
    fn send(&self, store: &mut dyn WalletStore, user_id: &str) -> Result<(), StoreError> {
        match self {
            Self::Wallet(patch) => store.set_wallet(user_id, patch),
            Self::Preferences(patch) => store.set_preferences(user_id, patch),
            Self::GameStats { game, won } => store.increment_game_stats(user_id, *game, *won),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct QueuedWrite {
    write: PendingWrite,
    attempts: u32,
}

/// Outbox settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxConfig {
    /// Attempts per write before it is dropped.
    pub max_attempts: u32,
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl OutboxConfig {
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.max_attempts == 0 {
            return Err(GameError::InvalidConfig("max_attempts must be at least 1".into()));
        }
        Ok(())
    }
}

/// What a flush accomplished.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Writes accepted by the store.
    pub written: usize,
    /// Writes that failed and remain queued.
    pub retried: usize,
    /// Writes left queued behind a failed one without being sent.
    pub held: usize,
    /// Writes that failed for the last time and were discarded.
    pub dropped: Vec<(PendingWrite, StoreError)>,
}

impl FlushReport {
    /// True if nothing failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.retried == 0 && self.dropped.is_empty()
    }
}

/// Bounded-retry write-behind queue.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outbox {
    config: OutboxConfig,
    queue: VecDeque<QueuedWrite>,
}

impl Outbox {
    /// Create an empty outbox.
    #[must_use]
    pub fn new(config: OutboxConfig) -> Self {
        Self {
            config,
            queue: VecDeque::new(),
        }
    }

    /// Number of queued writes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Iterate queued writes oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &PendingWrite> {
        self.queue.iter().map(|q| &q.write)
    }

    /// Queue a write. A wallet patch is folded into an untried wallet patch
    /// at the tail so bursts of chip updates cost one store call.
    pub fn push(&mut self, write: PendingWrite) {
        if let PendingWrite::Wallet(patch) = &write {
            if let Some(QueuedWrite {
                write: PendingWrite::Wallet(tail),
                attempts: 0,
            }) = self.queue.back_mut()
            {
                tail.merge(patch);
                return;
            }
        }
        self.queue.push_back(QueuedWrite { write, attempts: 0 });
    }

    /// Send queued writes oldest first, stopping at the first write that
    /// fails and is still worth retrying.
    pub fn flush(&mut self, store: &mut dyn WalletStore, user_id: &str) -> FlushReport {
        let mut report = FlushReport::default();

        while let Some(queued) = self.queue.front_mut() {
            let err = match queued.write.send(store, user_id) {
                Ok(()) => {
                    report.written += 1;
                    self.queue.pop_front();
                    continue;
                }
                Err(err) => err,
            };

            queued.attempts += 1;
            if queued.attempts < self.config.max_attempts {
                debug!(user_id, attempts = queued.attempts, ?err, "store write failed, will retry");
                report.retried += 1;
                report.held = self.queue.len() - 1;
                break;
            }
            if let Some(queued) = self.queue.pop_front() {
                warn!(user_id, write = ?queued.write, ?err, "dropping store write after retries");
                report.dropped.push((queued.write, err));
            }
        }

        report
    }
}
