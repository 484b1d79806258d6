//! Persistence adapter: the contract with the external wallet store.
//!
//! ## Key Types
//!
//! - `Wallet`, `WalletPatch`: chip balance and progression, full and partial
//! - `Preferences`: one-time tutorial flags
//! - `WalletStore`: the store contract, implemented by the host
//! - `MemoryStore`: in-process store for tests and offline play
//! - `Outbox`: write-behind queue with bounded retry
//!
//! Writes are best-effort. Nothing in either engine depends on a write
//! having reached the store.

pub mod outbox;
pub mod store;
pub mod types;

pub use outbox::{FlushReport, Outbox, OutboxConfig, PendingWrite};
pub use store::{MemoryStore, WalletStore};
pub use types::{GameKey, GameStats, Preferences, PreferencesPatch, Wallet, WalletPatch};
