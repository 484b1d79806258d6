//! # minigame-hub
//!
//! Game engines for a casino-style hub: the Stack'em grid game and the
//! Space Crash multiplier game, plus the wallet session they share.
//!
//! ## Design Principles
//!
//! 1. **Engines own no I/O**: Engines mutate in-memory state and queue
//!    wallet writes on the session outbox. Hosts decide when to flush.
//!
//! 2. **Refusals are values**: Illegal or unaffordable actions return
//!    `Err(GameError)` and leave state untouched.
//!
//! 3. **Host-driven time**: Anything timed takes an `Instant` from the
//!    caller, so engines are deterministic under test.
//!
//! ## Modules
//!
//! - `core`: RNG, configuration, errors, leveling, wallet session
//! - `cards`: Card model and the 56-card deck builder
//! - `stackem`: Grid, drop layout, line scoring, Stack'em engine
//! - `crash`: Crash point distribution, multiplier curve, Space Crash engine
//! - `persistence`: Wallet store trait, in-memory store, write-behind outbox

pub mod cards;
pub mod core;
pub mod crash;
pub mod persistence;
pub mod stackem;

#[cfg(feature = "python")]
mod python;

// Re-export commonly used types
pub use crate::core::{
    CrashConfig, Difficulty, StackemConfig,
    GameError, StoreError,
    GameRng, GameRngState,
    LevelChange, LevelCurve, Session,
};

pub use crate::cards::{Card, CardId, CardKind, Rank, Suit, DECK_SIZE};

pub use crate::stackem::{
    BoardLayout, Grid, Point, SlotIndex,
    DealOutcome, PlaceOutcome, Placement, Phase, StackemEngine, StackemSnapshot,
};

pub use crate::crash::{CashOut, Crash, CrashEngine, CrashPhase, CrashTier, TickOutcome};

pub use crate::persistence::{
    GameKey, MemoryStore, Outbox, OutboxConfig, Preferences, Wallet, WalletPatch, WalletStore,
};
