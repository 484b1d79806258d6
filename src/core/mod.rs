//! Shared engine plumbing: RNG, configuration, errors, leveling, session.
//!
//! Nothing here is specific to one minigame. Both engines draw randomness
//! from `GameRng`, report refusals as `GameError`, and mutate the player's
//! wallet only through a `Session`.

pub mod config;
pub mod error;
pub mod leveling;
pub mod rng;
pub mod session;

pub use config::{CrashConfig, Difficulty, StackemConfig};
pub use error::{GameError, StoreError};
pub use leveling::{apply_level_ups, LevelChange, LevelCurve, LEVEL_UP_BONUS_CHIPS};
pub use rng::{GameRng, GameRngState};
pub use session::Session;
