//! Space Crash: bet, watch the multiplier climb, cash out before it crashes.
//!
//! ## Key Types
//!
//! - `CrashTier`: Weighted band of the crash point distribution
//! - `CrashEngine`: Round state machine driven by host ticks
//! - `TickOutcome`: Running multiplier or the round's resolution

pub mod engine;
pub mod point;

pub use engine::{CashOut, Crash, CrashEngine, CrashPhase, LiveBet, Round, TickOutcome};
pub use point::{generate_crash_point, multiplier_at, CrashTier, CURVE_EXPONENT};
