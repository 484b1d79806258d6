//! Stack'em: a blackjack-flavored placement game on a 6×6 grid.
//!
//! ## Key Types
//!
//! - `Grid`: Board contents, with row 0 and column 0 reserved for totals
//! - `BoardLayout`: Slot geometry used to resolve drop points
//! - `PlacementScore`: Row and column outcome after a card is locked in
//! - `StackemEngine`: Deck, hand, ante and winnings state machine
//!
//! Each placement costs the ante. Lines that reach exactly 21 pay into
//! session winnings; a line over 21 wipes them. Winnings reach the wallet
//! only when collected.

pub mod engine;
pub mod grid;
pub mod layout;
pub mod scoring;

pub use engine::{
    DealOutcome, EndGameSummary, Hand, Phase, PlaceOutcome, Placement, StackemEngine,
    StackemSnapshot, WildOptions, ACE_VALUES,
};
pub use grid::{Grid, Line, SlotIndex, GRID_SIZE, PLAYABLE_SLOTS, SLOT_COUNT};
pub use layout::{BoardLayout, Point};
pub use scoring::{line_award, score_line, score_placement, LineOutcome, PlacementScore, TARGET};
