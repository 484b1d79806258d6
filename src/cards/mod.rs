//! Card system: card model and deck builder.
//!
//! ## Key Types
//!
//! - `CardId`: Session-unique card identifier
//! - `Card`: Suit, rank, board value, dealt flag and kind
//! - `CardKind`: Standard, Swap or Wild
//!
//! `build_deck` produces the 56-card Stack'em deck.

pub mod card;
pub mod deck;

pub use card::{Card, CardId, CardKind, Rank, Suit};
pub use deck::{build_deck, build_deck_excluding, DECK_SIZE, STANDARD_CARDS, SWAP_CARDS, WILD_CARDS};
