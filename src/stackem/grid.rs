//! The 6×6 Stack'em board.
//!
//! Row 0 and column 0 are reserved for running totals; the 25 interior
//! slots hold cards. Slot `(0, c)` shows the total of column `c` and slot
//! `(r, 0)` the total of row `r`. Slot `(0, 0)` is unused.
//!
//! Cards are locked once placed. The only way to change an occupied slot
//! is [`Grid::swap_in`], which hands back the displaced card.

use serde::{Deserialize, Serialize};

use crate::cards::Card;

/// Board side length, including the totals row/column.
pub const GRID_SIZE: usize = 6;

/// Slots on the board, including reserved ones.
pub const SLOT_COUNT: usize = GRID_SIZE * GRID_SIZE;

/// Slots that can hold a card.
pub const PLAYABLE_SLOTS: usize = (GRID_SIZE - 1) * (GRID_SIZE - 1);

/// Index into the 36-slot board, row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotIndex(u8);

impl SlotIndex {
    /// Slot at `row`, `col`. `None` if off the board.
    #[must_use]
    pub fn new(row: usize, col: usize) -> Option<Self> {
        if row < GRID_SIZE && col < GRID_SIZE {
            Some(Self((row * GRID_SIZE + col) as u8))
        } else {
            None
        }
    }

    /// Slot from a raw row-major index. `None` if out of range.
    #[must_use]
    pub fn from_raw(index: usize) -> Option<Self> {
        (index < SLOT_COUNT).then(|| Self(index as u8))
    }

    #[must_use]
    pub const fn raw(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub const fn row(self) -> usize {
        self.raw() / GRID_SIZE
    }

    #[must_use]
    pub const fn col(self) -> usize {
        self.raw() % GRID_SIZE
    }

    /// True for interior slots that can hold cards.
    #[must_use]
    pub const fn is_playable(self) -> bool {
        self.row() > 0 && self.col() > 0
    }

    /// Every slot on the board, row-major.
    pub fn all() -> impl Iterator<Item = SlotIndex> {
        (0..SLOT_COUNT as u8).map(SlotIndex)
    }

    /// All interior slots, row-major.
    pub fn playable() -> impl Iterator<Item = SlotIndex> {
        Self::all().filter(|s| s.is_playable())
    }

    /// The row and column through this slot.
    #[must_use]
    pub fn lines(self) -> [Line; 2] {
        [Line::Row(self.row()), Line::Col(self.col())]
    }
}

impl std::fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row(), self.col())
    }
}

/// A scoring line: one interior row or column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Line {
    Row(usize),
    Col(usize),
}

impl Line {
    /// The interior slots on this line.
    pub fn slots(self) -> impl Iterator<Item = SlotIndex> {
        (1..GRID_SIZE).filter_map(move |i| match self {
            Line::Row(r) => SlotIndex::new(r, i),
            Line::Col(c) => SlotIndex::new(i, c),
        })
    }
}

/// Board contents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    slots: Vec<Option<Card>>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    /// An empty board.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: vec![None; SLOT_COUNT],
        }
    }

    /// Card in `slot`, if any.
    #[must_use]
    pub fn get(&self, slot: SlotIndex) -> Option<&Card> {
        self.slots[slot.raw()].as_ref()
    }

    /// True if `slot` is playable and empty.
    #[must_use]
    pub fn is_open(&self, slot: SlotIndex) -> bool {
        slot.is_playable() && self.slots[slot.raw()].is_none()
    }

    /// Lock `card` into an open slot. Returns false (and does nothing) if
    /// the slot is reserved or occupied.
    pub fn place(&mut self, slot: SlotIndex, card: Card) -> bool {
        if !self.is_open(slot) {
            return false;
        }
        self.slots[slot.raw()] = Some(card);
        true
    }

    /// Replace the occupant of `slot` with `card`, returning the occupant.
    /// Returns `None` (and does nothing) if the slot is reserved or empty.
    pub fn swap_in(&mut self, slot: SlotIndex, card: Card) -> Option<Card> {
        if !slot.is_playable() {
            return None;
        }
        let cell = &mut self.slots[slot.raw()];
        if cell.is_none() {
            return None;
        }
        cell.replace(card)
    }

    /// Sum of card values on a line.
    #[must_use]
    pub fn line_total(&self, line: Line) -> u32 {
        line.slots()
            .filter_map(|s| self.get(s))
            .map(|c| u32::from(c.value))
            .sum()
    }

    #[must_use]
    pub fn row_total(&self, row: usize) -> u32 {
        self.line_total(Line::Row(row))
    }

    #[must_use]
    pub fn col_total(&self, col: usize) -> u32 {
        self.line_total(Line::Col(col))
    }

    /// Number of scoring cards on a line. A swap card left on the board
    /// holds its slot but has no value and does not count.
    #[must_use]
    pub fn line_filled(&self, line: Line) -> usize {
        line.slots()
            .filter(|&s| self.get(s).is_some_and(|c| !c.is_swap_card()))
            .count()
    }

    /// Total displayed in a reserved slot: column totals along row 0, row
    /// totals down column 0. `None` for playable slots and the corner.
    #[must_use]
    pub fn total_at(&self, slot: SlotIndex) -> Option<u32> {
        match (slot.row(), slot.col()) {
            (0, 0) => None,
            (0, c) => Some(self.col_total(c)),
            (r, 0) => Some(self.row_total(r)),
            _ => None,
        }
    }

    /// Open slots, row-major.
    pub fn open_slots(&self) -> impl Iterator<Item = SlotIndex> + '_ {
        SlotIndex::playable().filter(move |&s| self.is_open(s))
    }

    /// Placed cards with their slots.
    pub fn placed(&self) -> impl Iterator<Item = (SlotIndex, &Card)> {
        SlotIndex::playable().filter_map(move |s| self.get(s).map(|c| (s, c)))
    }

    /// Number of placed cards.
    #[must_use]
    pub fn placed_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// True when every playable slot holds a card.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.placed_count() == PLAYABLE_SLOTS
    }
}
