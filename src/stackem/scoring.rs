//! Line scoring.
//!
//! After a card is locked into a slot, the row and the column through that
//! slot are checked. A line totalling exactly 21 with `k` cards pays
//! `ante × k × m(k)`:
//!
//! | k | m(k) | payout      |
//! |---|------|-------------|
//! | 2 | 1.5  | 3 × ante    |
//! | 3 | 2    | 6 × ante    |
//! | 4 | 2.5  | 10 × ante   |
//! | 5 | 3    | 15 × ante   |
//!
//! A line over 21 is a bust and wipes all session winnings. When one line
//! busts and the other hits 21 on the same placement, the bust wins.

use serde::{Deserialize, Serialize};

use super::grid::{Grid, Line, SlotIndex};

/// The target line total.
pub const TARGET: u32 = 21;

/// Line multiplier in halves, indexed by filled cells.
fn multiplier_halves(filled: usize) -> Option<u64> {
    match filled {
        2 => Some(3),
        3 => Some(4),
        4 => Some(5),
        5 => Some(6),
        _ => None,
    }
}

/// Payout for a 21 on a line with `filled` cards, `None` if that many
/// cards do not pay.
#[must_use]
pub fn line_award(ante: u64, filled: usize) -> Option<u64> {
    let halves = multiplier_halves(filled)?;
    Some(ante.saturating_mul(filled as u64).saturating_mul(halves) / 2)
}

/// State of one line after a placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineOutcome {
    /// Below 21, or 21 with a card count that does not pay.
    Open { total: u32, filled: usize },
    /// Exactly 21 with a paying card count.
    TwentyOne { filled: usize, award: u64 },
    /// Over 21.
    Bust { total: u32 },
}

/// Outcome of both lines through a placed card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementScore {
    pub row: LineOutcome,
    pub col: LineOutcome,
}

impl PlacementScore {
    /// True if either line went over 21.
    #[must_use]
    pub fn is_bust(&self) -> bool {
        matches!(self.row, LineOutcome::Bust { .. }) || matches!(self.col, LineOutcome::Bust { .. })
    }

    /// Chips won by this placement. Zero on a bust.
    #[must_use]
    pub fn award(&self) -> u64 {
        if self.is_bust() {
            return 0;
        }
        [self.row, self.col]
            .iter()
            .map(|o| match o {
                LineOutcome::TwentyOne { award, .. } => *award,
                _ => 0,
            })
            .sum()
    }

    /// True if any line hit 21 and nothing busted.
    #[must_use]
    pub fn is_win(&self) -> bool {
        self.award() > 0
    }
}

/// Score one line.
#[must_use]
pub fn score_line(grid: &Grid, line: Line, ante: u64) -> LineOutcome {
    let total = grid.line_total(line);
    let filled = grid.line_filled(line);

    if total > TARGET {
        return LineOutcome::Bust { total };
    }
    match (total == TARGET).then(|| line_award(ante, filled)).flatten() {
        Some(award) => LineOutcome::TwentyOne { filled, award },
        None => LineOutcome::Open { total, filled },
    }
}

/// Score the row and column through a freshly placed card.
#[must_use]
pub fn score_placement(grid: &Grid, slot: SlotIndex, ante: u64) -> PlacementScore {
    let [row, col] = slot.lines();
    PlacementScore {
        row: score_line(grid, row, ante),
        col: score_line(grid, col, ante),
    }
}
