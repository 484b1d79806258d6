//! Board geometry and drop-point resolution.

use serde::{Deserialize, Serialize};

use super::grid::{SlotIndex, GRID_SIZE};
use crate::core::GameError;

/// A point in board pixel space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Where slots sit on screen: a square grid of `cell_size` cells separated
/// by `gap`, with slot (0, 0) at `origin`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardLayout {
    pub origin: Point,
    pub cell_size: f32,
    pub gap: f32,
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self {
            origin: Point::new(0.0, 0.0),
            cell_size: 64.0,
            gap: 8.0,
        }
    }
}

impl BoardLayout {
    pub fn validate(&self) -> Result<(), GameError> {
        if !(self.cell_size > 0.0) {
            return Err(GameError::InvalidConfig("cell_size must be positive".into()));
        }
        if !(self.gap >= 0.0) {
            return Err(GameError::InvalidConfig("gap must not be negative".into()));
        }
        Ok(())
    }

    /// Center of a slot.
    #[must_use]
    pub fn slot_center(&self, slot: SlotIndex) -> Point {
        let pitch = self.cell_size + self.gap;
        let half = self.cell_size / 2.0;
        Point::new(
            self.origin.x + slot.col() as f32 * pitch + half,
            self.origin.y + slot.row() as f32 * pitch + half,
        )
    }

    /// Slot whose center is nearest `point`, if within `threshold`. A drop
    /// nearest a reserved totals slot resolves to `None` rather than to a
    /// playable neighbour.
    #[must_use]
    pub fn nearest_slot(&self, point: Point, threshold: f32) -> Option<SlotIndex> {
        SlotIndex::all()
            .map(|slot| (slot, self.slot_center(slot).distance(point)))
            .filter(|&(_, d)| d <= threshold)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(slot, _)| slot)
            .filter(|slot| slot.is_playable())
    }

    /// Full board width and height.
    #[must_use]
    pub fn extent(&self) -> f32 {
        GRID_SIZE as f32 * self.cell_size + (GRID_SIZE - 1) as f32 * self.gap
    }
}
