use crate::heading::Coord;
use serde::{Deserialize, Serialize};

/// Smallest axis-aligned rectangle (inclusive) enclosing every position the actor has occupied.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    pub min_x: i64,
    pub max_x: i64,
    pub min_y: i64,
    pub max_y: i64,
}

impl GridBounds {
    /// A zero-area box collapsed onto `c`.
    pub fn around(c: Coord) -> Self {
        GridBounds { min_x: c.x, max_x: c.x, min_y: c.y, max_y: c.y }
    }

    /// Returns the box grown to include `c`. Never shrinks.
    pub fn include(self, c: Coord) -> Self {
        GridBounds {
            min_x: self.min_x.min(c.x),
            max_x: self.max_x.max(c.x),
            min_y: self.min_y.min(c.y),
            max_y: self.max_y.max(c.y),
        }
    }

    /// Number of cell columns covered.
    pub fn width(&self) -> u64 {
        self.max_x.abs_diff(self.min_x).saturating_add(1)
    }

    /// Number of cell rows covered.
    pub fn height(&self) -> u64 {
        self.max_y.abs_diff(self.min_y).saturating_add(1)
    }

    pub fn contains(&self, c: Coord) -> bool {
        c.x >= self.min_x && c.x <= self.max_x && c.y >= self.min_y && c.y <= self.max_y
    }

    /// True if `other` lies entirely inside this box.
    pub fn encloses(&self, other: &GridBounds) -> bool {
        self.min_x <= other.min_x
            && self.max_x >= other.max_x
            && self.min_y <= other.min_y
            && self.max_y >= other.max_y
    }
}
