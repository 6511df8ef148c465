use serde::{Deserialize, Serialize};

/// A cell coordinate on the infinite grid. `y` grows downward (screen-style).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Coord {
    pub x: i64,
    pub y: i64,
}

impl Coord {
    /// Creates a new Coord.
    pub fn new(x: i64, y: i64) -> Self {
        Coord { x, y }
    }

    /// The origin `(0, 0)`.
    pub fn origin() -> Self {
        Coord { x: 0, y: 0 }
    }

    /// Returns the neighbouring coordinate one unit towards `heading`.
    /// At the `i64` limits the blocked axis stays put.
    pub fn moved(self, heading: Heading) -> Self {
        let (dx, dy) = heading.delta();
        self.offset(dx, dy)
    }

    /// Returns this coordinate shifted by `(dx, dy)`, saturating at the `i64` limits.
    pub fn offset(self, dx: i64, dy: i64) -> Self {
        Coord {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl From<(i64, i64)> for Coord {
    fn from((x, y): (i64, i64)) -> Self {
        Coord { x, y }
    }
}

impl From<Coord> for (i64, i64) {
    fn from(c: Coord) -> Self {
        (c.x, c.y)
    }
}

/// The actor's facing, in the fixed cycle North -> East -> South -> West -> North.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Heading {
    #[default]
    North,
    East,
    South,
    West,
}

impl Heading {
    /// All headings in clockwise cycle order, starting at North.
    pub const ALL: [Heading; 4] = [Heading::North, Heading::East, Heading::South, Heading::West];

    /// One step clockwise (a right turn).
    pub fn clockwise(self) -> Self {
        match self {
            Heading::North => Heading::East,
            Heading::East => Heading::South,
            Heading::South => Heading::West,
            Heading::West => Heading::North,
        }
    }

    /// One step counter-clockwise (a left turn).
    pub fn counter_clockwise(self) -> Self {
        match self {
            Heading::North => Heading::West,
            Heading::West => Heading::South,
            Heading::South => Heading::East,
            Heading::East => Heading::North,
        }
    }

    /// Unit movement for this heading. North decrements y.
    pub fn delta(self) -> (i64, i64) {
        match self {
            Heading::North => (0, -1),
            Heading::East => (1, 0),
            Heading::South => (0, 1),
            Heading::West => (-1, 0),
        }
    }
}

/// Binary cell color. Only `Marked` cells are ever stored.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellColor {
    #[default]
    Default,
    Marked,
}

impl CellColor {
    pub fn flipped(self) -> Self {
        match self {
            CellColor::Default => CellColor::Marked,
            CellColor::Marked => CellColor::Default,
        }
    }
}
