use crate::bounds::GridBounds;
use crate::heading::{CellColor, Coord, Heading};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Actor position, heading and visited bounds. Replaced as a whole once per step.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AntState {
    pub position: Coord,
    pub heading: Heading,
    pub bounds: GridBounds,
}

impl AntState {
    fn at(start: Coord) -> Self {
        AntState {
            position: start,
            heading: Heading::North,
            bounds: GridBounds::around(start),
        }
    }
}

/// Langton's ant on an unbounded grid.
///
/// On a `Default` cell the ant turns right, on a `Marked` cell it turns left.
/// It then flips the cell it stood on and moves one unit forward.
/// Only marked cells are kept in storage.
#[derive(Debug, Clone)]
pub struct LangtonsAnt {
    cells: HashMap<Coord, CellColor>,
    state: AntState,
    steps_taken: u64,
}

impl Default for LangtonsAnt {
    fn default() -> Self {
        Self::at(Coord::origin())
    }
}

impl LangtonsAnt {
    /// Creates a fresh simulation with the ant at `(start_x, start_y)` facing North.
    pub fn new(start_x: i64, start_y: i64) -> Self {
        Self::at(Coord::new(start_x, start_y))
    }

    pub fn at(start: Coord) -> Self {
        Self {
            cells: HashMap::new(),
            state: AntState::at(start),
            steps_taken: 0,
        }
    }

    /// Advances the simulation by one move.
    pub fn step(&mut self) {
        let here = self.state.position;
        let color = self.color(here);

        let heading = match color {
            CellColor::Default => self.state.heading.clockwise(),
            CellColor::Marked => self.state.heading.counter_clockwise(),
        };

        match color.flipped() {
            CellColor::Marked => {
                self.cells.insert(here, CellColor::Marked);
            }
            CellColor::Default => {
                self.cells.remove(&here);
            }
        }

        let position = here.moved(heading);
        self.state = AntState {
            position,
            heading,
            bounds: self.state.bounds.include(position),
        };
        self.steps_taken += 1;
    }

    /// Runs exactly `steps` moves.
    pub fn run(&mut self, steps: u64) {
        for _ in 0..steps {
            self.step();
        }
    }

    pub fn ant_position(&self) -> Coord {
        self.state.position
    }

    pub fn ant_direction(&self) -> Heading {
        self.state.heading
    }

    pub fn grid_bounds(&self) -> GridBounds {
        self.state.bounds
    }

    /// Owned copy of every marked cell. Changes to the returned map do not reach the simulation.
    pub fn grid(&self) -> HashMap<Coord, CellColor> {
        self.cells.clone()
    }

    /// Color of any cell, including cells far outside the visited bounds.
    pub fn cell_color_at(&self, x: i64, y: i64) -> CellColor {
        self.color(Coord::new(x, y))
    }

    /// Iterates over marked coordinates without copying storage. Order is unspecified.
    pub fn marked_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.keys().copied()
    }

    pub fn marked_cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    pub fn state(&self) -> AntState {
        self.state
    }

    #[inline(always)]
    fn color(&self, c: Coord) -> CellColor {
        self.cells.get(&c).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ant_faces_north_on_empty_grid() {
        let ant = LangtonsAnt::new(4, -9);
        assert_eq!(ant.ant_position(), Coord::new(4, -9));
        assert_eq!(ant.ant_direction(), Heading::North);
        assert_eq!(ant.grid_bounds(), GridBounds::around(Coord::new(4, -9)));
        assert!(ant.grid().is_empty());
        assert_eq!(ant.steps_taken(), 0);
    }

    #[test]
    fn first_two_steps_follow_the_trace() {
        let mut ant = LangtonsAnt::default();

        ant.step();
        assert_eq!(ant.ant_position(), Coord::new(1, 0));
        assert_eq!(ant.ant_direction(), Heading::East);
        assert_eq!(ant.cell_color_at(0, 0), CellColor::Marked);
        assert_eq!(ant.grid_bounds(), GridBounds { min_x: 0, max_x: 1, min_y: 0, max_y: 0 });

        ant.step();
        assert_eq!(ant.ant_position(), Coord::new(1, 1));
        assert_eq!(ant.ant_direction(), Heading::South);
        assert_eq!(ant.grid_bounds(), GridBounds { min_x: 0, max_x: 1, min_y: 0, max_y: 1 });

        let expected: HashMap<Coord, CellColor> = [
            (Coord::new(0, 0), CellColor::Marked),
            (Coord::new(1, 0), CellColor::Marked),
        ]
        .into_iter()
        .collect();
        assert_eq!(ant.grid(), expected);
    }

    #[test]
    fn marked_cell_turns_left_and_is_cleared() {
        let mut ant = LangtonsAnt::default();
        ant.run(4);
        // Back on the origin, which was marked by the first step.
        assert_eq!(ant.ant_position(), Coord::origin());
        assert_eq!(ant.ant_direction(), Heading::North);
        assert_eq!(ant.cell_color_at(0, 0), CellColor::Marked);

        ant.step();
        assert_eq!(ant.ant_direction(), Heading::West);
        assert_eq!(ant.ant_position(), Coord::new(-1, 0));
        assert_eq!(ant.cell_color_at(0, 0), CellColor::Default);
        assert!(!ant.grid().contains_key(&Coord::origin()));
        assert_eq!(ant.marked_cell_count(), 3);
    }

    #[test]
    fn storage_never_holds_default_cells() {
        let mut ant = LangtonsAnt::default();
        for _ in 0..2_000 {
            ant.step();
            assert!(ant.grid().values().all(|&c| c == CellColor::Marked));
        }
    }

    #[test]
    fn run_zero_is_noop() {
        let mut ant = LangtonsAnt::new(2, 3);
        let before = ant.state();
        ant.run(0);
        assert_eq!(ant.state(), before);
        assert!(ant.grid().is_empty());
        assert_eq!(ant.steps_taken(), 0);
    }

    #[test]
    fn returned_grid_is_a_copy() {
        let mut ant = LangtonsAnt::default();
        ant.run(10);
        let mut copy = ant.grid();
        copy.clear();
        copy.insert(Coord::new(100, 100), CellColor::Marked);
        assert_eq!(ant.marked_cell_count(), 6);
        assert_eq!(ant.cell_color_at(100, 100), CellColor::Default);
    }

    #[test]
    fn far_away_cells_are_default() {
        let mut ant = LangtonsAnt::default();
        ant.run(500);
        assert_eq!(ant.cell_color_at(i64::MAX, i64::MIN), CellColor::Default);
        assert_eq!(ant.cell_color_at(-1_000_000, 1_000_000), CellColor::Default);
    }

    #[test]
    fn marked_cells_iterator_matches_grid() {
        let mut ant = LangtonsAnt::default();
        ant.run(1_000);
        let mut from_iter: Vec<Coord> = ant.marked_cells().collect();
        let mut from_grid: Vec<Coord> = ant.grid().into_keys().collect();
        from_iter.sort();
        from_grid.sort();
        assert_eq!(from_iter, from_grid);
        assert_eq!(from_iter.len(), 118);
    }
}
