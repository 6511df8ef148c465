use serde::{Serialize, Deserialize};
use crate::ant::LangtonsAnt;
use crate::bounds::GridBounds;
use crate::heading::Heading;

/// A snapshot of the simulation state at a specific step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Number of steps executed when the snapshot was taken.
    pub step: u64,
    pub ant_x: i64,
    pub ant_y: i64,
    pub heading: Heading,
    /// Bounding box of every visited position so far.
    pub bounds: GridBounds,
    pub marked_cell_count: u64,
    /// Optional: every marked cell, sorted by (x, y).
    /// Included only if `config.output.save_cells_in_snapshot` is true.
    #[serde(default)]
    pub marked_cells: Option<Vec<(i64, i64)>>,
}

impl Snapshot {
    pub fn capture(ant: &LangtonsAnt, include_cells: bool) -> Self {
        let pos = ant.ant_position();
        let marked_cells = include_cells.then(|| sorted_cells(ant));
        Snapshot {
            step: ant.steps_taken(),
            ant_x: pos.x,
            ant_y: pos.y,
            heading: ant.ant_direction(),
            bounds: ant.grid_bounds(),
            marked_cell_count: ant.marked_cell_count() as u64,
            marked_cells,
        }
    }
}

/// Marked cells of `ant` in ascending (x, y) order.
pub fn sorted_cells(ant: &LangtonsAnt) -> Vec<(i64, i64)> {
    let mut cells: Vec<(i64, i64)> = ant.marked_cells().map(Into::into).collect();
    cells.sort_unstable();
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_reflects_ant_state() {
        let mut ant = LangtonsAnt::default();
        ant.run(5);
        let snap = Snapshot::capture(&ant, true);
        assert_eq!(snap.step, 5);
        assert_eq!((snap.ant_x, snap.ant_y), (-1, 0));
        assert_eq!(snap.heading, Heading::West);
        assert_eq!(snap.marked_cell_count, 3);
        assert_eq!(snap.marked_cells, Some(vec![(0, 1), (1, 0), (1, 1)]));
        assert_eq!(snap.bounds, GridBounds { min_x: -1, max_x: 1, min_y: 0, max_y: 1 });
    }

    #[test]
    fn cells_are_omitted_unless_requested() {
        let mut ant = LangtonsAnt::default();
        ant.run(100);
        let snap = Snapshot::capture(&ant, false);
        assert_eq!(snap.marked_cells, None);
        assert_eq!(snap.marked_cell_count, 20);
    }
}
