pub mod ant;
pub mod bounds;
pub mod config;
pub mod heading;
pub mod snapshot;

// Re-export key types for easier use by dependent crates
pub use ant::{AntState, LangtonsAnt};
pub use bounds::GridBounds;
pub use config::{AntConfig, BatchConfig, InitialConditions, OutputConfig, TimingConfig};
pub use heading::{CellColor, Coord, Heading};
pub use snapshot::{sorted_cells, Snapshot};
