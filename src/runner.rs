use ant_common::{AntConfig, Coord, GridBounds, LangtonsAnt, Snapshot};
use log::{info, trace};
use rayon::prelude::*;
use std::time::{Duration, Instant};

/// Final figures printed by the console reporter.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub start: Coord,
    pub steps: u64,
    pub bounds: GridBounds,
    pub marked_cells: usize,
    pub ant_position: Coord,
}

impl RunSummary {
    pub fn of(start: Coord, ant: &LangtonsAnt) -> Self {
        RunSummary {
            start,
            steps: ant.steps_taken(),
            bounds: ant.grid_bounds(),
            marked_cells: ant.marked_cell_count(),
            ant_position: ant.ant_position(),
        }
    }

    pub fn log(&self, elapsed: Duration) {
        let b = &self.bounds;
        info!("Completed {} steps in {}ms", self.steps, elapsed.as_millis());
        info!("Grid bounds: x[{}, {}], y[{}, {}]", b.min_x, b.max_x, b.min_y, b.max_y);
        info!("Grid size: {} x {}", b.width(), b.height());
        info!("Black cells: {}", self.marked_cells);
        info!("Ant position: ({}, {})", self.ant_position.x, self.ant_position.y);
    }
}

/// Drives one simulation for the engine: progress logging and snapshot recording.
pub struct AntRun {
    ant: LangtonsAnt,
    start: Coord,
    total_steps: u64,
    record_interval_steps: u64,
    progress_interval: Duration,
    include_cells: bool,
    recorded_snapshots: Vec<Snapshot>,
}

impl AntRun {
    pub fn new(config: &AntConfig) -> Self {
        let start = config.start();
        Self {
            ant: LangtonsAnt::at(start),
            start,
            total_steps: config.total_steps(),
            record_interval_steps: config.timing.record_interval_steps,
            progress_interval: Duration::try_from_secs_f64(config.timing.progress_interval_secs)
                .unwrap_or(Duration::from_secs(5)),
            include_cells: config.output.save_cells_in_snapshot,
            recorded_snapshots: Vec::new(),
        }
    }

    /// Executes every configured step, recording a snapshot at step 0,
    /// every `record_interval_steps`, and after the final step.
    pub fn execute(&mut self) -> RunSummary {
        let start_time = Instant::now();
        let mut previous_print_time = start_time;

        info!("Recording initial snapshot (step 0)...");
        self.record_snapshot();

        for step in 0..self.total_steps {
            let step_start_time = Instant::now();
            self.ant.step();
            let done = step + 1;

            let is_record_step = self.record_interval_steps > 0 && done % self.record_interval_steps == 0;
            let is_last_step = done == self.total_steps;
            if is_record_step || is_last_step {
                self.record_snapshot();
            }

            let now = Instant::now();
            if now.duration_since(previous_print_time) >= self.progress_interval && !is_last_step {
                info!(
                    "Step [{}/{}] | Black cells: {} | Elapsed: {:.2} s",
                    done,
                    self.total_steps,
                    self.ant.marked_cell_count(),
                    start_time.elapsed().as_secs_f64()
                );
                previous_print_time = now;
            } else {
                trace!(
                    "Step [{}/{}] completed in {:.3} us",
                    done,
                    self.total_steps,
                    step_start_time.elapsed().as_secs_f64() * 1e6
                );
            }
        }

        let summary = RunSummary::of(self.start, &self.ant);
        summary.log(start_time.elapsed());
        summary
    }

    fn record_snapshot(&mut self) {
        let snapshot = Snapshot::capture(&self.ant, self.include_cells);
        if let Some(previous) = self.recorded_snapshots.last() {
            // The final step can coincide with an interval step.
            if previous.step == snapshot.step {
                return;
            }
            debug_assert!(
                snapshot.bounds.encloses(&previous.bounds),
                "bounds shrank between steps {} and {}",
                previous.step,
                snapshot.step
            );
        }
        self.recorded_snapshots.push(snapshot);
    }

    pub fn ant(&self) -> &LangtonsAnt {
        &self.ant
    }

    pub fn get_recorded_snapshots(&self) -> &Vec<Snapshot> {
        &self.recorded_snapshots
    }
}

/// Runs one independent simulation per start coordinate on the rayon pool.
/// Results come back in the order of `starts`.
pub fn run_batch(starts: &[Coord], steps: u64) -> Vec<RunSummary> {
    starts
        .par_iter()
        .map(|&start| {
            let mut ant = LangtonsAnt::at(start);
            ant.run(steps);
            RunSummary::of(start, &ant)
        })
        .collect()
}
