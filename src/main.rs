use anyhow::Result;
use log::{debug, info, warn};
use std::path::Path;
use std::time::Instant;

mod output;
mod runner;

use ant_common::AntConfig;
use runner::{run_batch, AntRun};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

fn load_config(path: &Path) -> Result<AntConfig> {
    if !path.exists() {
        warn!("Config file '{}' not found. Using built-in defaults.", path.display());
        return Ok(AntConfig::default());
    }
    AntConfig::load(path)
}

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();

    info!("Langton's Ant - Console Engine");

    // --- Load Configuration ---
    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = load_config(Path::new(&config_path))?;
    debug!("Run configuration: {:#?}", config);

    if config.timing.total_steps < 0 {
        warn!(
            "total_steps is negative ({}). Treating it as 0.",
            config.timing.total_steps
        );
    }

    // --- Primary Run ---
    let start = config.start();
    info!("Running {} steps from ({}, {})...", config.total_steps(), start.x, start.y);
    let mut run = AntRun::new(&config);
    run.execute();

    // --- Save Recorded Data ---
    info!("Saving recorded data...");
    output::save_outputs(&config.output, run.ant(), run.get_recorded_snapshots());

    // --- Batch Runs (independent instances, one per rayon task) ---
    let starts = config.batch_starts();
    if !starts.is_empty() {
        info!(
            "Running batch of {} simulations on {} Rayon threads...",
            starts.len(),
            rayon::current_num_threads()
        );
        let batch_start = Instant::now();
        for summary in run_batch(&starts, config.total_steps()) {
            let b = summary.bounds;
            info!(
                "Start ({}, {}) | Black cells: {} | Ant: ({}, {}) | Bounds: x[{}, {}], y[{}, {}]",
                summary.start.x,
                summary.start.y,
                summary.marked_cells,
                summary.ant_position.x,
                summary.ant_position.y,
                b.min_x,
                b.max_x,
                b.min_y,
                b.max_y
            );
        }
        info!("Batch finished in {:.3} seconds.", batch_start.elapsed().as_secs_f64());
    }

    info!("Simulation Complete.");
    Ok(())
}
