use serde::{Deserialize, Serialize};
use anyhow::Result;
use crate::heading::Coord;
use std::path::Path;

// Where the ant starts, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct InitialConditions {
    #[serde(default)]
    pub start_x: i64,
    #[serde(default)]
    pub start_y: i64,
}

impl Default for InitialConditions {
    fn default() -> Self {
        InitialConditions { start_x: 0, start_y: 0 }
    }
}

// Configuration for run length and reporting cadence
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TimingConfig {
    /// Signed so a negative value in the file can be reported instead of failing to parse.
    #[serde(default = "default_total_steps")]
    pub total_steps: i64,
    #[serde(default = "default_record_interval_steps")]
    pub record_interval_steps: u64, // 0 = only the first and last snapshot
    #[serde(default = "default_progress_interval_secs")]
    pub progress_interval_secs: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            total_steps: default_total_steps(),
            record_interval_steps: default_record_interval_steps(),
            progress_interval_secs: default_progress_interval_secs(),
        }
    }
}

fn default_total_steps() -> i64 {
    11_000
}

fn default_record_interval_steps() -> u64 {
    1000
}

fn default_progress_interval_secs() -> f64 {
    5.0
}

// Configuration for output settings, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub base_filename: String,
    #[serde(default = "default_true")]
    pub save_stats: bool,
    #[serde(default = "default_true")]
    pub save_grid: bool, // CSV of marked cells at the end of the run
    #[serde(default)]
    pub save_cells_in_snapshot: bool,
    pub format: Option<String>, // Output format: "json", "bincode", "messagepack"
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            base_filename: String::from("langtons_ant"),
            save_stats: true,
            save_grid: true,
            save_cells_in_snapshot: false,
            format: None,
        }
    }
}

fn default_true() -> bool {
    true
}

// Extra independent runs executed alongside the primary one
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct BatchConfig {
    #[serde(default)]
    pub starts: Vec<(i64, i64)>,
}

// Main run configuration structure, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct AntConfig {
    #[serde(default)]
    pub initial_conditions: InitialConditions,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

impl AntConfig {
    /// Loads the run configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e))?;
        let config = Self::from_toml_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Invalid config '{}': {}", path_ref.display(), e))?;
        Ok(config)
    }

    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: AntConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.output.base_filename.trim().is_empty() {
            anyhow::bail!("base_filename must not be empty.");
        }
        let secs = self.timing.progress_interval_secs;
        if !secs.is_finite() || secs < 0.0 {
            anyhow::bail!("progress_interval_secs must be a non-negative number, got {}.", secs);
        }
        Ok(())
    }

    pub fn start(&self) -> Coord {
        Coord::new(self.initial_conditions.start_x, self.initial_conditions.start_y)
    }

    /// Step count to run. Negative counts run nothing.
    pub fn total_steps(&self) -> u64 {
        u64::try_from(self.timing.total_steps).unwrap_or(0)
    }

    pub fn batch_starts(&self) -> Vec<Coord> {
        self.batch.starts.iter().copied().map(Coord::from).collect()
    }
}
