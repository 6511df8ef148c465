use ant_common::{LangtonsAnt, OutputConfig, Snapshot, sorted_cells};
use anyhow::{Context, Result};
use log::{error, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// On-disk encoding for recorded snapshots.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Bincode,
    MessagePack,
}

impl SnapshotFormat {
    /// Parses the `format` setting. Unknown names fall back to JSON.
    pub fn from_config(format: Option<&str>) -> Self {
        match format.unwrap_or("json") {
            "json" => SnapshotFormat::Json,
            "bincode" => SnapshotFormat::Bincode,
            "messagepack" => SnapshotFormat::MessagePack,
            other => {
                error!("Unknown output format: {}. Using JSON instead.", other);
                SnapshotFormat::Json
            }
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            SnapshotFormat::Json => "json",
            SnapshotFormat::Bincode => "bin",
            SnapshotFormat::MessagePack => "msgpack",
        }
    }
}

pub fn snapshot_path(base: &str, format: SnapshotFormat) -> PathBuf {
    PathBuf::from(format!("{}_snapshots.{}", base, format.extension()))
}

pub fn grid_path(base: &str) -> PathBuf {
    PathBuf::from(format!("{}_grid.csv", base))
}

/// Writes all snapshots to `path` in the given format.
pub fn write_snapshots(path: &Path, snapshots: &[Snapshot], format: SnapshotFormat) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Error creating snapshot file '{}'", path.display()))?;
    let mut writer = BufWriter::new(file);
    match format {
        // Compact JSON, no pretty printing
        SnapshotFormat::Json => serde_json::to_writer(&mut writer, snapshots)
            .context("Error serializing snapshots to JSON")?,
        SnapshotFormat::Bincode => bincode::serialize_into(&mut writer, snapshots)
            .context("Error serializing snapshots to bincode")?,
        SnapshotFormat::MessagePack => rmp_serde::encode::write(&mut writer, &snapshots)
            .context("Error serializing snapshots to MessagePack")?,
    }
    writer.flush()?;
    Ok(())
}

/// Writes every marked cell as an `x,y` row, sorted.
pub fn write_grid_csv(path: &Path, ant: &LangtonsAnt) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Error creating CSV file '{}'", path.display()))?;
    writer.write_record(["x", "y"])?;
    for (x, y) in sorted_cells(ant) {
        writer.write_record([x.to_string(), y.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Saves whatever the output section asks for. Failures are logged, not fatal.
pub fn save_outputs(output: &OutputConfig, ant: &LangtonsAnt, snapshots: &[Snapshot]) {
    if output.save_stats {
        let format = SnapshotFormat::from_config(output.format.as_deref());
        let path = snapshot_path(&output.base_filename, format);
        match write_snapshots(&path, snapshots, format) {
            Ok(()) => info!("All {} snapshots saved to {} ({:?} format)", snapshots.len(), path.display(), format),
            Err(e) => error!("{:#}", e),
        }
    } else {
        info!("Skipping saving snapshots as per config (save_stats is false).");
    }

    if output.save_grid {
        let path = grid_path(&output.base_filename);
        match write_grid_csv(&path, ant) {
            Ok(()) => info!("Marked cells saved to {}", path.display()),
            Err(e) => error!("{:#}", e),
        }
    } else {
        info!("Skipping saving marked cells as per config.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ant_engine_{}_{}", std::process::id(), name))
    }

    fn sample() -> (LangtonsAnt, Vec<Snapshot>) {
        let mut ant = LangtonsAnt::default();
        let mut snaps = vec![Snapshot::capture(&ant, true)];
        ant.run(10);
        snaps.push(Snapshot::capture(&ant, true));
        (ant, snaps)
    }

    #[test]
    fn format_names_map_and_fall_back() {
        assert_eq!(SnapshotFormat::from_config(None), SnapshotFormat::Json);
        assert_eq!(SnapshotFormat::from_config(Some("bincode")), SnapshotFormat::Bincode);
        assert_eq!(SnapshotFormat::from_config(Some("messagepack")), SnapshotFormat::MessagePack);
        assert_eq!(SnapshotFormat::from_config(Some("yaml")), SnapshotFormat::Json);
        assert_eq!(snapshot_path("run", SnapshotFormat::Bincode), PathBuf::from("run_snapshots.bin"));
    }

    #[test]
    fn json_snapshots_read_back() {
        let (_, snaps) = sample();
        let path = temp_path("snaps.json");
        write_snapshots(&path, &snaps, SnapshotFormat::Json).unwrap();
        let read: Vec<Snapshot> = serde_json::from_reader(BufReader::new(File::open(&path).unwrap())).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(read, snaps);
    }

    #[test]
    fn messagepack_snapshots_read_back() {
        let (_, snaps) = sample();
        let path = temp_path("snaps.msgpack");
        write_snapshots(&path, &snaps, SnapshotFormat::MessagePack).unwrap();
        let read: Vec<Snapshot> = rmp_serde::from_read(BufReader::new(File::open(&path).unwrap())).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(read, snaps);
    }

    #[test]
    fn bincode_snapshots_read_back() {
        let (_, mut snaps) = sample();
        snaps[0].marked_cells = None;
        let path = temp_path("snaps.bin");
        write_snapshots(&path, &snaps, SnapshotFormat::Bincode).unwrap();
        let read: Vec<Snapshot> = bincode::deserialize_from(BufReader::new(File::open(&path).unwrap())).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(read, snaps);
    }

    #[test]
    fn grid_csv_lists_sorted_cells() {
        let (ant, _) = sample();
        let path = temp_path("grid.csv");
        write_grid_csv(&path, &ant).unwrap();
        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<(i64, i64)> = reader
            .records()
            .map(|r| {
                let r = r.unwrap();
                (r[0].parse().unwrap(), r[1].parse().unwrap())
            })
            .collect();
        std::fs::remove_file(&path).ok();
        assert_eq!(rows, sorted_cells(&ant));
        assert_eq!(rows.len(), 6);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let (_, snaps) = sample();
        let path = Path::new("/nonexistent-dir/for/ant/snaps.json");
        assert!(write_snapshots(path, &snaps, SnapshotFormat::Json).is_err());
    }
}
