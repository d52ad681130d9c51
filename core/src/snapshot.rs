//! Snapshot export — the full population to one CSV file per tick.
//!
//! A snapshot is written under a temporary name and renamed into place
//! only after it has been flushed and synced. Consumers polling the
//! output directory never see a partial file under its final name.

use crate::{
    asset::{AssetRecord, COLUMNS},
    config::SimConfig,
    error::{SimError, SimResult},
    store::PopulationStore,
    types::{Tick, Timestamp},
};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Sortable UTC stamp embedded in every file name, millisecond precision.
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%3fZ";

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotReport {
    pub tick: Tick,
    pub path: PathBuf,
    pub rows: usize,
}

pub struct SnapshotExporter {
    output_dir:  PathBuf,
    file_prefix: String,
}

impl SnapshotExporter {
    pub fn new(output_dir: impl Into<PathBuf>, file_prefix: impl Into<String>) -> Self {
        Self {
            output_dir:  output_dir.into(),
            file_prefix: file_prefix.into(),
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.output_dir.clone(), config.file_prefix.clone())
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// The fixed column list every snapshot carries, in order.
    pub fn columns() -> &'static [&'static str] {
        &COLUMNS
    }

    /// `<prefix>_<UTC stamp>_<tick>.csv`. The tick suffix keeps names
    /// distinct when two ticks land in the same millisecond.
    pub fn file_name(&self, tick: Tick, now: Timestamp) -> String {
        format!(
            "{}_{}_{tick:06}.csv",
            self.file_prefix,
            now.format(FILE_TIMESTAMP_FORMAT)
        )
    }

    /// Write the whole population as one snapshot.
    /// Fails with `EmptyPopulation`, writing nothing, if the store is empty.
    pub fn export(
        &self,
        store: &PopulationStore,
        tick: Tick,
        now: Timestamp,
    ) -> SimResult<SnapshotReport> {
        if store.is_empty() {
            return Err(SimError::EmptyPopulation);
        }

        fs::create_dir_all(&self.output_dir)
            .map_err(|e| SimError::export_io(&self.output_dir, e))?;

        let name = self.file_name(tick, now);
        let final_path = self.output_dir.join(&name);
        let tmp_path = self.output_dir.join(format!(".{name}.tmp"));

        let rows = match write_csv(&tmp_path, store.all()) {
            Ok(rows) => rows,
            Err(e) => {
                let _ = fs::remove_file(&tmp_path);
                return Err(SimError::export_io(&tmp_path, e));
            }
        };

        if let Err(e) = fs::rename(&tmp_path, &final_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(SimError::export_io(&final_path, e));
        }

        log::info!(
            "tick={tick} snapshot: wrote {rows} rows to {}",
            final_path.display()
        );
        Ok(SnapshotReport { tick, path: final_path, rows })
    }
}

fn write_csv<'a>(
    path: &Path,
    records: impl Iterator<Item = &'a AssetRecord>,
) -> io::Result<usize> {
    let file = File::create(path)?;
    // Header comes from the record's field names, which match COLUMNS.
    let mut writer = csv::Writer::from_writer(file);
    let mut rows = 0usize;
    for record in records {
        writer.serialize(record)?;
        rows += 1;
    }
    writer.flush()?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(rows)
}
