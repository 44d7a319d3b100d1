//! JSON snapshots of collected aggregates.
//!
//! Collecting a day of logs for every function in a region is slow, so the
//! result is written to `{account}-{region}.json` and reused on the next run.

use crate::error::{CostError, Result};
use crate::models::FunctionAggregate;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Identifies the snapshot for one account and region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotKey {
    pub account_id: String,
    pub region: String,
}

impl SnapshotKey {
    pub fn new(account_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            region: region.into(),
        }
    }

    /// `{account_id}-{region}.json`
    pub fn file_name(&self) -> String {
        format!("{}-{}.json", self.account_id, self.region)
    }
}

/// Directory-backed snapshot storage.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &SnapshotKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    pub fn exists(&self, key: &SnapshotKey) -> bool {
        self.path_for(key).exists()
    }

    /// Load a snapshot, or `None` if there is none for this key.
    pub fn load(&self, key: &SnapshotKey) -> Result<Option<Vec<FunctionAggregate>>> {
        let path = self.path_for(key);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CostError::SnapshotIo { path, source: e }),
        };

        let aggregates: Option<Vec<FunctionAggregate>> =
            serde_json::from_reader(BufReader::new(file))
                .map_err(|e| CostError::SnapshotFormat {
                    path: path.clone(),
                    source: e,
                })?;
        let aggregates = aggregates.unwrap_or_default();

        info!(
            filename = %path.display(),
            functions = aggregates.len(),
            "existing report data found, using it"
        );
        Ok(Some(aggregates))
    }

    /// Write a snapshot, replacing any existing one.
    pub fn save(&self, key: &SnapshotKey, aggregates: &[FunctionAggregate]) -> Result<PathBuf> {
        let path = self.path_for(key);
        let io_err = |e| CostError::SnapshotIo {
            path: path.clone(),
            source: e,
        };

        std::fs::create_dir_all(&self.dir).map_err(io_err)?;
        let file = File::create(&path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, aggregates).map_err(|e| CostError::SnapshotFormat {
            path: path.clone(),
            source: e,
        })?;
        writer.write_all(b"\n").map_err(io_err)?;
        writer.flush().map_err(io_err)?;

        debug!(filename = %path.display(), functions = aggregates.len(), "wrote snapshot");
        Ok(path)
    }
}
