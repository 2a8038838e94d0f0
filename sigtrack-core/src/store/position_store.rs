//! Position snapshot store — the full ledger rewritten after every update.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::StoreError;
use crate::domain::PositionMap;

/// On-disk snapshot shape: `{updated_at, position_count, positions}`.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    updated_at: DateTime<Utc>,
    position_count: usize,
    positions: PositionMap,
}

/// Single-file snapshot of the position ledger.
///
/// Load happens once at startup; save after every update cycle. Sequential
/// single-writer access is assumed throughout.
pub struct PositionStore {
    path: PathBuf,
}

impl PositionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the ledger. Missing or corrupt snapshots start empty — notable,
    /// logged, never fatal.
    pub fn load(&self) -> PositionMap {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("no existing positions file at {}", self.path.display());
                return PositionMap::new();
            }
            Err(e) => {
                warn!(
                    "failed to read positions file {}: {e}; starting empty",
                    self.path.display()
                );
                return PositionMap::new();
            }
        };

        match serde_json::from_str::<Snapshot>(&text) {
            Ok(snapshot) => {
                info!(
                    "loaded {} positions from {}",
                    snapshot.positions.len(),
                    self.path.display()
                );
                snapshot.positions
            }
            Err(e) => {
                warn!(
                    "corrupt positions file {}: {e}; starting empty",
                    self.path.display()
                );
                PositionMap::new()
            }
        }
    }

    /// Rewrite the snapshot in full. Failure here is a hard error for the
    /// cycle — the caller must not assume the ledger reached disk.
    pub fn save(&self, positions: &PositionMap) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let snapshot = Snapshot {
            updated_at: Utc::now(),
            position_count: positions.len(),
            positions: positions.clone(),
        };
        let json =
            serde_json::to_string_pretty(&snapshot).map_err(|source| StoreError::Malformed {
                path: self.path.display().to_string(),
                source,
            })?;
        fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        })?;

        Ok(())
    }
}
