//! Append-only signal cycle log.
//!
//! One JSON file per cycle, named `signals_YYYYMMDD_HHMMSS.json` so a plain
//! lexicographic sort of the filenames is also chronological. Files are
//! written once and never mutated; the daily replay enumerates a date's files
//! in that order.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::StoreError;
use crate::domain::SignalMap;

/// One persisted cycle: the signal map plus write metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalLogEntry {
    pub generated_at: DateTime<Utc>,
    pub signal_count: usize,
    pub signals: SignalMap,
}

/// Directory-backed cycle log.
pub struct SignalLog {
    dir: PathBuf,
}

impl SignalLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Append one cycle. Returns the path of the written file.
    pub fn append(&self, signals: &SignalMap) -> Result<PathBuf, StoreError> {
        let generated_at = Utc::now();
        self.append_at(signals, generated_at)
    }

    /// Append one cycle with an explicit timestamp (used by tests and by
    /// callers replaying historical cycles).
    ///
    /// Entries are write-once: filenames have second resolution, and a second
    /// cycle landing on the same timestamp is an error, never an overwrite.
    pub fn append_at(
        &self,
        signals: &SignalMap,
        generated_at: DateTime<Utc>,
    ) -> Result<PathBuf, StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.display().to_string(),
            source,
        })?;

        let entry = SignalLogEntry {
            generated_at,
            signal_count: signals.len(),
            signals: signals.clone(),
        };
        let filename = format!("signals_{}.json", generated_at.format("%Y%m%d_%H%M%S"));
        let path = self.dir.join(filename);

        let json =
            serde_json::to_string_pretty(&entry).map_err(|source| StoreError::Malformed {
                path: path.display().to_string(),
                source,
            })?;

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| StoreError::Io {
                path: path.display().to_string(),
                source,
            })?;
        file.write_all(json.as_bytes())
            .map_err(|source| StoreError::Io {
                path: path.display().to_string(),
                source,
            })?;

        info!("saved {} signals to {}", signals.len(), path.display());
        Ok(path)
    }

    /// All cycles written on `date`, in cycle (filename) order.
    ///
    /// A corrupt entry file is skipped with a warning; it never aborts the
    /// enumeration.
    pub fn entries_for_date(&self, date: NaiveDate) -> Result<Vec<SignalLogEntry>, StoreError> {
        let prefix = format!("signals_{}_", date.format("%Y%m%d"));
        let mut paths = self.matching_files(&prefix)?;
        paths.sort();

        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            match self.read_entry(&path) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("skipping unreadable signal log entry: {e}"),
            }
        }
        Ok(entries)
    }

    /// The most recent cycle's signal map, if any cycle has been written.
    pub fn latest(&self) -> Result<Option<SignalMap>, StoreError> {
        let mut paths = self.matching_files("signals_")?;
        paths.sort();

        // Walk newest-first past any corrupt entries.
        for path in paths.iter().rev() {
            match self.read_entry(path) {
                Ok(entry) => return Ok(Some(entry.signals)),
                Err(e) => warn!("skipping unreadable signal log entry: {e}"),
            }
        }
        Ok(None)
    }

    fn matching_files(&self, prefix: &str) -> Result<Vec<PathBuf>, StoreError> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.dir.display().to_string(),
                    source,
                })
            }
        };

        let mut paths = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|source| StoreError::Io {
                path: self.dir.display().to_string(),
                source,
            })?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(prefix) && name.ends_with(".json") {
                paths.push(entry.path());
            }
        }
        Ok(paths)
    }

    fn read_entry(&self, path: &Path) -> Result<SignalLogEntry, StoreError> {
        let text = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| StoreError::Malformed {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Signal, SignalMode, TradeAction};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn signal_map(ticker: &str, action: TradeAction) -> SignalMap {
        let mut map = SignalMap::new();
        map.insert(
            ticker.to_string(),
            Signal {
                ticker: ticker.to_string(),
                action,
                confidence: 0.8,
                sentiment: "neutral".into(),
                reasoning: String::new(),
                key_points: Vec::new(),
                risk_factors: Vec::new(),
                expected_impact: String::new(),
                impact_magnitude: String::new(),
                price: None,
                mode: SignalMode::Realtime,
                timestamp: Utc::now(),
            },
        );
        map
    }

    fn at(date: NaiveDate, h: u32, m: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(&date.and_hms_opt(h, m, 0).unwrap())
    }

    #[test]
    fn entries_come_back_in_cycle_order() {
        let dir = TempDir::new().unwrap();
        let log = SignalLog::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();

        // Written out of order on purpose.
        log.append_at(&signal_map("B", TradeAction::Sell), at(date, 15, 30))
            .unwrap();
        log.append_at(&signal_map("A", TradeAction::Buy), at(date, 9, 0))
            .unwrap();
        log.append_at(&signal_map("C", TradeAction::Hold), at(date, 12, 15))
            .unwrap();

        let entries = log.entries_for_date(date).unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].signals.contains_key("A"));
        assert!(entries[1].signals.contains_key("C"));
        assert!(entries[2].signals.contains_key("B"));
    }

    #[test]
    fn other_dates_are_excluded() {
        let dir = TempDir::new().unwrap();
        let log = SignalLog::new(dir.path());
        let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();

        log.append_at(&signal_map("A", TradeAction::Buy), at(monday, 10, 0))
            .unwrap();
        log.append_at(&signal_map("B", TradeAction::Buy), at(tuesday, 10, 0))
            .unwrap();

        let entries = log.entries_for_date(monday).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].signals.contains_key("A"));
    }

    #[test]
    fn corrupt_entry_is_skipped() {
        let dir = TempDir::new().unwrap();
        let log = SignalLog::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();

        log.append_at(&signal_map("A", TradeAction::Buy), at(date, 10, 0))
            .unwrap();
        fs::write(dir.path().join("signals_20250602_110000.json"), "{ nope").unwrap();

        let entries = log.entries_for_date(date).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn latest_returns_newest_cycle() {
        let dir = TempDir::new().unwrap();
        let log = SignalLog::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();

        log.append_at(&signal_map("OLD", TradeAction::Buy), at(date, 9, 0))
            .unwrap();
        log.append_at(&signal_map("NEW", TradeAction::Sell), at(date, 16, 0))
            .unwrap();

        let latest = log.latest().unwrap().unwrap();
        assert!(latest.contains_key("NEW"));
    }

    #[test]
    fn same_second_append_fails_instead_of_overwriting() {
        let dir = TempDir::new().unwrap();
        let log = SignalLog::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();

        log.append_at(&signal_map("FIRST", TradeAction::Buy), at(date, 10, 0))
            .unwrap();
        let err = log
            .append_at(&signal_map("SECOND", TradeAction::Sell), at(date, 10, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Io { ref source, .. }
                if source.kind() == std::io::ErrorKind::AlreadyExists
        ));

        // The first cycle is untouched.
        let entries = log.entries_for_date(date).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].signals.contains_key("FIRST"));
    }

    #[test]
    fn empty_directory_yields_no_entries() {
        let dir = TempDir::new().unwrap();
        let log = SignalLog::new(dir.path().join("does_not_exist_yet"));
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();

        assert!(log.entries_for_date(date).unwrap().is_empty());
        assert!(log.latest().unwrap().is_none());
    }
}
