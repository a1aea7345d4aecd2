//! Source → target key mapping.
//!
//! [`KeyMap`] is the in-run deduplication table. [`MappingLedger`] persists
//! it as CSV (`kind,source_key,target_key`) so a second import of the same
//! file skips everything the first one created.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HierarchyError, Result};
use crate::model::IssueKind;

/// One created (or planned) issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub kind: IssueKind,
    pub source_key: String,
    pub target_key: String,
}

/// Source key → target key, per hierarchy level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyMap {
    keys: HashMap<(IssueKind, String), String>,
}

impl KeyMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, kind: IssueKind, source_key: &str) -> Option<&str> {
        self.keys
            .get(&(kind, source_key.to_string()))
            .map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, kind: IssueKind, source_key: &str) -> bool {
        self.get(kind, source_key).is_some()
    }

    pub fn insert(&mut self, entry: &MappingEntry) {
        self.keys.insert(
            (entry.kind, entry.source_key.clone()),
            entry.target_key.clone(),
        );
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of mapped keys of one kind.
    #[must_use]
    pub fn count(&self, kind: IssueKind) -> usize {
        self.keys.keys().filter(|(k, _)| *k == kind).count()
    }
}

impl FromIterator<MappingEntry> for KeyMap {
    fn from_iter<I: IntoIterator<Item = MappingEntry>>(iter: I) -> Self {
        let mut map = Self::new();
        for entry in iter {
            map.insert(&entry);
        }
        map
    }
}

/// Append-only CSV file of [`MappingEntry`] records.
pub struct MappingLedger {
    path: PathBuf,
    writer: csv::Writer<fs::File>,
}

impl MappingLedger {
    /// Load every entry of a ledger. A missing file is an empty ledger.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file exists but cannot be read, or `Csv` if a
    /// record is malformed.
    pub fn load(path: &Path) -> Result<KeyMap> {
        if !path.exists() {
            return Ok(KeyMap::new());
        }
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;
        let mut map = KeyMap::new();
        for entry in reader.deserialize::<MappingEntry>() {
            map.insert(&entry?);
        }
        tracing::debug!(path = %path.display(), entries = map.len(), "Loaded key mapping");
        Ok(map)
    }

    /// Open a ledger for appending, writing the header if the file is new.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be opened or created.
    pub fn open(path: &Path) -> Result<Self> {
        let is_new = fs::metadata(path).map_or(true, |m| m.len() == 0);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(HierarchyError::Io)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if is_new {
            writer.write_record(["kind", "source_key", "target_key"])?;
            writer.flush()?;
        }
        Ok(Self {
            path: path.to_path_buf(),
            writer,
        })
    }

    /// Append one entry and flush it to disk.
    ///
    /// # Errors
    ///
    /// Returns `Csv` or `Io` if the record cannot be written.
    pub fn record(&mut self, entry: &MappingEntry) -> Result<()> {
        self.writer.serialize(entry)?;
        self.writer.flush()?;
        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: IssueKind, source: &str, target: &str) -> MappingEntry {
        MappingEntry {
            kind,
            source_key: source.into(),
            target_key: target.into(),
        }
    }

    #[test]
    fn test_key_map_separates_kinds() {
        let map: KeyMap = vec![
            entry(IssueKind::Epic, "OLD-1", "NEW-1"),
            entry(IssueKind::Task, "OLD-2", "NEW-2"),
        ]
        .into_iter()
        .collect();

        assert_eq!(map.get(IssueKind::Epic, "OLD-1"), Some("NEW-1"));
        assert!(!map.contains(IssueKind::Task, "OLD-1"));
        assert_eq!(map.count(IssueKind::Task), 1);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_missing_ledger_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let map = MappingLedger::load(&dir.path().join("mapping.csv")).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_ledger_appends_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.csv");

        {
            let mut ledger = MappingLedger::open(&path).unwrap();
            ledger
                .record(&entry(IssueKind::Epic, "OLD-1", "NEW-10"))
                .unwrap();
        }
        {
            let mut ledger = MappingLedger::open(&path).unwrap();
            ledger
                .record(&entry(IssueKind::Subtask, "OLD-3", "NEW-12"))
                .unwrap();
        }

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "kind,source_key,target_key\nepic,OLD-1,NEW-10\nsubtask,OLD-3,NEW-12\n"
        );

        let map = MappingLedger::load(&path).unwrap();
        assert_eq!(map.get(IssueKind::Epic, "OLD-1"), Some("NEW-10"));
        assert_eq!(map.get(IssueKind::Subtask, "OLD-3"), Some("NEW-12"));
    }

    #[test]
    fn test_record_reaches_disk_while_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.csv");
        let mut ledger = MappingLedger::open(&path).unwrap();
        assert_eq!(ledger.path(), path.as_path());

        ledger
            .record(&entry(IssueKind::Task, "OLD-2", "NEW-11"))
            .unwrap();
        let map = MappingLedger::load(&path).unwrap();
        assert_eq!(map.get(IssueKind::Task, "OLD-2"), Some("NEW-11"));

        ledger
            .record(&entry(IssueKind::Subtask, "OLD-3", "NEW-12"))
            .unwrap();
        assert_eq!(MappingLedger::load(&path).unwrap().len(), 2);
    }
}
