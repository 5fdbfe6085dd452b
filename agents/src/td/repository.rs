use super::compress::StateKey;
use super::utility::UtilityTable;
use crate::error::PersistenceError;
use crate::persist::{read_msgpack, write_msgpack, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// On-disk form of a utility table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilitySnapshot {
    /// Identifies the learner settings the utilities were learned under.
    pub fingerprint: String,
    pub entries: Vec<(StateKey, f64)>,
}

impl UtilitySnapshot {
    pub fn of(table: &UtilityTable, fingerprint: &str) -> Self {
        Self {
            fingerprint: fingerprint.to_string(),
            entries: table.sorted_entries(),
        }
    }

    pub fn into_table(self) -> UtilityTable {
        self.entries.into_iter().collect()
    }
}

/// Storage for a learner's utility table.
pub trait UtilityRepository: Send {
    fn save(&self, table: &UtilityTable, fingerprint: &str) -> Result<()>;

    /// Returns None when nothing has been saved yet.
    fn load(&self, fingerprint: &str) -> Result<Option<UtilityTable>>;
}

/// File name of the table learned under `fingerprint`.
pub fn table_file_name(fingerprint: &str) -> String {
    format!("utility.{}.msgpack", fingerprint)
}

/// Keeps the table in one MessagePack file.
#[derive(Debug, Clone)]
pub struct MsgPackRepository {
    path: PathBuf,
}

impl MsgPackRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file for `fingerprint` inside `dir`.
    pub fn in_dir(dir: &Path, fingerprint: &str) -> Self {
        Self::new(dir.join(table_file_name(fingerprint)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file whatever fingerprint it carries.
    pub fn read_snapshot(&self) -> Result<UtilitySnapshot> {
        read_msgpack(&self.path)
    }
}

impl UtilityRepository for MsgPackRepository {
    fn save(&self, table: &UtilityTable, fingerprint: &str) -> Result<()> {
        write_msgpack(&UtilitySnapshot::of(table, fingerprint), &self.path)
    }

    fn load(&self, fingerprint: &str) -> Result<Option<UtilityTable>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let snapshot = self.read_snapshot()?;
        if snapshot.fingerprint != fingerprint {
            return Err(PersistenceError::FingerprintMismatch {
                path: self.path.clone(),
                expected: fingerprint.to_string(),
                found: snapshot.fingerprint,
            });
        }
        Ok(Some(snapshot.into_table()))
    }
}

/// Keeps the last saved snapshot in memory.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    saved: Mutex<Option<UtilitySnapshot>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> Option<UtilitySnapshot> {
        self.saved.lock().ok().and_then(|saved| saved.clone())
    }
}

impl UtilityRepository for InMemoryRepository {
    fn save(&self, table: &UtilityTable, fingerprint: &str) -> Result<()> {
        if let Ok(mut saved) = self.saved.lock() {
            *saved = Some(UtilitySnapshot::of(table, fingerprint));
        }
        Ok(())
    }

    fn load(&self, fingerprint: &str) -> Result<Option<UtilityTable>> {
        Ok(self
            .saved()
            .filter(|snapshot| snapshot.fingerprint == fingerprint)
            .map(UtilitySnapshot::into_table))
    }
}

impl<R: UtilityRepository + Sync + ?Sized> UtilityRepository for std::sync::Arc<R> {
    fn save(&self, table: &UtilityTable, fingerprint: &str) -> Result<()> {
        (**self).save(table, fingerprint)
    }

    fn load(&self, fingerprint: &str) -> Result<Option<UtilityTable>> {
        (**self).load(fingerprint)
    }
}
