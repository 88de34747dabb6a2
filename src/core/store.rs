//! On-disk store for everything that must survive a restart
//!
//! The contract is deliberately small: flat string-keyed maps, one JSON
//! file per record kind, whole-map writes. A missing file reads as an
//! empty map. Richer persistence stays out of the core.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Offline answer map, keyed `<Category>-<questionIndex>`
const ANSWERS_FILE: &str = "calmpath-answers.json";
/// Preparedness checklist map, keyed by item text
const CHECKLIST_FILE: &str = "calmpath-checklist.json";

/// Errors the store can surface
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage record is not valid json: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Directory-backed key-value store
#[derive(Debug, Clone)]
pub struct OfflineStore {
    dir: PathBuf,
}

impl OfflineStore {
    /// Create a store rooted at `dir`; nothing is touched until a write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory this store reads and writes
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load the offline answer map
    pub fn load_answers(&self) -> Result<BTreeMap<String, String>, StoreError> {
        self.load_map(ANSWERS_FILE)
    }

    /// Persist the whole answer map
    pub fn save_answers(&self, answers: &BTreeMap<String, String>) -> Result<(), StoreError> {
        self.save_map(ANSWERS_FILE, answers)
    }

    /// Load the checklist tick map
    pub fn load_checklist(&self) -> Result<BTreeMap<String, bool>, StoreError> {
        self.load_map(CHECKLIST_FILE)
    }

    /// Persist the whole checklist tick map
    pub fn save_checklist(&self, checked: &BTreeMap<String, bool>) -> Result<(), StoreError> {
        self.save_map(CHECKLIST_FILE, checked)
    }

    fn load_map<V: DeserializeOwned>(&self, file: &str) -> Result<BTreeMap<String, V>, StoreError> {
        let path = self.dir.join(file);
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let json = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn save_map<V: Serialize>(&self, file: &str, map: &BTreeMap<String, V>) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(map)?;
        std::fs::write(self.dir.join(file), json)?;
        debug!(file, "store written");
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("calmpath-store-{}-{}", tag, nanos))
    }

    #[test]
    fn test_missing_files_read_as_empty() {
        let store = OfflineStore::new(scratch_dir("empty"));
        assert!(store.load_answers().unwrap().is_empty());
        assert!(store.load_checklist().unwrap().is_empty());
    }

    #[test]
    fn test_answers_round_trip() {
        let dir = scratch_dir("answers");
        let store = OfflineStore::new(&dir);

        let mut answers = BTreeMap::new();
        answers.insert("Medical-0".to_string(), "Yes".to_string());
        answers.insert("Medical-1".to_string(), "No".to_string());
        store.save_answers(&answers).unwrap();

        let loaded = OfflineStore::new(&dir).load_answers().unwrap();
        assert_eq!(loaded, answers);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_checklist_round_trip_keeps_unticked_entries() {
        let dir = scratch_dir("checklist");
        let store = OfflineStore::new(&dir);

        let mut checked = BTreeMap::new();
        checked.insert("Fire extinguisher accessible".to_string(), true);
        checked.insert("First aid kit stocked and accessible".to_string(), false);
        store.save_checklist(&checked).unwrap();

        let loaded = store.load_checklist().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("Fire extinguisher accessible"), Some(&true));
        assert_eq!(
            loaded.get("First aid kit stocked and accessible"),
            Some(&false)
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_overwrites_whole_map() {
        let dir = scratch_dir("overwrite");
        let store = OfflineStore::new(&dir);

        let mut first = BTreeMap::new();
        first.insert("Medical-0".to_string(), "Yes".to_string());
        store.save_answers(&first).unwrap();

        let second = BTreeMap::new();
        store.save_answers(&second).unwrap();

        assert!(store.load_answers().unwrap().is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_corrupt_record_surfaces_error() {
        let dir = scratch_dir("corrupt");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("calmpath-answers.json"), "not json {").unwrap();

        let store = OfflineStore::new(&dir);
        assert!(matches!(
            store.load_answers(),
            Err(StoreError::Corrupt(_))
        ));

        std::fs::remove_dir_all(&dir).ok();
    }
}
