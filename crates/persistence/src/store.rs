//! Where save documents live between sessions.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use sim_core::SaveDocument;
use tracing::{debug, info};

use crate::PersistenceError;

/// Storage backend for a single save slot.
pub trait SaveStore: Send + Sync {
    /// Reads the slot. `Ok(None)` when nothing was saved yet.
    fn load(&self) -> Result<Option<SaveDocument>, PersistenceError>;
    /// Overwrites the slot.
    fn save(&self, doc: &SaveDocument) -> Result<(), PersistenceError>;
    /// Empties the slot.
    fn clear(&self) -> Result<(), PersistenceError>;
}

/// JSON file on disk. Writes go through a sibling temp file and a rename so
/// a crash never leaves a half-written save.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store backed by `path`. Nothing is touched until the first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Save file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SaveStore for FileStore {
    fn load(&self) -> Result<Option<SaveDocument>, PersistenceError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let doc = SaveDocument::from_json(&text)?;
        debug!(path = %self.path.display(), version = doc.version, "save read");
        Ok(Some(doc))
    }

    fn save(&self, doc: &SaveDocument) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let text = doc.to_json()?;
        let temp = self.temp_path();
        fs::write(&temp, text)?;
        fs::rename(&temp, &self.path)?;
        info!(path = %self.path.display(), "game saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), PersistenceError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-process slot holding the serialized JSON, for tests and headless runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored text, if any.
    pub fn raw(&self) -> Result<Option<String>, PersistenceError> {
        Ok(self.slot.lock().map_err(|_| PersistenceError::Poisoned)?.clone())
    }

    /// Replaces the stored text verbatim, bypassing validation.
    pub fn put_raw(&self, text: impl Into<String>) -> Result<(), PersistenceError> {
        *self.slot.lock().map_err(|_| PersistenceError::Poisoned)? = Some(text.into());
        Ok(())
    }
}

impl SaveStore for MemoryStore {
    fn load(&self) -> Result<Option<SaveDocument>, PersistenceError> {
        match self.raw()? {
            Some(text) => Ok(Some(SaveDocument::from_json(&text)?)),
            None => Ok(None),
        }
    }

    fn save(&self, doc: &SaveDocument) -> Result<(), PersistenceError> {
        let text = doc.to_json()?;
        self.put_raw(text)
    }

    fn clear(&self) -> Result<(), PersistenceError> {
        *self.slot.lock().map_err(|_| PersistenceError::Poisoned)? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::{GameState, StateError};

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());
        let mut state = GameState::new();
        let _ = state.add_money(77).unwrap();
        store.save(&state.to_document()).unwrap();
        assert_eq!(store.load().unwrap().map(|d| d.money), Some(77));
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn memory_store_rejects_bad_versions() {
        let store = MemoryStore::new();
        store.put_raw(r#"{"version": 1}"#).unwrap();
        assert!(matches!(
            store.load(),
            Err(PersistenceError::Invalid(StateError::UnsupportedVersion(1)))
        ));
    }

    #[test]
    fn temp_path_is_a_sibling() {
        let store = FileStore::new("saves/slot.json");
        assert_eq!(store.temp_path(), PathBuf::from("saves/slot.json.tmp"));
    }
}
