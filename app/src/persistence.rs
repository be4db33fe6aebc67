//! Whole-diagram persistence in a small key-value store.
//!
//! The diagram is written as one JSON blob under [`STORAGE_KEY`] and read back
//! wholesale; nothing is persisted incrementally.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use diagram_library::{DiagramStore, PersistedSnapshot};
use log::{debug, info};

use crate::config::project_dirs;
use crate::error::AppError;

/// Key the diagram snapshot is stored under.
pub const STORAGE_KEY: &str = "diagramState";

/// Minimal string key-value persistence surface.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError>;
}

/// One file per key inside a directory.
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store in the platform data directory.
    pub fn in_data_dir() -> Result<Self, AppError> {
        let dirs = project_dirs().ok_or(AppError::NoDataDir)?;
        Ok(Self::new(dirs.data_dir()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    /// Writes a sibling temp file first and renames it over the target, so a
    /// reader never sees a half-written blob.
    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: HashMap<String, String>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub fn save_diagram(store: &DiagramStore, kv: &mut dyn KeyValueStore) -> Result<(), AppError> {
    let json = store.serialize().to_json()?;
    kv.set(STORAGE_KEY, &json)?;
    info!(
        "Saved diagram ({} nodes, {} links)",
        store.nodes().len(),
        store.links().len()
    );
    Ok(())
}

/// The persisted snapshot, or `None` when nothing has been saved yet.
pub fn load_snapshot(kv: &dyn KeyValueStore) -> Result<Option<PersistedSnapshot>, AppError> {
    match kv.get(STORAGE_KEY)? {
        Some(json) => Ok(Some(PersistedSnapshot::from_json(&json)?)),
        None => Ok(None),
    }
}

/// Builds a store from persisted state, falling back to the default dataset
/// when nothing was saved. A corrupt blob is an error.
pub fn load_diagram(kv: &dyn KeyValueStore) -> Result<DiagramStore, AppError> {
    match load_snapshot(kv)? {
        Some(snapshot) => {
            info!(
                "Loaded diagram ({} nodes, {} links)",
                snapshot.nodes.len(),
                snapshot.links.len()
            );
            Ok(DiagramStore::from_snapshot(snapshot))
        }
        None => {
            info!("No saved diagram, starting from the default dataset");
            Ok(DiagramStore::with_default_dataset())
        }
    }
}
