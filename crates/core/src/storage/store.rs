use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::errors::CoreError;

/// Durable local key-value storage for client preferences and credentials.
///
/// Mirrors browser localStorage semantics: flat string values under fixed
/// key names, no schema version, no migration. Implementations must treat a
/// missing key as `None`, never as an error.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key has never been set.
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;

    /// Write a value, overwriting any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;

    /// Delete a value. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), CoreError>;
}

// ── File-backed store ───────────────────────────────────────────────

/// A `KeyValueStore` backed by a single JSON object file on disk.
///
/// Each write re-reads the file, applies the change, and writes it back —
/// the value set is tiny (two tokens and a theme), so simplicity wins over
/// incremental I/O.
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles between clones sharing one path.
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    /// Load the full map. A missing file reads as empty.
    fn read_all(&self) -> Result<HashMap<String, String>, CoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(HashMap::new()),
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| CoreError::Deserialization(format!("Corrupted store file: {e}"))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, map: &HashMap<String, String>) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(map)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize store: {e}")))?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let _guard = self.lock.lock().expect("store lock poisoned");
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let _guard = self.lock.lock().expect("store lock poisoned");
        let mut map = self.read_all()?;
        map.insert(key.to_string(), value.to_string());
        self.write_all(&map)
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        let _guard = self.lock.lock().expect("store lock poisoned");
        let mut map = self.read_all()?;
        if map.remove(key).is_some() {
            self.write_all(&map)?;
        }
        Ok(())
    }
}

// ── In-memory store ─────────────────────────────────────────────────

/// A `KeyValueStore` held entirely in memory.
///
/// Used by tests and by embeddings where the host supplies its own
/// persistence (e.g., a WASM shell bridging to browser localStorage).
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self
            .values
            .lock()
            .expect("store lock poisoned")
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.values
            .lock()
            .expect("store lock poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        self.values
            .lock()
            .expect("store lock poisoned")
            .remove(key);
        Ok(())
    }
}
