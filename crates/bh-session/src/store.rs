//! Key-value persistence backends.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::{SessionError, SessionResult};

/// Minimal string key-value storage, the shape of browser local storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> SessionResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> SessionResult<()>;
    fn remove(&self, key: &str) -> SessionResult<()>;
}

/// One plain-text file per key under a state directory.
///
/// The directory is created on first write, so constructing a store never fails.
#[derive(Debug, Clone)]
pub struct FileStore {
    root_dir: PathBuf,
}

impl FileStore {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn key_path(&self, key: &str) -> SessionResult<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(SessionError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.root_dir.join(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> SessionResult<Option<String>> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> SessionResult<()> {
        let path = self.key_path(key)?;
        fs::create_dir_all(&self.root_dir)?;

        // Readers never observe a partially written value.
        let tmp_path = self.root_dir.join(format!(".{key}.tmp"));
        fs::write(&tmp_path, value)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> SessionResult<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> SessionResult<Option<String>> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> SessionResult<()> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> SessionResult<()> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.remove(key);
        Ok(())
    }
}
