//! Storage backends for the persisted document.
//!
//! A backend is a plain synchronous key/value store of strings; the JSON
//! document layered on top lives in [`PersistentStore`].

mod persistent;

pub use persistent::*;

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Synchronous string key/value storage.
pub trait Storage: Send + Sync {
    /// Read the value under `key`, `None` if it was never written.
    fn read(&self, key: &str) -> io::Result<Option<String>>;

    /// Replace the value under `key` in a single step.
    fn write(&mut self, key: &str, value: &str) -> io::Result<()>;
}

/// Process-local storage; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open the data directory, creating it if needed.
    pub fn open(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> io::Result<()> {
        let target = self.path_for(key);
        let tmp = self.dir.join(format!("{}.json.tmp", key));

        // Readers only ever see the old or the new file, never a partial one
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_storage_read_write() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.read("gdjData").unwrap(), None);

        storage.write("gdjData", "{}").unwrap();
        storage.write("gdjData", "{\"settings\":{}}").unwrap();
        assert_eq!(
            storage.read("gdjData").unwrap().as_deref(),
            Some("{\"settings\":{}}")
        );
    }

    #[test]
    fn test_file_storage_missing_key() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::open(temp_dir.path()).unwrap();
        assert_eq!(storage.read("gdjData").unwrap(), None);
    }

    #[test]
    fn test_file_storage_replaces_whole_value() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = FileStorage::open(&temp_dir.path().join("nested")).unwrap();

        storage.write("gdjData", "first value, rather long").unwrap();
        storage.write("gdjData", "second").unwrap();

        assert_eq!(storage.read("gdjData").unwrap().as_deref(), Some("second"));
        assert!(!temp_dir.path().join("nested/gdjData.json.tmp").exists());
    }
}
