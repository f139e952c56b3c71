//! Key/value storage for saved documents.
//!
//! `FileStorage` keeps one `<key>.json` file per key in a directory;
//! `MemoryStorage` is a map, used by tests and benches.

use std::collections::HashMap;
use std::error::Error;
use std::path::{Path, PathBuf};

pub trait Storage {
    /// Stored value for `key`, `None` if nothing was stored.
    ///
    /// # Errors
    /// Fails when the backing store cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, Box<dyn Error>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Fails when the backing store cannot be written.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), Box<dyn Error>>;

    /// Forget `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    /// Fails when the backing store cannot be written.
    fn remove_item(&mut self, key: &str) -> Result<(), Box<dyn Error>>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), Box<dyn Error>> {
        self.items.remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`. Keys are restricted to letters, digits, `-` and
    /// `_` so they cannot escape the storage directory.
    ///
    /// # Errors
    /// Fails for empty keys or keys with other characters.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, Box<dyn Error>> {
        let valid = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(format!("invalid storage key '{key}'").into());
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(format!("failed to read {}: {e}", path.display()).into()),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;
        // readers only ever see a complete file
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), Box<dyn Error>> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ron::test_dir;

    #[test]
    fn file_storage_round_trip() {
        let dir = test_dir::fresh("storage").join("nested");
        let mut storage = FileStorage::new(&dir);
        assert_eq!(storage.get_item("savedCastle").unwrap(), None);

        storage.set_item("savedCastle", "{\"a\":1}").unwrap();
        storage.set_item("savedCastle", "{\"a\":2}").unwrap();
        assert_eq!(storage.get_item("savedCastle").unwrap().as_deref(), Some("{\"a\":2}"));
        assert!(dir.join("savedCastle.json").is_file());
        assert!(!dir.join("savedCastle.json.tmp").exists());

        storage.remove_item("savedCastle").unwrap();
        storage.remove_item("savedCastle").unwrap();
        assert_eq!(storage.get_item("savedCastle").unwrap(), None);
    }

    #[test]
    fn file_storage_rejects_path_keys() {
        let mut storage = FileStorage::new(test_dir::fresh("storage-keys"));
        assert!(storage.set_item("../escape", "x").is_err());
        assert!(storage.get_item("").is_err());
        assert!(storage.path_for("slot_2-b").is_ok());
    }

    #[test]
    fn memory_storage_round_trip() {
        let mut storage = MemoryStorage::default();
        storage.set_item("k", "v").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v"));
        storage.remove_item("k").unwrap();
        assert_eq!(storage.get_item("k").unwrap(), None);
    }
}
