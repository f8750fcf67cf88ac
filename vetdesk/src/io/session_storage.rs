//! Key/value storage backing the persisted session.
//!
//! The file backend keeps one file per key under `<state_dir>/session/`.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::io::config::write_atomic;

/// Abstraction over where session keys live.
pub trait SessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    /// Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Stores each key as a file named after it.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    dir: PathBuf,
}

impl FileSessionStorage {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            bail!("invalid session key {:?}", key);
        }
        Ok(self.dir.join(key))
    }
}

impl SessionStorage for FileSessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("read {}", path.display())),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        debug!(path = %path.display(), "writing session key");
        write_atomic(&path, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("remove {}", path.display())),
        }
    }
}

/// In-process storage; nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStorage {
    entries: BTreeMap<String, String>,
}

impl MemorySessionStorage {
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_storage_set_get_remove() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut storage = FileSessionStorage::new(&temp.path().join("session"));
        assert_eq!(storage.get("token").expect("get"), None);

        storage.set("token", "abc").expect("set");
        assert_eq!(storage.get("token").expect("get"), Some("abc".to_string()));
        assert!(temp.path().join("session/token").is_file());

        storage.remove("token").expect("remove");
        storage.remove("token").expect("remove missing");
        assert_eq!(storage.get("token").expect("get"), None);
    }

    #[test]
    fn file_storage_rejects_path_like_keys() {
        let temp = tempfile::tempdir().expect("tempdir");
        let storage = FileSessionStorage::new(temp.path());
        assert!(storage.get("../config.toml").is_err());
        assert!(storage.get("").is_err());
    }
}
