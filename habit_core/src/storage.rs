//! JSON blob persistence keyed by string.
//!
//! The screens persist whole JSON documents under a handful of keys
//! (`habits`, `todos`, `last_reset`). [`FileBlobStore`] keeps one
//! `<key>.json` file per key. Writes go through a temp file and a rename, so
//! readers never observe a torn blob, and read-modify-write cycles hold an
//! exclusive lock on a `<key>.lock` sidecar. A blob that cannot be read or
//! parsed is logged and treated as absent; an unparseable one is first
//! copied to `<key>.json.corrupt` so the next save cannot destroy it.

use crate::{Error, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const HABITS_KEY: &str = "habits";
pub const TODOS_KEY: &str = "todos";
pub const LAST_RESET_KEY: &str = "last_reset";

/// Key/value store of JSON documents
pub trait BlobStore {
    /// Load the document under `key`; None if it is missing or unreadable
    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>>;

    /// Replace the document under `key`
    fn save_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()>;

    fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        Ok(self.load_json(key)?.unwrap_or_default())
    }

    /// Load a document, modify it, and save it back
    fn update<T, F, R>(&mut self, key: &str, f: F) -> Result<R>
    where
        T: DeserializeOwned + Serialize + Default,
        F: FnOnce(&mut T) -> Result<R>,
    {
        let mut value: T = self.load_or_default(key)?;
        let out = f(&mut value)?;
        self.save_json(key, &value)?;
        Ok(out)
    }
}

fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(Error::Storage(format!("invalid blob key {:?}", key)))
    }
}

/// Directory-backed blob store, one file per key
#[derive(Clone, Debug)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Take the exclusive writer lock for `key`, blocking until it is free.
    ///
    /// Hold the guard across a whole load-modify-save cycle. Creates the
    /// data directory if needed.
    pub fn lock(&self, key: &str) -> Result<BlobLock> {
        validate_key(key)?;
        std::fs::create_dir_all(&self.dir)?;

        let path = self.dir.join(format!("{}.lock", key));
        let file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;
        file.lock_exclusive()?;
        tracing::debug!("Locked {:?}", path);
        Ok(BlobLock { file })
    }

    /// Keep a copy of a blob that failed to parse
    fn preserve_corrupt(&self, path: &Path) {
        let mut backup = path.as_os_str().to_owned();
        backup.push(".corrupt");
        match std::fs::copy(path, &backup) {
            Ok(_) => tracing::warn!("Copied unreadable blob to {:?}", backup),
            Err(e) => tracing::warn!("Unable to back up {:?}: {}", path, e),
        }
    }
}

/// Exclusive writer lock on one key, released on drop
#[derive(Debug)]
pub struct BlobLock {
    file: File,
}

impl Drop for BlobLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

impl FileBlobStore {
    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl BlobStore for FileBlobStore {
    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            tracing::debug!("No blob for key {} at {:?}", key, path);
            return Ok(None);
        }

        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open blob {:?}: {}. Treating as empty.", path, e);
                return Ok(None);
            }
        };

        // Acquire shared lock for reading
        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock blob {:?}: {}. Treating as empty.", path, e);
            return Ok(None);
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!("Failed to read blob {:?}: {}. Treating as empty.", path, e);
            return Ok(None);
        }

        file.unlock()?;

        match serde_json::from_str::<T>(&contents) {
            Ok(value) => {
                tracing::debug!("Loaded blob {} from {:?}", key, path);
                Ok(Some(value))
            }
            Err(e) => {
                tracing::warn!("Failed to parse blob {:?}: {}. Treating as empty.", path, e);
                self.preserve_corrupt(&path);
                Ok(None)
            }
        }
    }

    /// Atomically writes the blob by writing a temp file in the same
    /// directory, syncing it, then renaming it over the original.
    fn save_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;

        let temp = NamedTempFile::new_in(&self.dir)?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(value)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;

        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved blob {} to {:?}", key, path);
        Ok(())
    }

    fn update<T, F, R>(&mut self, key: &str, f: F) -> Result<R>
    where
        T: DeserializeOwned + Serialize + Default,
        F: FnOnce(&mut T) -> Result<R>,
    {
        let _lock = self.lock(key)?;
        let mut value: T = self.load_or_default(key)?;
        let out = f(&mut value)?;
        self.save_json(key, &value)?;
        Ok(out)
    }
}

/// In-memory blob store
#[derive(Clone, Debug, Default)]
pub struct MemoryBlobStore {
    blobs: HashMap<String, serde_json::Value>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.blobs.contains_key(key)
    }

    /// Store raw JSON under `key`, bypassing typing
    pub fn insert_raw(&mut self, key: &str, value: serde_json::Value) {
        self.blobs.insert(key.to_string(), value);
    }
}

impl BlobStore for MemoryBlobStore {
    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        validate_key(key)?;
        let Some(value) = self.blobs.get(key) else {
            return Ok(None);
        };

        match serde_json::from_value::<T>(value.clone()) {
            Ok(parsed) => Ok(Some(parsed)),
            Err(e) => {
                tracing::warn!("Failed to parse blob {}: {}. Treating as empty.", key, e);
                Ok(None)
            }
        }
    }

    fn save_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        validate_key(key)?;
        self.blobs.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }
}
