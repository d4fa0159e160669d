//! Whole-document record stores used by the stateful collaborators.
//!
//! Each ledger (post history, catalog, experiments, analytics) is a single
//! serde document loaded and saved wholesale. Services hold the store behind
//! an `Arc` and never touch the filesystem directly, so tests can swap in
//! [`MemoryStore`].

use std::fs;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Typed load/save over one persisted document.
pub trait RecordStore<T>: Send + Sync {
    fn load(&self) -> Result<T, StoreError>;
    fn save(&self, record: &T) -> Result<(), StoreError>;
}

/// Store failure; carries the backing path where one exists.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unable to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt record document {path}: {source}")]
    Format {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("record store lock poisoned")]
    Poisoned,
}

/// Mutex-guarded in-process store starting from `T::default()`.
#[derive(Debug, Default)]
pub struct MemoryStore<T> {
    record: Mutex<T>,
}

impl<T> MemoryStore<T> {
    pub fn new(record: T) -> Self {
        Self {
            record: Mutex::new(record),
        }
    }
}

impl<T> RecordStore<T> for MemoryStore<T>
where
    T: Clone + Send,
{
    fn load(&self) -> Result<T, StoreError> {
        let guard = self.record.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.clone())
    }

    fn save(&self, record: &T) -> Result<(), StoreError> {
        let mut guard = self.record.lock().map_err(|_| StoreError::Poisoned)?;
        *guard = record.clone();
        Ok(())
    }
}

/// JSON document on disk. A missing file loads as `T::default()`; saving
/// creates the parent directory and rewrites the whole file.
#[derive(Debug)]
pub struct JsonFileStore<T> {
    path: PathBuf,
    lock: Mutex<()>,
    _record: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn format_error(&self, source: serde_json::Error) -> StoreError {
        StoreError::Format {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl<T> RecordStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    fn load(&self) -> Result<T, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(T::default()),
            Err(error) => return Err(self.io_error(error)),
        };
        serde_json::from_reader(BufReader::new(file)).map_err(|error| self.format_error(error))
    }

    fn save(&self, record: &T) -> Result<(), StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|error| self.io_error(error))?;
        }

        let file = fs::File::create(&self.path).map_err(|error| self.io_error(error))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, record)
            .map_err(|error| self.format_error(error))?;
        writer.flush().map_err(|error| self.io_error(error))
    }
}
