//! Best-time records.
//!
//! One string-keyed entry per board shape, `bestTime_<cols>x<rows>`, holding
//! the fastest winning time in seconds as decimal text. Storage failures are
//! logged and read as "no record"; they never reach the game.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::StoreError;
use crate::game::GridSize;

const RECORDS_DIR_NAME: &str = "concentration";
const RECORDS_FILE_NAME: &str = "records.json";
const KEY_PREFIX: &str = "bestTime_";

/// Board-shape identifier used to namespace records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DifficultyKey {
    pub cols: u16,
    pub rows: u16,
}

impl DifficultyKey {
    pub fn new(cols: u16, rows: u16) -> Self {
        DifficultyKey { cols, rows }
    }

    pub fn storage_key(self) -> String {
        format!("{KEY_PREFIX}{self}")
    }
}

impl From<GridSize> for DifficultyKey {
    fn from(grid: GridSize) -> Self {
        DifficultyKey::new(grid.cols(), grid.rows())
    }
}

impl fmt::Display for DifficultyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}

/// String key-value persistence.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Flat JSON object of string values on disk. Every read goes to the file so
/// edits from another instance are picked up; writes replace the file
/// through a temporary sibling.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    /// `$XDG_CONFIG_HOME/concentration/records.json`, falling back to
    /// `$HOME/.config`.
    pub fn default_path() -> Option<PathBuf> {
        let base = match std::env::var_os("XDG_CONFIG_HOME") {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => PathBuf::from(std::env::var_os("HOME")?).join(".config"),
        };
        Some(base.join(RECORDS_DIR_NAME).join(RECORDS_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_str(&raw).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let body = serde_json::to_string_pretty(entries).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        // An unreadable file is replaced rather than blocking new records.
        let mut entries = self.read_all().unwrap_or_else(|err| {
            warn!(error = %err, "discarding unreadable records file");
            BTreeMap::new()
        });
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }
}

/// Best winning time per board shape.
#[derive(Debug, Clone)]
pub struct BestTimes<S> {
    store: S,
}

impl<S: KeyValueStore> BestTimes<S> {
    pub fn new(store: S) -> Self {
        BestTimes { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Stored best for `key`. Missing, unreadable and malformed records all
    /// read as `None`.
    pub fn load(&self, key: DifficultyKey) -> Option<u32> {
        match self.try_load(key) {
            Ok(best) => best,
            Err(err) => {
                warn!(%key, error = %err, "best time unavailable");
                None
            }
        }
    }

    fn try_load(&self, key: DifficultyKey) -> Result<Option<u32>, StoreError> {
        let storage_key = key.storage_key();
        let Some(raw) = self.store.get(&storage_key)? else {
            return Ok(None);
        };
        raw.trim()
            .parse()
            .map(Some)
            .map_err(|_| StoreError::InvalidValue {
                key: storage_key,
                value: raw,
            })
    }

    /// Persists `elapsed_seconds` when there is no record yet or it is
    /// strictly faster. Returns `true` exactly when storage changed.
    pub fn record_if_best(&mut self, key: DifficultyKey, elapsed_seconds: u32) -> bool {
        if let Some(best) = self.load(key)
            && elapsed_seconds >= best
        {
            return false;
        }
        match self
            .store
            .set(&key.storage_key(), &elapsed_seconds.to_string())
        {
            Ok(()) => {
                info!(%key, elapsed_seconds, "new best time");
                true
            }
            Err(err) => {
                warn!(%key, error = %err, "failed to save best time");
                false
            }
        }
    }
}
