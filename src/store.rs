use std::fs;
use std::path::{Path, PathBuf};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::model::ShortcutRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed shortcuts file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize, Default)]
struct Document {
    #[serde(default)]
    shortcuts: Vec<Value>,
}

/// Strict read. A missing file is an empty list, everything else is an error.
pub fn read_records(path: &Path) -> Result<Vec<ShortcutRecord>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let doc: Document = serde_json::from_str(&content).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let records = doc
        .shortcuts
        .into_iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            if !entry.is_object() {
                warn!("Skipping shortcut #{} in {:?}: not an object", i, path);
                return None;
            }
            match serde_json::from_value(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping shortcut #{} in {:?}: {}", i, path, e);
                    None
                }
            }
        })
        .collect();
    Ok(records)
}

/// Rewrites the whole document. serde_json keeps non-ASCII text as-is.
pub fn write_records(path: &Path, records: &[ShortcutRecord]) -> Result<(), StoreError> {
    let io_err = |source: std::io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    #[derive(Serialize)]
    struct DocumentRef<'a> {
        shortcuts: &'a [ShortcutRecord],
    }

    let content = serde_json::to_string_pretty(&DocumentRef { shortcuts: records })
        .map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    fs::write(path, content).map_err(io_err)?;
    Ok(())
}

/// The in-memory shortcut list and the file it came from.
///
/// There is no locking between the plugin and editor processes: whichever
/// saves last wins.
#[derive(Debug, Clone)]
pub struct ShortcutStore {
    path: PathBuf,
    records: Vec<ShortcutRecord>,
}

impl ShortcutStore {
    /// Loads the list, degrading to an empty one on any failure.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = match read_records(&path) {
            Ok(records) => records,
            Err(e) => {
                error!("Error loading shortcuts: {}", e);
                Vec::new()
            }
        };
        debug!("Loaded {} shortcuts from {:?}", records.len(), path);
        Self { path, records }
    }

    /// Strict counterpart of `open` for callers that are about to save:
    /// an unreadable file is an error instead of an empty list, so it is
    /// never overwritten. An absent file still reads as empty.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = read_records(&path)?;
        debug!("Loaded {} shortcuts from {:?}", records.len(), path);
        Ok(Self { path, records })
    }

    /// `load`, writing an empty document when the file is absent so the user
    /// has something to find on disk.
    pub fn load_or_create(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let existed = path.exists();
        let store = Self::load(path)?;
        if !existed {
            info!("Creating empty shortcuts file at {:?}", store.path);
            store.save()?;
        }
        Ok(store)
    }

    #[cfg(test)]
    pub fn with_records(path: impl Into<PathBuf>, records: Vec<ShortcutRecord>) -> Self {
        Self {
            path: path.into(),
            records,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
    }

    pub fn records(&self) -> &[ShortcutRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut Vec<ShortcutRecord> {
        &mut self.records
    }

    pub fn find(&self, keyword: &str) -> Option<&ShortcutRecord> {
        self.records.iter().find(|r| r.keyword == keyword)
    }

    pub fn save(&self) -> Result<(), StoreError> {
        write_records(&self.path, &self.records)?;
        debug!("Saved {} shortcuts to {:?}", self.records.len(), self.path);
        Ok(())
    }

    /// Removes every record with this keyword and persists. Returns whether
    /// anything was removed; an unknown keyword leaves the file untouched.
    pub fn delete(&mut self, keyword: &str) -> Result<bool, StoreError> {
        let before = self.records.len();
        self.records.retain(|r| r.keyword != keyword);
        if self.records.len() == before {
            debug!("No shortcut named '{}' to delete", keyword);
            return Ok(false);
        }
        self.save()?;
        info!("Deleted shortcut '{}'", keyword);
        Ok(true)
    }
}
