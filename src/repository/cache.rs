// src/repository/cache.rs

//! Persistent cache of registry verification outcomes
//!
//! Maps a [`ContentKey`] of a manifest's identity fields to the name the
//! manifest resolved to. The normaliser loads the cache when it is built and
//! flushes it once verification is complete; nothing else touches it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::hash::ContentKey;

const CACHE_VERSION: u32 = 1;

/// Key-value store for verification outcomes
pub trait NameCache: Send {
    /// Read persisted entries. Called once before any lookup.
    fn load(&mut self) -> Result<()>;

    fn get(&self, key: &ContentKey) -> Option<String>;

    fn set(&mut self, key: ContentKey, name: String);

    /// Persist entries. Called once after verification.
    fn flush(&mut self) -> Result<()>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local cache; nothing survives the run
#[derive(Debug, Default, Clone)]
pub struct MemoryCache {
    entries: HashMap<ContentKey, String>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NameCache for MemoryCache {
    fn load(&mut self) -> Result<()> {
        Ok(())
    }

    fn get(&self, key: &ContentKey) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: ContentKey, name: String) {
        self.entries.insert(key, name);
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Serialize, Deserialize)]
struct CacheEnvelope {
    version: u32,
    names: BTreeMap<ContentKey, String>,
}

/// JSON file cache that survives across runs
#[derive(Debug)]
pub struct JsonFileCache {
    path: PathBuf,
    entries: BTreeMap<ContentKey, String>,
    dirty: bool,
}

impl JsonFileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
            dirty: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NameCache for JsonFileCache {
    /// A missing file is an empty cache. A corrupt or outdated file is
    /// logged and ignored; it is rewritten on the next flush.
    fn load(&mut self) -> Result<()> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No verification cache at {}", self.path.display());
                return Ok(());
            }
            Err(source) => {
                return Err(Error::CacheRead {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        match serde_json::from_slice::<CacheEnvelope>(&data) {
            Ok(envelope) if envelope.version == CACHE_VERSION => {
                debug!(
                    "Loaded {} cached verification(s) from {}",
                    envelope.names.len(),
                    self.path.display()
                );
                self.entries = envelope.names;
            }
            Ok(envelope) => {
                warn!(
                    "Ignoring verification cache {} with version {}",
                    self.path.display(),
                    envelope.version
                );
                self.dirty = true;
            }
            Err(e) => {
                warn!("Ignoring unreadable verification cache {}: {}", self.path.display(), e);
                self.dirty = true;
            }
        }
        Ok(())
    }

    fn get(&self, key: &ContentKey) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: ContentKey, name: String) {
        if self.entries.get(&key) != Some(&name) {
            self.entries.insert(key, name);
            self.dirty = true;
        }
    }

    /// Write atomically: temp file in the same directory, then rename
    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        let write_err = |source| Error::CacheWrite {
            path: self.path.clone(),
            source,
        };
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(write_err)?;

        let envelope = CacheEnvelope {
            version: CACHE_VERSION,
            names: self.entries.clone(),
        };
        let data = serde_json::to_vec_pretty(&envelope)
            .map_err(|e| write_err(std::io::Error::other(e)))?;

        let mut file = NamedTempFile::new_in(&dir).map_err(write_err)?;
        file.write_all(&data).map_err(write_err)?;
        file.persist(&self.path).map_err(|e| write_err(e.error))?;

        debug!(
            "Wrote {} verification(s) to {}",
            self.entries.len(),
            self.path.display()
        );
        self.dirty = false;
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
