//! TTL-backed persistence for derived listings.
//!
//! Scanning the models tree and reading the full models table are both cheap
//! but noisy; listings are cached per kind as versioned JSON files and served
//! until they age out. A missing, corrupt, or outdated entry is a cache miss,
//! never an error.

use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const CACHE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    LocalModels,
    DatabaseModels,
}

impl CacheKind {
    fn file_name(self) -> &'static str {
        match self {
            CacheKind::LocalModels => "local_models.json",
            CacheKind::DatabaseModels => "database_models.json",
        }
    }
}

#[derive(Deserialize)]
struct CacheEntry<T> {
    version: u32,
    last_updated: DateTime<Utc>,
    data: Vec<T>,
}

#[derive(Serialize)]
struct CacheEntryRef<'a, T> {
    version: u32,
    last_updated: DateTime<Utc>,
    data: &'a [T],
}

pub struct CacheStore {
    dir: PathBuf,
    ttl: Duration,
}

impl CacheStore {
    pub fn new(dir: PathBuf, ttl_secs: u64) -> Self {
        Self {
            dir,
            ttl: Duration::seconds(ttl_secs as i64),
        }
    }

    /// Return the cached records for `kind`, or `None` when the entry is
    /// missing, unreadable, from another schema version, or at least TTL old.
    pub fn get<T: DeserializeOwned>(&self, kind: CacheKind) -> Option<Vec<T>> {
        let content = fs::read_to_string(self.dir.join(kind.file_name())).ok()?;
        let entry: CacheEntry<T> = serde_json::from_str(&content).ok()?;

        if entry.version != CACHE_SCHEMA_VERSION {
            return None;
        }
        if Utc::now() - entry.last_updated >= self.ttl {
            return None;
        }

        Some(entry.data)
    }

    /// Overwrite the entry for `kind` with the given records, stamped now.
    pub fn put<T: Serialize>(&self, kind: CacheKind, records: &[T]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let entry = CacheEntryRef {
            version: CACHE_SCHEMA_VERSION,
            last_updated: Utc::now(),
            data: records,
        };
        let content = serde_json::to_string_pretty(&entry)?;
        fs::write(self.dir.join(kind.file_name()), content)?;
        Ok(())
    }
}
