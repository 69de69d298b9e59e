//! Point-in-time copies of the live database, kept in a bounded rotating
//! list. Creation always goes through the store's backup mechanism so a
//! snapshot is consistent even if an external writer is active.

use crate::db::ModelDatabase;
use crate::error::{ModelsError, Result};
use crate::model::Snapshot;
use chrono::Local;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const SNAPSHOTS_FILENAME: &str = "snapshots.json";
const LIST_SCHEMA_VERSION: u32 = 1;

const ADJECTIVES: [&str; 20] = [
    "happy", "sunny", "clever", "brave", "calm", "kind", "wise", "proud", "strong", "neat",
    "soft", "warm", "bright", "cool", "gentle", "sharp", "fresh", "sweet", "wild", "bold",
];

const NOUNS: [&str; 20] = [
    "apple", "river", "mountain", "forest", "ocean", "star", "moon", "sun", "cloud", "tree",
    "flower", "bird", "tiger", "lion", "wolf", "bear", "fish", "deer", "fox", "owl",
];

/// Two dictionary words; combined with the timestamp this avoids collisions
/// without needing a counter.
fn random_name() -> String {
    let mut rng = rand::thread_rng();
    let adjective = ADJECTIVES[rng.gen_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.gen_range(0..NOUNS.len())];
    format!("{adjective}_{noun}")
}

#[derive(Serialize, Deserialize)]
struct SnapshotList {
    version: u32,
    snapshots: Vec<Snapshot>,
}

/// Result of a successful `create`: the new snapshot plus whatever rotation
/// evicted to stay within the configured maximum.
#[derive(Debug)]
pub struct CreateOutcome {
    pub snapshot: Snapshot,
    pub evicted: Vec<Snapshot>,
}

#[derive(Debug)]
pub enum RestoreOutcome {
    /// The live database now matches the snapshot.
    Restored,
    /// Overwriting failed but the previous database was put back intact.
    RolledBack(std::io::Error),
}

#[derive(Debug, PartialEq)]
pub enum DeleteStatus {
    Deleted,
    FileMissing,
    NotFound,
}

pub struct SnapshotManager {
    snapshots_dir: PathBuf,
    database_path: PathBuf,
    max_snapshots: usize,
}

impl SnapshotManager {
    pub fn new(snapshots_dir: PathBuf, database_path: PathBuf, max_snapshots: usize) -> Self {
        Self {
            snapshots_dir,
            database_path,
            max_snapshots,
        }
    }

    fn list_path(&self) -> PathBuf {
        self.snapshots_dir.join(SNAPSHOTS_FILENAME)
    }

    /// The persisted snapshot list, insertion-ordered (oldest first).
    /// A missing or corrupt list file degrades to an empty list.
    pub fn list(&self) -> Vec<Snapshot> {
        let content = match fs::read_to_string(self.list_path()) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str::<SnapshotList>(&content) {
            Ok(list) if list.version == LIST_SCHEMA_VERSION => list.snapshots,
            _ => Vec::new(),
        }
    }

    fn save_list(&self, snapshots: &[Snapshot]) -> Result<()> {
        let list = SnapshotList {
            version: LIST_SCHEMA_VERSION,
            snapshots: snapshots.to_vec(),
        };
        let content = serde_json::to_string_pretty(&list)?;
        fs::write(self.list_path(), content)?;
        Ok(())
    }

    /// Create a snapshot of the live database and rotate the list.
    ///
    /// The write-permission check happens before anything is mutated; a
    /// failure there aborts with no state change. Rotation is strict FIFO:
    /// whenever the list would exceed the maximum, index 0 is evicted and
    /// its backing file removed (best effort).
    pub fn create<D: ModelDatabase>(&self, db: &D) -> Result<CreateOutcome> {
        fs::create_dir_all(&self.snapshots_dir)?;
        let meta = fs::metadata(&self.snapshots_dir)?;
        if meta.permissions().readonly() {
            return Err(ModelsError::Snapshot(
                "no write permission for the snapshots directory".to_string(),
            ));
        }

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let stamp = timestamp.replace(':', "-").replace(' ', "_");
        // re-roll on the off chance two creations in the same second drew
        // the same words
        let (name, path) = loop {
            let name = format!("{}_{}.db", random_name(), stamp);
            let path = self.snapshots_dir.join(&name);
            if !path.exists() {
                break (name, path);
            }
        };

        db.backup_to(&path)?;

        let mut snapshots = self.list();
        snapshots.push(Snapshot {
            name,
            timestamp,
            path,
        });

        let mut evicted = Vec::new();
        while snapshots.len() > self.max_snapshots {
            let oldest = snapshots.remove(0);
            let _ = fs::remove_file(&oldest.path);
            evicted.push(oldest);
        }

        self.save_list(&snapshots)?;

        // the newest entry is always last
        let snapshot = snapshots.last().cloned().ok_or_else(|| {
            ModelsError::Snapshot("snapshot list empty after create".to_string())
        })?;

        Ok(CreateOutcome { snapshot, evicted })
    }

    /// Remove the named snapshots from the list and delete their files.
    /// A missing backing file or unknown name is reported per item; the
    /// list entry goes away regardless.
    pub fn delete(&self, names: &[String]) -> Result<Vec<(String, DeleteStatus)>> {
        let mut snapshots = self.list();
        let mut reports = Vec::with_capacity(names.len());

        for name in names {
            let Some(index) = snapshots.iter().position(|s| &s.name == name) else {
                reports.push((name.clone(), DeleteStatus::NotFound));
                continue;
            };

            let snapshot = snapshots.remove(index);
            let status = match fs::remove_file(&snapshot.path) {
                Ok(()) => DeleteStatus::Deleted,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => DeleteStatus::FileMissing,
                Err(e) => return Err(e.into()),
            };
            reports.push((name.clone(), status));
        }

        self.save_list(&snapshots)?;
        Ok(reports)
    }

    /// Overwrite the live database with the named snapshot.
    ///
    /// The current database is first copied aside; if overwriting fails the
    /// copy is put back. Only a failure of that rollback leaves the backup
    /// file in place, as the last resort for manual recovery.
    pub fn restore(&self, name: &str) -> Result<RestoreOutcome> {
        let snapshots = self.list();
        let snapshot = snapshots
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ModelsError::Snapshot(format!("snapshot '{name}' not found")))?;

        if !snapshot.path.exists() {
            return Err(ModelsError::Snapshot(format!(
                "snapshot file '{}' not found on disk",
                snapshot.path.display()
            )));
        }

        let backup_path = temp_backup_path(&self.database_path);
        fs::copy(&self.database_path, &backup_path)?;

        match fs::copy(&snapshot.path, &self.database_path) {
            Ok(_) => {
                let _ = fs::remove_file(&backup_path);
                Ok(RestoreOutcome::Restored)
            }
            Err(overwrite_err) => match fs::copy(&backup_path, &self.database_path) {
                Ok(_) => {
                    let _ = fs::remove_file(&backup_path);
                    Ok(RestoreOutcome::RolledBack(overwrite_err))
                }
                Err(rollback_err) => Err(ModelsError::RestoreUnrecoverable(format!(
                    "restore failed ({overwrite_err}), rollback failed ({rollback_err}); \
                     recover the database manually from '{}'",
                    backup_path.display()
                ))),
            },
        }
    }
}

fn temp_backup_path(database_path: &Path) -> PathBuf {
    let file_name = database_path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| "invokeai.db".to_string());
    database_path.with_file_name(format!("{file_name}.backup"))
}
