use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A model weight file found on disk during a scan.
///
/// `name` (the filename without its extension) is the join key against
/// database rows. Uniqueness across subdirectories is assumed, not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub filename: String,
    pub name: String,
    pub file_path: PathBuf,
    pub relative_path: PathBuf,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The parsed state of the `metadata` JSON column.
///
/// A parse failure is recorded per row so a single bad blob never aborts
/// a full table read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RowMetadata {
    Absent,
    Parsed(serde_json::Value),
    Invalid,
}

impl RowMetadata {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None => RowMetadata::Absent,
            Some(s) if s.trim().is_empty() => RowMetadata::Absent,
            Some(s) => serde_json::from_str(s)
                .map(RowMetadata::Parsed)
                .unwrap_or(RowMetadata::Invalid),
        }
    }
}

/// One row of the InvokeAI `models` table, mapped from its fixed
/// 15-column positional shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseModelRecord {
    pub key: String,
    pub hash: String,
    pub base: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub path: String,
    pub format: String,
    pub name: String,
    pub description: Option<String>,
    pub source: String,
    pub source_type: String,
    pub source_api_response: Option<String>,
    pub cover_image: Option<String>,
    pub metadata: RowMetadata,
    pub created_at: String,
    pub updated_at: String,
}

/// A point-in-time copy of the live database, tracked in the rotating list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub name: String,
    pub timestamp: String,
    pub path: PathBuf,
}

/// One step of a sync plan.
///
/// Relocate fires when a matching file exists locally under the same name
/// (the store's path column is stale); Delete when the row has no on-disk
/// counterpart at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SyncAction {
    Relocate { name: String, new_path: String },
    Delete { name: String },
}

impl SyncAction {
    pub fn name(&self) -> &str {
        match self {
            SyncAction::Relocate { name, .. } => name,
            SyncAction::Delete { name } => name,
        }
    }
}

/// The actions derived from a reconciliation result, in name order.
/// Executed transactionally by the database store, or previewed as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncPlan {
    pub actions: Vec<SyncAction>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }
}
