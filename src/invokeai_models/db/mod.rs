//! Database access for the InvokeAI `models` table.
//!
//! The [`ModelDatabase`] trait keeps the command layer independent of the
//! concrete store:
//!
//! - [`sqlite::SqliteModelStore`]: the real InvokeAI database via rusqlite
//! - [`memory::InMemoryModelStore`]: test double with failure injection
//!
//! The table is treated as an external, fixed 15-column positional schema.
//! Reads validate the column count up front and fail fast on a mismatch
//! instead of silently mis-mapping fields.

use crate::error::Result;
use crate::model::{DatabaseModelRecord, SyncPlan};
use std::path::Path;

pub mod memory;
pub mod sqlite;

/// Documented column order of the `models` table. Rows are mapped by
/// position, never by name.
pub const MODEL_COLUMNS: [&str; 15] = [
    "key",
    "hash",
    "base",
    "type",
    "path",
    "format",
    "name",
    "description",
    "source",
    "source_type",
    "source_api_response",
    "cover_image",
    "metadata",
    "created_at",
    "updated_at",
];

pub trait ModelDatabase {
    /// Full-table read, one record per row.
    fn fetch_all(&self) -> Result<Vec<DatabaseModelRecord>>;

    /// Apply every action of the plan in a single transaction. Any failure
    /// (including an action matching no row) rolls the whole batch back.
    fn apply_plan(&mut self, plan: &SyncPlan) -> Result<()>;

    /// Consistent point-in-time copy of the store to `dest`, safe against
    /// concurrent external writers.
    fn backup_to(&self, dest: &Path) -> Result<()>;
}
