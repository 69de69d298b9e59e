use super::{ModelDatabase, MODEL_COLUMNS};
use crate::error::{ModelsError, Result};
use crate::model::{DatabaseModelRecord, RowMetadata, SyncAction, SyncPlan};
use rusqlite::backup::Backup;
use rusqlite::{params, Connection, OpenFlags, Row};
use std::path::Path;
use std::time::Duration;

pub struct SqliteModelStore {
    conn: Connection,
}

impl SqliteModelStore {
    /// Open the InvokeAI database read-write. The file must already exist;
    /// a missing database is a setup failure, not something to create.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)?;
        Ok(Self { conn })
    }

    fn record_from_row(row: &Row<'_>) -> rusqlite::Result<DatabaseModelRecord> {
        let metadata_raw: Option<String> = row.get(12)?;

        Ok(DatabaseModelRecord {
            key: row.get(0)?,
            hash: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            base: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            kind: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            path: row.get(4)?,
            format: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
            name: row.get(6)?,
            description: row.get(7)?,
            source: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
            source_type: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
            source_api_response: row.get(10)?,
            cover_image: row.get(11)?,
            metadata: RowMetadata::parse(metadata_raw.as_deref()),
            created_at: row.get::<_, Option<String>>(13)?.unwrap_or_default(),
            updated_at: row.get::<_, Option<String>>(14)?.unwrap_or_default(),
        })
    }
}

impl ModelDatabase for SqliteModelStore {
    fn fetch_all(&self) -> Result<Vec<DatabaseModelRecord>> {
        let mut stmt = self.conn.prepare("SELECT * FROM models")?;

        let found = stmt.column_count();
        if found != MODEL_COLUMNS.len() {
            return Err(ModelsError::SchemaMismatch {
                expected: MODEL_COLUMNS.len(),
                found,
            });
        }

        let rows = stmt.query_map([], Self::record_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Into::into)
    }

    fn apply_plan(&mut self, plan: &SyncPlan) -> Result<()> {
        let tx = self.conn.transaction()?;

        for action in &plan.actions {
            let affected = match action {
                SyncAction::Relocate { name, new_path } => tx.execute(
                    "UPDATE models SET path = ?1 WHERE name = ?2",
                    params![new_path, name],
                )?,
                SyncAction::Delete { name } => {
                    tx.execute("DELETE FROM models WHERE name = ?1", params![name])?
                }
            };
            // a plan action that matches nothing means the plan is stale;
            // dropping the transaction here rolls back everything applied
            if affected == 0 {
                return Err(ModelsError::Store(format!(
                    "no database row matched name '{}'",
                    action.name()
                )));
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn backup_to(&self, dest: &Path) -> Result<()> {
        let mut dst = Connection::open(dest)?;
        let backup = Backup::new(&self.conn, &mut dst)?;
        backup.run_to_completion(100, Duration::from_millis(100), None)?;
        Ok(())
    }
}
