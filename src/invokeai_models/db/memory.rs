use super::ModelDatabase;
use crate::error::{ModelsError, Result};
use crate::model::{DatabaseModelRecord, SyncAction, SyncPlan};
use std::fs::File;
use std::path::Path;

/// In-memory stand-in for the SQLite store, used by command tests.
///
/// `apply_plan` works on a scratch copy and only swaps it in when every
/// action succeeded, mirroring the transactional all-or-nothing behavior.
/// `fail_after(n)` injects a failure after n applied actions to exercise
/// rollback paths. `backup_to` writes the rows as JSON so snapshot logic
/// has a real file to rotate.
#[derive(Debug, Default)]
pub struct InMemoryModelStore {
    rows: Vec<DatabaseModelRecord>,
    fail_after: Option<usize>,
}

impl InMemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<DatabaseModelRecord>) -> Self {
        Self {
            rows,
            fail_after: None,
        }
    }

    pub fn fail_after(mut self, applied: usize) -> Self {
        self.fail_after = Some(applied);
        self
    }

    pub fn rows(&self) -> &[DatabaseModelRecord] {
        &self.rows
    }
}

impl ModelDatabase for InMemoryModelStore {
    fn fetch_all(&self) -> Result<Vec<DatabaseModelRecord>> {
        Ok(self.rows.clone())
    }

    fn apply_plan(&mut self, plan: &SyncPlan) -> Result<()> {
        let mut scratch = self.rows.clone();

        for (applied, action) in plan.actions.iter().enumerate() {
            if self.fail_after == Some(applied) {
                return Err(ModelsError::Store("injected store failure".to_string()));
            }

            match action {
                SyncAction::Relocate { name, new_path } => {
                    let row = scratch
                        .iter_mut()
                        .find(|r| &r.name == name)
                        .ok_or_else(|| {
                            ModelsError::Store(format!("no database row matched name '{name}'"))
                        })?;
                    row.path = new_path.clone();
                }
                SyncAction::Delete { name } => {
                    let index = scratch.iter().position(|r| &r.name == name).ok_or_else(
                        || ModelsError::Store(format!("no database row matched name '{name}'")),
                    )?;
                    scratch.remove(index);
                }
            }
        }

        self.rows = scratch;
        Ok(())
    }

    fn backup_to(&self, dest: &Path) -> Result<()> {
        let file = File::create(dest)?;
        serde_json::to_writer(file, &self.rows)?;
        Ok(())
    }
}
