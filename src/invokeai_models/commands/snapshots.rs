use crate::commands::{CmdMessage, CmdResult};
use crate::db::ModelDatabase;
use crate::error::Result;
use crate::snapshot::{DeleteStatus, RestoreOutcome, SnapshotManager};

pub fn create<D: ModelDatabase>(db: &D, manager: &SnapshotManager) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    let outcome = manager.create(db)?;
    result.add_message(CmdMessage::success(format!(
        "Created snapshot: {}",
        outcome.snapshot.name
    )));
    for evicted in &outcome.evicted {
        result.add_message(CmdMessage::info(format!(
            "Removed oldest snapshot: {}",
            evicted.name
        )));
    }

    Ok(result)
}

pub fn list(manager: &SnapshotManager) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    let snapshots = manager.list();
    if snapshots.is_empty() {
        result.add_message(CmdMessage::info("No snapshots found."));
    }

    Ok(result.with_snapshots(snapshots))
}

pub fn delete(manager: &SnapshotManager, names: &[String]) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    if manager.list().is_empty() {
        result.add_message(CmdMessage::info("No snapshots found to delete."));
        return Ok(result);
    }

    for (name, status) in manager.delete(names)? {
        let message = match status {
            DeleteStatus::Deleted => CmdMessage::success(format!("Deleted snapshot '{name}'.")),
            DeleteStatus::FileMissing => CmdMessage::warning(format!(
                "Snapshot '{name}' removed from the list, but its file was already gone."
            )),
            DeleteStatus::NotFound => {
                CmdMessage::warning(format!("No snapshot named '{name}'."))
            }
        };
        result.add_message(message);
    }

    Ok(result)
}

pub fn restore(manager: &SnapshotManager, name: &str) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    match manager.restore(name)? {
        RestoreOutcome::Restored => {
            result.add_message(CmdMessage::success(format!(
                "Snapshot '{name}' successfully restored."
            )));
        }
        RestoreOutcome::RolledBack(err) => {
            result.add_message(CmdMessage::error(format!("Restoring '{name}' failed: {err}")));
            result.add_message(CmdMessage::warning(
                "The original database has been put back unchanged.",
            ));
        }
    }

    Ok(result)
}
