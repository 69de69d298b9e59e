use crate::cache::{CacheKind, CacheStore};
use crate::commands::{helpers, CmdMessage, CmdResult};
use crate::db::ModelDatabase;
use crate::error::Result;
use crate::model::SyncAction;
use crate::reconcile;
use crate::snapshot::SnapshotManager;
use std::path::Path;

/// Bring the database in line with the disk.
///
/// A dry run computes and returns exactly the plan a real run would apply,
/// with zero mutation. A real run creates a snapshot first so a rollback
/// point always exists, applies the plan transactionally, then writes the
/// post-sync rows through the cache. If the apply fails the snapshot stays.
pub fn run<D: ModelDatabase>(
    db: &mut D,
    cache: &CacheStore,
    snapshots: &SnapshotManager,
    models_dir: &Path,
    formats: &[String],
    dry_run: bool,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let local = helpers::load_local(cache, models_dir, false, &mut result)?;
    let db_records = helpers::load_database(db, cache, false, &mut result)?;

    let missing = reconcile::missing_on_disk(&local, &db_records, formats);
    let plan = reconcile::build_plan(&missing, &local);

    if plan.is_empty() {
        result.add_message(CmdMessage::info(
            "Database and local files are in sync; nothing to do.",
        ));
        return Ok(result.with_plan(plan));
    }

    if dry_run {
        result.add_message(CmdMessage::info(format!(
            "Dry run: {} action(s) planned, nothing applied.",
            plan.len()
        )));
        return Ok(result.with_missing(missing).with_plan(plan));
    }

    let outcome = snapshots.create(db)?;
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

    db.apply_plan(&plan)?;

    for action in &plan.actions {
        match action {
            SyncAction::Relocate { name, new_path } => {
                result.add_message(CmdMessage::success(format!(
                    "Updated path for '{name}' to {new_path}"
                )));
            }
            SyncAction::Delete { name } => {
                result.add_message(CmdMessage::success(format!(
                    "Removed stale database row '{name}'"
                )));
            }
        }
    }

    // keep the cached listing in step with what was just applied
    let fresh = db.fetch_all()?;
    if let Err(e) = cache.put(CacheKind::DatabaseModels, &fresh) {
        result.add_message(CmdMessage::warning(format!(
            "Could not refresh database models cache: {e}"
        )));
    }

    Ok(result.with_missing(missing).with_plan(plan))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::helpers::test_support::*;
    use crate::db::memory::InMemoryModelStore;
    use tempfile::tempdir;

    fn manager(dir: &Path) -> SnapshotManager {
        SnapshotManager::new(dir.join("snapshots"), dir.join("invokeai.db"), 5)
    }

    fn empty_models_dir(dir: &Path) -> std::path::PathBuf {
        let models_dir = dir.join("models");
        std::fs::create_dir_all(&models_dir).unwrap();
        models_dir
    }

    #[test]
    fn dry_run_never_mutates_and_matches_the_real_plan() {
        let dir = tempdir().unwrap();
        let models_dir = empty_models_dir(dir.path());
        let mut store = InMemoryModelStore::with_rows(vec![db_row("ghost", "lora", "path")]);
        let snapshots = manager(dir.path());

        let preview = run(
            &mut store,
            &cold_cache(dir.path()),
            &snapshots,
            &models_dir,
            &formats(),
            true,
        )
        .unwrap();

        assert_eq!(store.rows().len(), 1);
        assert!(snapshots.list().is_empty());

        let applied = run(
            &mut store,
            &cold_cache(dir.path()),
            &snapshots,
            &models_dir,
            &formats(),
            false,
        )
        .unwrap();

        assert_eq!(preview.plan, applied.plan);
        assert!(store.rows().is_empty());
    }

    #[test]
    fn real_run_snapshots_before_applying() {
        let dir = tempdir().unwrap();
        let models_dir = empty_models_dir(dir.path());
        let mut store = InMemoryModelStore::with_rows(vec![db_row("ghost", "lora", "path")]);
        let snapshots = manager(dir.path());

        run(
            &mut store,
            &cold_cache(dir.path()),
            &snapshots,
            &models_dir,
            &formats(),
            false,
        )
        .unwrap();

        assert_eq!(snapshots.list().len(), 1);
        assert!(store.rows().is_empty());
    }

    #[test]
    fn failed_apply_keeps_rows_and_snapshot() {
        let dir = tempdir().unwrap();
        let models_dir = empty_models_dir(dir.path());
        let mut store = InMemoryModelStore::with_rows(vec![
            db_row("ghost-a", "lora", "path"),
            db_row("ghost-b", "lora", "path"),
        ])
        .fail_after(1);
        let snapshots = manager(dir.path());

        let err = run(
            &mut store,
            &cold_cache(dir.path()),
            &snapshots,
            &models_dir,
            &formats(),
            false,
        );
        assert!(err.is_err());

        // transaction rolled back, but the pre-sync snapshot remains
        assert_eq!(store.rows().len(), 2);
        assert_eq!(snapshots.list().len(), 1);
    }

    #[test]
    fn in_sync_database_is_left_alone() {
        let dir = tempdir().unwrap();
        let models_dir = empty_models_dir(dir.path());
        let mut store = InMemoryModelStore::new();
        let snapshots = manager(dir.path());

        let result = run(
            &mut store,
            &cold_cache(dir.path()),
            &snapshots,
            &models_dir,
            &formats(),
            false,
        )
        .unwrap();

        assert!(result.plan.unwrap().is_empty());
        assert!(snapshots.list().is_empty());
    }

    #[test]
    fn committed_delete_disappears_from_the_next_comparison() {
        let dir = tempdir().unwrap();
        let models_dir = empty_models_dir(dir.path());
        let mut store = InMemoryModelStore::with_rows(vec![db_row("C", "checkpoint", "path")]);
        let snapshots = manager(dir.path());

        run(
            &mut store,
            &cold_cache(dir.path()),
            &snapshots,
            &models_dir,
            &formats(),
            false,
        )
        .unwrap();

        let again = crate::commands::compare::run(
            &store,
            &cold_cache(dir.path()),
            &models_dir,
            &formats(),
            false,
        )
        .unwrap();
        assert!(again.missing.is_empty());
    }
}
