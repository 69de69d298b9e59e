use crate::cache::CacheStore;
use crate::commands::{helpers, CmdMessage, CmdResult};
use crate::db::ModelDatabase;
use crate::error::Result;
use crate::reconcile;
use std::path::Path;

/// Reconciliation preview: which store rows have no file on disk, and what
/// a sync would do about each. Never mutates anything.
pub fn run<D: ModelDatabase>(
    db: &D,
    cache: &CacheStore,
    models_dir: &Path,
    formats: &[String],
    refresh: bool,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let local = helpers::load_local(cache, models_dir, refresh, &mut result)?;
    let db_records = helpers::load_database(db, cache, refresh, &mut result)?;

    let missing = reconcile::missing_on_disk(&local, &db_records, formats);
    let plan = reconcile::build_plan(&missing, &local);

    if missing.is_empty() {
        result.add_message(CmdMessage::info(
            "All relevant database models are present on disk.",
        ));
    }

    Ok(result.with_missing(missing).with_plan(plan))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::helpers::test_support::*;
    use crate::db::memory::InMemoryModelStore;
    use crate::model::SyncAction;
    use tempfile::tempdir;

    #[test]
    fn previews_missing_rows_without_mutating() {
        let dir = tempdir().unwrap();
        let models_dir = dir.path().join("models");
        std::fs::create_dir_all(&models_dir).unwrap();
        let store = InMemoryModelStore::with_rows(vec![
            db_row("ghost", "checkpoint", "path"),
            db_row("remote", "checkpoint", "url"),
        ]);

        let result = run(
            &store,
            &cold_cache(dir.path()),
            &models_dir,
            &formats(),
            false,
        )
        .unwrap();

        let names: Vec<&str> = result.missing.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["ghost"]);

        let plan = result.plan.unwrap();
        assert_eq!(
            plan.actions,
            vec![SyncAction::Delete {
                name: "ghost".to_string()
            }]
        );

        assert_eq!(store.rows().len(), 2);
    }

    #[test]
    fn in_sync_state_reports_a_message() {
        let dir = tempdir().unwrap();
        let models_dir = dir.path().join("models");
        std::fs::create_dir_all(&models_dir).unwrap();
        let store = InMemoryModelStore::new();

        let result = run(
            &store,
            &cold_cache(dir.path()),
            &models_dir,
            &formats(),
            false,
        )
        .unwrap();

        assert!(result.missing.is_empty());
        assert!(result.plan.unwrap().is_empty());
        assert_eq!(result.messages.len(), 1);
    }
}
