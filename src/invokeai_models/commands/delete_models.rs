use crate::cache::{CacheKind, CacheStore};
use crate::commands::{CmdMessage, CmdResult};
use crate::db::ModelDatabase;
use crate::error::Result;
use crate::model::{SyncAction, SyncPlan};
use std::collections::HashSet;

/// Delete database rows by name, independent of reconciliation.
///
/// Unknown names are per-item warnings, not errors. This flow deliberately
/// takes no snapshot; the dry run is its safeguard.
pub fn run<D: ModelDatabase>(
    db: &mut D,
    cache: &CacheStore,
    names: &[String],
    dry_run: bool,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    let rows = db.fetch_all()?;
    let known: HashSet<&str> = rows.iter().map(|r| r.name.as_str()).collect();

    let mut actions = Vec::new();
    for name in names {
        if known.contains(name.as_str()) {
            actions.push(SyncAction::Delete { name: name.clone() });
        } else {
            result.add_message(CmdMessage::warning(format!(
                "No database row named '{name}'."
            )));
        }
    }

    let plan = SyncPlan { actions };
    if plan.is_empty() {
        result.add_message(CmdMessage::info("Nothing to delete."));
        return Ok(result.with_plan(plan));
    }

    if dry_run {
        result.add_message(CmdMessage::info(format!(
            "Dry run: would delete {} row(s), nothing applied.",
            plan.len()
        )));
        return Ok(result.with_plan(plan));
    }

    db.apply_plan(&plan)?;
    for action in &plan.actions {
        result.add_message(CmdMessage::success(format!(
            "Deleted database row '{}'",
            action.name()
        )));
    }

    let fresh = db.fetch_all()?;
    if let Err(e) = cache.put(CacheKind::DatabaseModels, &fresh) {
        result.add_message(CmdMessage::warning(format!(
            "Could not refresh database models cache: {e}"
        )));
    }

    Ok(result.with_plan(plan))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::helpers::test_support::*;
    use crate::commands::MessageLevel;
    use crate::db::memory::InMemoryModelStore;
    use tempfile::tempdir;

    #[test]
    fn dry_run_previews_without_deleting() {
        let dir = tempdir().unwrap();
        let mut store = InMemoryModelStore::with_rows(vec![db_row("a", "lora", "path")]);

        let result = run(
            &mut store,
            &cache(dir.path()),
            &["a".to_string()],
            true,
        )
        .unwrap();

        assert_eq!(result.plan.unwrap().len(), 1);
        assert_eq!(store.rows().len(), 1);
    }

    #[test]
    fn deletes_named_rows() {
        let dir = tempdir().unwrap();
        let mut store = InMemoryModelStore::with_rows(vec![
            db_row("a", "lora", "path"),
            db_row("b", "lora", "path"),
        ]);

        run(&mut store, &cache(dir.path()), &["a".to_string()], false).unwrap();

        assert_eq!(store.rows().len(), 1);
        assert_eq!(store.rows()[0].name, "b");
    }

    #[test]
    fn unknown_names_warn_and_are_skipped() {
        let dir = tempdir().unwrap();
        let mut store = InMemoryModelStore::with_rows(vec![db_row("a", "lora", "path")]);

        let result = run(
            &mut store,
            &cache(dir.path()),
            &["missing".to_string(), "a".to_string()],
            false,
        )
        .unwrap();

        assert!(result
            .messages
            .iter()
            .any(|m| matches!(m.level, MessageLevel::Warning)));
        assert!(store.rows().is_empty());
    }

    #[test]
    fn all_unknown_names_deletes_nothing() {
        let dir = tempdir().unwrap();
        let mut store = InMemoryModelStore::with_rows(vec![db_row("a", "lora", "path")]);

        let result = run(
            &mut store,
            &cache(dir.path()),
            &["missing".to_string()],
            false,
        )
        .unwrap();

        assert!(result.plan.unwrap().is_empty());
        assert_eq!(store.rows().len(), 1);
    }
}
