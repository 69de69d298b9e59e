//! The reconciliation engine: a one-directional diff between database rows
//! and scanned files, and the sync plan derived from it.
//!
//! Only rows installed from a local path (`source_type == "path"`) with an
//! eligible `format` participate. Files present on disk but absent from the
//! database are intentionally not reported here.

use crate::model::{DatabaseModelRecord, ModelRecord, SyncAction, SyncPlan};
use std::collections::{HashMap, HashSet};

/// The relevance filter applied to database rows before any comparison.
pub fn is_relevant(record: &DatabaseModelRecord, formats: &[String]) -> bool {
    record.source_type == "path"
        && formats
            .iter()
            .any(|f| f.eq_ignore_ascii_case(&record.format))
}

/// Rows present in the store but with no matching file name on disk,
/// sorted by name ascending.
pub fn missing_on_disk(
    local: &[ModelRecord],
    db: &[DatabaseModelRecord],
    formats: &[String],
) -> Vec<DatabaseModelRecord> {
    let local_names: HashSet<&str> = local.iter().map(|m| m.name.as_str()).collect();

    let mut missing: Vec<DatabaseModelRecord> = db
        .iter()
        .filter(|r| is_relevant(r, formats))
        .filter(|r| !local_names.contains(r.name.as_str()))
        .cloned()
        .collect();

    missing.sort_by(|a, b| a.name.cmp(&b.name));
    missing
}

/// Derive the action for each missing row: a matching local name means the
/// file moved and the row's path should follow it; no match means the row
/// is stale and should go.
pub fn build_plan(missing: &[DatabaseModelRecord], local: &[ModelRecord]) -> SyncPlan {
    let by_name: HashMap<&str, &ModelRecord> =
        local.iter().map(|m| (m.name.as_str(), m)).collect();

    let actions = missing
        .iter()
        .map(|record| match by_name.get(record.name.as_str()) {
            Some(found) => SyncAction::Relocate {
                name: record.name.clone(),
                new_path: found.file_path.to_string_lossy().into_owned(),
            },
            None => SyncAction::Delete {
                name: record.name.clone(),
            },
        })
        .collect();

    SyncPlan { actions }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RowMetadata;
    use chrono::Utc;
    use std::path::PathBuf;

    fn local(name: &str) -> ModelRecord {
        let now = Utc::now();
        ModelRecord {
            filename: format!("{name}.safetensors"),
            name: name.to_string(),
            file_path: PathBuf::from(format!("/models/checkpoints/{name}.safetensors")),
            relative_path: PathBuf::from(format!("checkpoints/{name}.safetensors")),
            category: "checkpoint".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn row(name: &str, format: &str, source_type: &str) -> DatabaseModelRecord {
        DatabaseModelRecord {
            key: format!("key-{name}"),
            hash: String::new(),
            base: "sd-1".to_string(),
            kind: "main".to_string(),
            path: format!("/old/{name}.safetensors"),
            format: format.to_string(),
            name: name.to_string(),
            description: None,
            source: format!("/old/{name}.safetensors"),
            source_type: source_type.to_string(),
            source_api_response: None,
            cover_image: None,
            metadata: RowMetadata::Absent,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn formats() -> Vec<String> {
        vec!["lora".to_string(), "checkpoint".to_string()]
    }

    #[test]
    fn reports_only_relevant_rows_missing_from_disk() {
        // local {A, B}; store {A ckpt, C ckpt, D lora, E other} -> [C, D]
        let local_models = vec![local("A"), local("B")];
        let db = vec![
            row("A", "checkpoint", "path"),
            row("C", "checkpoint", "path"),
            row("D", "lora", "path"),
            row("E", "embedding_file", "path"),
        ];

        let missing = missing_on_disk(&local_models, &db, &formats());
        let names: Vec<&str> = missing.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["C", "D"]);
    }

    #[test]
    fn never_reports_a_name_present_locally() {
        let local_models = vec![local("A")];
        let db = vec![row("A", "checkpoint", "path")];
        assert!(missing_on_disk(&local_models, &db, &formats()).is_empty());
    }

    #[test]
    fn non_path_sources_are_excluded_regardless_of_disk_state() {
        let db = vec![
            row("remote", "checkpoint", "url"),
            row("hub", "lora", "hf_repo_id"),
        ];
        assert!(missing_on_disk(&[], &db, &formats()).is_empty());
    }

    #[test]
    fn format_comparison_ignores_case() {
        let db = vec![row("X", "Checkpoint", "path")];
        let missing = missing_on_disk(&[], &db, &formats());
        assert_eq!(missing.len(), 1);
    }

    #[test]
    fn result_is_sorted_by_name() {
        let db = vec![
            row("zebra", "lora", "path"),
            row("apple", "checkpoint", "path"),
            row("mango", "lora", "path"),
        ];
        let missing = missing_on_disk(&[], &db, &formats());
        let names: Vec<&str> = missing.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["apple", "mango", "zebra"]);
    }

    #[test]
    fn plan_deletes_rows_without_a_local_match() {
        let missing = vec![row("C", "checkpoint", "path")];
        let plan = build_plan(&missing, &[]);
        assert_eq!(
            plan.actions,
            vec![SyncAction::Delete {
                name: "C".to_string()
            }]
        );
    }

    #[test]
    fn plan_relocates_rows_whose_file_reappeared() {
        // The diff ran against an older listing; a fresh one has the file
        // back under a new path, so the row follows it instead of dying.
        let missing = vec![row("C", "checkpoint", "path")];
        let plan = build_plan(&missing, &[local("C")]);
        assert_eq!(
            plan.actions,
            vec![SyncAction::Relocate {
                name: "C".to_string(),
                new_path: "/models/checkpoints/C.safetensors".to_string(),
            }]
        );
    }

    #[test]
    fn plan_preserves_missing_order() {
        let missing = vec![
            row("a", "lora", "path"),
            row("b", "checkpoint", "path"),
            row("c", "lora", "path"),
        ];
        let plan = build_plan(&missing, &[local("b")]);
        let names: Vec<&str> = plan.actions.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(matches!(plan.actions[1], SyncAction::Relocate { .. }));
    }
}
