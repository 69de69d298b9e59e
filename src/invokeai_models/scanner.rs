//! Walks the models tree and extracts a record per weight file.

use crate::error::Result;
use crate::model::ModelRecord;
use chrono::{DateTime, Utc};
use std::path::Path;
use walkdir::WalkDir;

const MODEL_EXTENSION: &str = "safetensors";

/// The two category roots scanned beneath the models directory. Anything
/// else under the models dir belongs to InvokeAI itself and is left alone.
const SCAN_SUBDIRS: [&str; 2] = ["checkpoints", "loras"];

/// Scan the models directory for weight files.
///
/// Missing subdirectories are silently skipped. Unreadable entries are
/// skipped rather than aborting the walk. Results are sorted by relative
/// path so re-scanning an unchanged tree yields identical records.
pub fn scan(models_dir: &Path) -> Result<Vec<ModelRecord>> {
    let mut records = Vec::new();

    for subdir in SCAN_SUBDIRS {
        let dir = models_dir.join(subdir);
        if !dir.is_dir() {
            continue;
        }

        for entry in WalkDir::new(&dir).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(MODEL_EXTENSION) {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(_) => continue,
            };

            let filename = match path.file_name().and_then(|f| f.to_str()) {
                Some(f) => f.to_string(),
                None => continue,
            };
            let name = match path.file_stem().and_then(|s| s.to_str()) {
                Some(s) => s.to_string(),
                None => continue,
            };

            let relative_path = path
                .strip_prefix(models_dir)
                .unwrap_or(path)
                .to_path_buf();

            let updated_at: DateTime<Utc> = metadata
                .modified()
                .map(DateTime::from)
                .unwrap_or_else(|_| Utc::now());
            // creation time is unsupported on some filesystems
            let created_at: DateTime<Utc> = metadata
                .created()
                .map(DateTime::from)
                .unwrap_or(updated_at);

            records.push(ModelRecord {
                filename,
                name,
                file_path: path.to_path_buf(),
                relative_path: relative_path.clone(),
                category: derive_category(&relative_path, subdir),
                created_at,
                updated_at,
            });
        }
    }

    records.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(records)
}

/// Category comes from the path segments between the scanned subdirectory
/// and the filename: underscores become spaces, lowercased, space-joined.
/// A file directly under the subdirectory falls back to its singular form.
fn derive_category(relative_path: &Path, subdir: &str) -> String {
    let segments: Vec<String> = relative_path
        .components()
        .skip(1) // the scanned subdirectory itself
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    let intermediate = &segments[..segments.len().saturating_sub(1)];
    if intermediate.is_empty() {
        return subdir.trim_end_matches('s').to_string();
    }

    intermediate
        .iter()
        .map(|s| s.replace('_', " ").to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}
