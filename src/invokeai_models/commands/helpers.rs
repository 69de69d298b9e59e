use crate::cache::{CacheKind, CacheStore};
use crate::commands::{CmdMessage, CmdResult};
use crate::db::ModelDatabase;
use crate::error::Result;
use crate::model::{DatabaseModelRecord, ModelRecord};
use crate::scanner;
use std::path::Path;

/// Local listing, cache-first. A fresh scan is written through; a failed
/// write degrades to a warning on the result instead of failing the command.
pub fn load_local(
    cache: &CacheStore,
    models_dir: &Path,
    refresh: bool,
    result: &mut CmdResult,
) -> Result<Vec<ModelRecord>> {
    if !refresh {
        if let Some(cached) = cache.get(CacheKind::LocalModels) {
            return Ok(cached);
        }
    }

    let fresh = scanner::scan(models_dir)?;
    if let Err(e) = cache.put(CacheKind::LocalModels, &fresh) {
        result.add_message(CmdMessage::warning(format!(
            "Could not write local models cache: {e}"
        )));
    }
    Ok(fresh)
}

/// Database listing, cache-first, same write-through behavior.
pub fn load_database<D: ModelDatabase>(
    db: &D,
    cache: &CacheStore,
    refresh: bool,
    result: &mut CmdResult,
) -> Result<Vec<DatabaseModelRecord>> {
    if !refresh {
        if let Some(cached) = cache.get(CacheKind::DatabaseModels) {
            return Ok(cached);
        }
    }

    let fresh = db.fetch_all()?;
    if let Err(e) = cache.put(CacheKind::DatabaseModels, &fresh) {
        result.add_message(CmdMessage::warning(format!(
            "Could not write database models cache: {e}"
        )));
    }
    Ok(fresh)
}

#[cfg(test)]
pub mod test_support {
    use crate::cache::CacheStore;
    use crate::model::{DatabaseModelRecord, ModelRecord, RowMetadata};
    use chrono::Utc;
    use std::path::{Path, PathBuf};

    pub fn cache(dir: &Path) -> CacheStore {
        CacheStore::new(dir.join("cache"), 3600)
    }

    pub fn cold_cache(dir: &Path) -> CacheStore {
        CacheStore::new(dir.join("cache"), 0)
    }

    pub fn local_record(name: &str) -> ModelRecord {
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

    pub fn db_row(name: &str, format: &str, source_type: &str) -> DatabaseModelRecord {
        DatabaseModelRecord {
            key: format!("key-{name}"),
            hash: String::new(),
            base: "sd-1".to_string(),
            kind: "main".to_string(),
            path: format!("/models/{name}.safetensors"),
            format: format.to_string(),
            name: name.to_string(),
            description: None,
            source: format!("/models/{name}.safetensors"),
            source_type: source_type.to_string(),
            source_api_response: None,
            cover_image: None,
            metadata: RowMetadata::Absent,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    pub fn formats() -> Vec<String> {
        vec!["lora".to_string(), "checkpoint".to_string()]
    }
}
