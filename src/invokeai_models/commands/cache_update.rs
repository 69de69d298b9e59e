use crate::cache::{CacheKind, CacheStore};
use crate::commands::{CmdMessage, CmdResult};
use crate::db::ModelDatabase;
use crate::error::Result;
use crate::scanner;
use std::path::Path;

/// Force-refresh both cached listings. Unlike the passive write-through,
/// a failed write here is the whole point of the command, so it propagates.
pub fn run<D: ModelDatabase>(
    db: &D,
    cache: &CacheStore,
    models_dir: &Path,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    let local = scanner::scan(models_dir)?;
    cache.put(CacheKind::LocalModels, &local)?;
    result.add_message(CmdMessage::success(format!(
        "Cached {} local model file(s).",
        local.len()
    )));

    let rows = db.fetch_all()?;
    cache.put(CacheKind::DatabaseModels, &rows)?;
    result.add_message(CmdMessage::success(format!(
        "Cached {} database model row(s).",
        rows.len()
    )));

    Ok(result)
}
