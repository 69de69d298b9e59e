use crate::cache::CacheStore;
use crate::commands::{helpers, CmdMessage, CmdResult};
use crate::error::Result;
use std::path::Path;

pub fn run(cache: &CacheStore, models_dir: &Path, refresh: bool) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let records = helpers::load_local(cache, models_dir, refresh, &mut result)?;

    if records.is_empty() {
        result.add_message(CmdMessage::info("No local model files found."));
    }

    Ok(result.with_local_models(records))
}
