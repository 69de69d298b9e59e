use crate::cache::CacheStore;
use crate::commands::{helpers, CmdMessage, CmdResult};
use crate::db::ModelDatabase;
use crate::error::Result;

pub fn run<D: ModelDatabase>(db: &D, cache: &CacheStore, refresh: bool) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let records = helpers::load_database(db, cache, refresh, &mut result)?;

    if records.is_empty() {
        result.add_message(CmdMessage::info("No models found in the database."));
    }

    Ok(result.with_database_models(records))
}
