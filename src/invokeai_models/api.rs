//! # API Facade
//!
//! Thin entry point over the command layer, generic over the database
//! backend so the whole surface can be driven against the in-memory store
//! in tests. Dispatches only; business logic lives in `commands/*.rs` and
//! nothing here touches stdout or stderr.

use crate::cache::CacheStore;
use crate::commands;
use crate::config::AppConfig;
use crate::db::ModelDatabase;
use crate::error::Result;
use crate::snapshot::SnapshotManager;

pub struct ModelsApi<D: ModelDatabase> {
    db: D,
    cache: CacheStore,
    snapshots: SnapshotManager,
    config: AppConfig,
}

impl<D: ModelDatabase> ModelsApi<D> {
    pub fn new(db: D, config: AppConfig) -> Self {
        let cache = CacheStore::new(config.snapshots_dir.clone(), config.cache_ttl_secs);
        let snapshots = SnapshotManager::new(
            config.snapshots_dir.clone(),
            config.database_path(),
            config.max_snapshots,
        );
        Self {
            db,
            cache,
            snapshots,
            config,
        }
    }

    pub fn local_models(&self, refresh: bool) -> Result<commands::CmdResult> {
        commands::local::run(&self.cache, &self.config.models_dir, refresh)
    }

    pub fn database_models(&self, refresh: bool) -> Result<commands::CmdResult> {
        commands::database::run(&self.db, &self.cache, refresh)
    }

    pub fn compare(&self, refresh: bool) -> Result<commands::CmdResult> {
        commands::compare::run(
            &self.db,
            &self.cache,
            &self.config.models_dir,
            &self.config.relevant_formats,
            refresh,
        )
    }

    pub fn sync(&mut self, dry_run: bool) -> Result<commands::CmdResult> {
        commands::sync::run(
            &mut self.db,
            &self.cache,
            &self.snapshots,
            &self.config.models_dir,
            &self.config.relevant_formats,
            dry_run,
        )
    }

    pub fn delete_models(&mut self, names: &[String], dry_run: bool) -> Result<commands::CmdResult> {
        commands::delete_models::run(&mut self.db, &self.cache, names, dry_run)
    }

    pub fn update_caches(&self) -> Result<commands::CmdResult> {
        commands::cache_update::run(&self.db, &self.cache, &self.config.models_dir)
    }

    pub fn create_snapshot(&self) -> Result<commands::CmdResult> {
        commands::snapshots::create(&self.db, &self.snapshots)
    }

    pub fn list_snapshots(&self) -> Result<commands::CmdResult> {
        commands::snapshots::list(&self.snapshots)
    }

    pub fn delete_snapshots(&self, names: &[String]) -> Result<commands::CmdResult> {
        commands::snapshots::delete(&self.snapshots, names)
    }

    pub fn restore_snapshot(&self, name: &str) -> Result<commands::CmdResult> {
        commands::snapshots::restore(&self.snapshots, name)
    }
}
