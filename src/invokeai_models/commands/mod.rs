use crate::model::{DatabaseModelRecord, ModelRecord, Snapshot, SyncPlan};

pub mod cache_update;
pub mod compare;
pub mod database;
pub mod delete_models;
pub mod helpers;
pub mod local;
pub mod snapshots;
pub mod sync;

#[derive(Debug, Clone)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// Plain-data result of every command. The CLI layer decides how (and
/// whether) to render each field; nothing here is tied to a terminal.
#[derive(Debug, Default)]
pub struct CmdResult {
    pub local_models: Vec<ModelRecord>,
    pub database_models: Vec<DatabaseModelRecord>,
    pub missing: Vec<DatabaseModelRecord>,
    pub plan: Option<SyncPlan>,
    pub snapshots: Vec<Snapshot>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_local_models(mut self, models: Vec<ModelRecord>) -> Self {
        self.local_models = models;
        self
    }

    pub fn with_database_models(mut self, models: Vec<DatabaseModelRecord>) -> Self {
        self.database_models = models;
        self
    }

    pub fn with_missing(mut self, missing: Vec<DatabaseModelRecord>) -> Self {
        self.missing = missing;
        self
    }

    pub fn with_plan(mut self, plan: SyncPlan) -> Self {
        self.plan = Some(plan);
        self
    }

    pub fn with_snapshots(mut self, snapshots: Vec<Snapshot>) -> Self {
        self.snapshots = snapshots;
        self
    }
}
