use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Unexpected models table shape: expected {expected} columns, found {found}")]
    SchemaMismatch { expected: usize, found: usize },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Restore failed and rollback failed; manual intervention required: {0}")]
    RestoreUnrecoverable(String),
}

pub type Result<T> = std::result::Result<T, ModelsError>;
