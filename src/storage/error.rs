use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("no previous song in history")]
    NoPreviousSong,

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
