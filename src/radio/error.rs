use thiserror::Error;

use crate::{provider::error::ProviderError, storage::error::StorageError};

#[derive(Debug, Error)]
pub enum RadioError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("internal error: {0}")]
    Internal(String),
}
