use thiserror::Error;

use crate::codec::{DecodeError, EncodeError};
use crate::config::ConfigError;
use crate::storage::{CatalogError, StorageError};

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    /// A cursor or table used in a state that does not allow the call.
    #[error("invalid state: {0}")]
    State(String),

    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Anything the storage engine reports, conflicts included.
    #[error("data access error: {0}")]
    DataAccess(#[from] StorageError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl DbError {
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    /// True for failures a caller may retry with a fresh transaction.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DbError::DataAccess(StorageError::Conflict { .. }))
    }
}
