use thiserror::Error;

use crate::storage::txn::Txn;

pub type StorageResult<T> = Result<T, StorageError>;

/// Failures reported by a storage engine.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("table '{0}' does not exist in storage")]
    NoSuchTable(String),

    #[error("table '{0}' already exists in storage")]
    TableExists(String),

    #[error("unknown or finished transaction {0}")]
    UnknownTransaction(Txn),

    /// Another open transaction already holds a write on the key.
    #[error("write conflict on table '{table}' for transaction {txn}")]
    Conflict { table: String, txn: Txn },

    #[error("duplicate key in table '{table}'")]
    KeyExists { table: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupted table file for '{table}': {reason}")]
    Corrupt { table: String, reason: String },
}

impl StorageError {
    pub fn corrupt(table: &str, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            table: table.to_string(),
            reason: reason.into(),
        }
    }
}

/// Schema and catalog misuse.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("table '{0}' already exists")]
    TableExists(String),

    #[error("table '{0}' does not exist")]
    NoSuchTable(String),

    #[error("unknown column '{column}' in table '{table}'")]
    UnknownColumn { table: String, column: String },

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("catalog I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed catalog: {0}")]
    Malformed(String),
}
