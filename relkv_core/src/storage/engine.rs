use std::fmt;

use crate::storage::error::StorageResult;
use crate::storage::txn::Txn;

/// One stored key/value pair as handed out by a storage cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvEntry {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl KvEntry {
    pub fn new(key: Vec<u8>, value: Vec<u8>) -> Self {
        Self { key, value }
    }
}

/// Forward-only cursor over one table's entries in ascending key order.
///
/// Dropping the cursor releases its engine handle.
pub trait StorageCursor {
    /// Positions on the lowest key. `None` when the table is empty.
    fn get_first(&mut self) -> StorageResult<Option<KvEntry>>;

    /// Advances one entry; on an unpositioned cursor this is `get_first`.
    /// Keeps returning `None` once the end is reached.
    fn get_next(&mut self) -> StorageResult<Option<KvEntry>>;
}

/// Storage engine trait - abstraction for different storage backends
/// (in-memory, disk-based, etc.)
///
/// Every data call takes an optional transaction; `None` is autocommit.
/// Engines report conflicts instead of retrying them.
pub trait StorageEngine: fmt::Debug {
    /// Creates a table in the storage (allocates space for entries)
    fn create_table(&mut self, table: &str) -> StorageResult<()>;

    fn has_table(&self, table: &str) -> bool;

    fn begin(&mut self) -> StorageResult<Txn>;

    fn commit(&mut self, txn: Txn) -> StorageResult<()>;

    fn abort(&mut self, txn: Txn) -> StorageResult<()>;

    /// Writes an entry, replacing any entry with the same key
    fn put(&mut self, txn: Option<Txn>, table: &str, key: &[u8], value: &[u8])
    -> StorageResult<()>;

    /// Writes an entry, failing with `KeyExists` if the key is already visible
    fn put_new(
        &mut self,
        txn: Option<Txn>,
        table: &str,
        key: &[u8],
        value: &[u8],
    ) -> StorageResult<()>;

    /// Stores `value` under a fresh engine-assigned row id and returns that key
    fn append(&mut self, txn: Option<Txn>, table: &str, value: &[u8]) -> StorageResult<Vec<u8>>;

    fn open_cursor<'a>(
        &'a self,
        table: &str,
        txn: Option<Txn>,
    ) -> StorageResult<Box<dyn StorageCursor + 'a>>;

    /// Number of cursors handed out and not yet released
    fn open_cursor_count(&self) -> usize;

    /// Flushes whatever the engine buffers. No-op for purely in-memory engines.
    fn checkpoint(&mut self) -> StorageResult<()> {
        Ok(())
    }
}
