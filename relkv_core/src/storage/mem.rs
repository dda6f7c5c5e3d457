use crate::storage::engine::{StorageCursor, StorageEngine};
use crate::storage::error::StorageResult;
use crate::storage::kv::KvStore;
use crate::storage::txn::Txn;

/// In-memory storage implementation over ordered maps
#[derive(Debug)]
pub struct MemStorage {
    store: KvStore,
}

impl MemStorage {
    /// Creates a new empty in-memory storage
    pub fn new() -> Self {
        Self {
            store: KvStore::new(),
        }
    }
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageEngine for MemStorage {
    fn create_table(&mut self, table: &str) -> StorageResult<()> {
        self.store.create_table(table)
    }

    fn has_table(&self, table: &str) -> bool {
        self.store.has_table(table)
    }

    fn begin(&mut self) -> StorageResult<Txn> {
        Ok(self.store.begin())
    }

    fn commit(&mut self, txn: Txn) -> StorageResult<()> {
        self.store.commit(txn).map(|_| ())
    }

    fn abort(&mut self, txn: Txn) -> StorageResult<()> {
        self.store.abort(txn)
    }

    fn put(
        &mut self,
        txn: Option<Txn>,
        table: &str,
        key: &[u8],
        value: &[u8],
    ) -> StorageResult<()> {
        self.store.write(txn, table, key, value, true).map(|_| ())
    }

    fn put_new(
        &mut self,
        txn: Option<Txn>,
        table: &str,
        key: &[u8],
        value: &[u8],
    ) -> StorageResult<()> {
        self.store.write(txn, table, key, value, false).map(|_| ())
    }

    fn append(&mut self, txn: Option<Txn>, table: &str, value: &[u8]) -> StorageResult<Vec<u8>> {
        let key = self.store.next_row_key(table)?;
        self.store.write(txn, table, &key, value, false)?;
        Ok(key)
    }

    fn open_cursor<'a>(
        &'a self,
        table: &str,
        txn: Option<Txn>,
    ) -> StorageResult<Box<dyn StorageCursor + 'a>> {
        Ok(Box::new(self.store.open_cursor(table, txn)?))
    }

    fn open_cursor_count(&self) -> usize {
        self.store.open_cursor_count()
    }
}
