use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::storage::engine::{KvEntry, StorageCursor};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::txn::Txn;

/// Committed entries of one table plus its row-id sequence.
#[derive(Debug)]
pub(crate) struct KvTable {
    pub(crate) rows: BTreeMap<Vec<u8>, Vec<u8>>,
    pub(crate) next_row_id: u64,
}

impl KvTable {
    pub(crate) fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_row_id: 1,
        }
    }
}

#[derive(Debug, Default)]
struct PendingTxn {
    writes: BTreeMap<String, BTreeMap<Vec<u8>, Vec<u8>>>,
}

/// Table state and transaction bookkeeping shared by the memory and disk
/// engines. Writes of an open transaction are staged here and hold a key lock
/// until commit or abort.
#[derive(Debug)]
pub(crate) struct KvStore {
    tables: HashMap<String, KvTable>,
    pending: HashMap<Txn, PendingTxn>,
    locks: HashMap<(String, Vec<u8>), Txn>,
    next_txn: u64,
    open_cursors: Rc<Cell<usize>>,
}

impl KvStore {
    pub(crate) fn new() -> Self {
        Self {
            tables: HashMap::new(),
            pending: HashMap::new(),
            locks: HashMap::new(),
            next_txn: 1,
            open_cursors: Rc::new(Cell::new(0)),
        }
    }

    pub(crate) fn create_table(&mut self, table: &str) -> StorageResult<()> {
        if self.tables.contains_key(table) {
            return Err(StorageError::TableExists(table.to_string()));
        }
        self.tables.insert(table.to_string(), KvTable::new());
        Ok(())
    }

    pub(crate) fn insert_table(&mut self, table: &str, data: KvTable) {
        self.tables.insert(table.to_string(), data);
    }

    pub(crate) fn has_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    pub(crate) fn table(&self, table: &str) -> StorageResult<&KvTable> {
        self.tables
            .get(table)
            .ok_or_else(|| StorageError::NoSuchTable(table.to_string()))
    }

    pub(crate) fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort();
        names
    }

    pub(crate) fn begin(&mut self) -> Txn {
        let txn = Txn::new(self.next_txn);
        self.next_txn += 1;
        self.pending.insert(txn, PendingTxn::default());
        debug!(%txn, "transaction started");
        txn
    }

    /// Applies the staged writes and returns the tables they touched.
    pub(crate) fn commit(&mut self, txn: Txn) -> StorageResult<Vec<String>> {
        let pending = self
            .pending
            .remove(&txn)
            .ok_or(StorageError::UnknownTransaction(txn))?;
        let mut touched = Vec::with_capacity(pending.writes.len());
        for (table, writes) in pending.writes {
            let data = self
                .tables
                .get_mut(&table)
                .ok_or_else(|| StorageError::NoSuchTable(table.clone()))?;
            for (key, value) in writes {
                self.locks.remove(&(table.clone(), key.clone()));
                data.rows.insert(key, value);
            }
            touched.push(table);
        }
        debug!(%txn, tables = touched.len(), "transaction committed");
        Ok(touched)
    }

    pub(crate) fn abort(&mut self, txn: Txn) -> StorageResult<()> {
        let pending = self
            .pending
            .remove(&txn)
            .ok_or(StorageError::UnknownTransaction(txn))?;
        for (table, writes) in pending.writes {
            for key in writes.into_keys() {
                self.locks.remove(&(table.clone(), key));
            }
        }
        debug!(%txn, "transaction aborted");
        Ok(())
    }

    /// Returns `true` when the write went straight to committed data.
    pub(crate) fn write(
        &mut self,
        txn: Option<Txn>,
        table: &str,
        key: &[u8],
        value: &[u8],
        overwrite: bool,
    ) -> StorageResult<bool> {
        if !self.tables.contains_key(table) {
            return Err(StorageError::NoSuchTable(table.to_string()));
        }
        let lock_key = (table.to_string(), key.to_vec());
        if let Some(holder) = self.locks.get(&lock_key).copied() {
            if Some(holder) != txn {
                warn!(table, holder = %holder, "write conflict");
                return Err(StorageError::Conflict {
                    table: table.to_string(),
                    txn: holder,
                });
            }
        }
        if !overwrite && self.visible(txn, table, key)? {
            return Err(StorageError::KeyExists {
                table: table.to_string(),
            });
        }

        match txn {
            None => {
                let data = self
                    .tables
                    .get_mut(table)
                    .ok_or_else(|| StorageError::NoSuchTable(table.to_string()))?;
                data.rows.insert(key.to_vec(), value.to_vec());
                trace!(table, key_len = key.len(), value_len = value.len(), "autocommit put");
                Ok(true)
            }
            Some(txn) => {
                let pending = self
                    .pending
                    .get_mut(&txn)
                    .ok_or(StorageError::UnknownTransaction(txn))?;
                pending
                    .writes
                    .entry(table.to_string())
                    .or_default()
                    .insert(key.to_vec(), value.to_vec());
                self.locks.insert(lock_key, txn);
                trace!(table, %txn, key_len = key.len(), value_len = value.len(), "staged put");
                Ok(false)
            }
        }
    }

    /// Allocates the next row id of `table` as an 8-byte big-endian key.
    pub(crate) fn next_row_key(&mut self, table: &str) -> StorageResult<Vec<u8>> {
        let data = self
            .tables
            .get_mut(table)
            .ok_or_else(|| StorageError::NoSuchTable(table.to_string()))?;
        let id = data.next_row_id;
        data.next_row_id += 1;
        Ok(id.to_be_bytes().to_vec())
    }

    fn visible(&self, txn: Option<Txn>, table: &str, key: &[u8]) -> StorageResult<bool> {
        if let Some(txn) = txn {
            let pending = self
                .pending
                .get(&txn)
                .ok_or(StorageError::UnknownTransaction(txn))?;
            if pending
                .writes
                .get(table)
                .is_some_and(|w| w.contains_key(key))
            {
                return Ok(true);
            }
        }
        Ok(self.table(table)?.rows.contains_key(key))
    }

    /// Opens a cursor over the committed entries of `table`, overlaid with
    /// `txn`'s staged writes. The cursor borrows the store, so nothing can be
    /// written to it while the cursor is alive.
    pub(crate) fn open_cursor<'a>(
        &'a self,
        table: &str,
        txn: Option<Txn>,
    ) -> StorageResult<RangeCursor<'a>> {
        let data = self.table(table)?;
        let staged = match txn {
            Some(txn) => self
                .pending
                .get(&txn)
                .ok_or(StorageError::UnknownTransaction(txn))?
                .writes
                .get(table),
            None => None,
        };
        debug!(
            table,
            committed = data.rows.len(),
            staged = staged.map_or(0, BTreeMap::len),
            "storage cursor opened"
        );
        Ok(RangeCursor {
            committed: &data.rows,
            staged,
            position: Position::Unpositioned,
            _guard: CursorGuard::acquire(&self.open_cursors),
        })
    }

    pub(crate) fn open_cursor_count(&self) -> usize {
        self.open_cursors.get()
    }
}

/// Counts a live cursor handle until dropped.
#[derive(Debug)]
pub(crate) struct CursorGuard {
    counter: Rc<Cell<usize>>,
}

impl CursorGuard {
    fn acquire(counter: &Rc<Cell<usize>>) -> Self {
        counter.set(counter.get() + 1);
        Self {
            counter: Rc::clone(counter),
        }
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        self.counter.set(self.counter.get().saturating_sub(1));
    }
}

#[derive(Debug)]
enum Position {
    Unpositioned,
    At(Vec<u8>),
    End,
}

/// Forward cursor that merges committed rows with staged writes one key at a
/// time. A staged write shadows the committed entry with the same key.
#[derive(Debug)]
pub(crate) struct RangeCursor<'a> {
    committed: &'a BTreeMap<Vec<u8>, Vec<u8>>,
    staged: Option<&'a BTreeMap<Vec<u8>, Vec<u8>>>,
    position: Position,
    _guard: CursorGuard,
}

impl RangeCursor<'_> {
    fn entry_after(&self, lower: Bound<&[u8]>) -> Option<KvEntry> {
        let range = (lower, Bound::Unbounded);
        let committed = self.committed.range::<[u8], _>(range).next();
        let staged = self.staged.and_then(|s| s.range::<[u8], _>(range).next());
        let (key, value) = match (committed, staged) {
            (None, None) => return None,
            (Some(c), None) => c,
            (None, Some(s)) => s,
            (Some(c), Some(s)) => {
                if s.0 <= c.0 {
                    s
                } else {
                    c
                }
            }
        };
        Some(KvEntry::new(key.clone(), value.clone()))
    }

    fn settle(&mut self, entry: Option<KvEntry>) -> Option<KvEntry> {
        self.position = match &entry {
            Some(e) => Position::At(e.key.clone()),
            None => Position::End,
        };
        entry
    }
}

impl StorageCursor for RangeCursor<'_> {
    fn get_first(&mut self) -> StorageResult<Option<KvEntry>> {
        let entry = self.entry_after(Bound::Unbounded);
        Ok(self.settle(entry))
    }

    fn get_next(&mut self) -> StorageResult<Option<KvEntry>> {
        let entry = match &self.position {
            Position::Unpositioned => self.entry_after(Bound::Unbounded),
            Position::At(last) => self.entry_after(Bound::Excluded(last.as_slice())),
            Position::End => return Ok(None),
        };
        Ok(self.settle(entry))
    }
}
