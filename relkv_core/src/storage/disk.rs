use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::storage::engine::{StorageCursor, StorageEngine};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::kv::{KvStore, KvTable};
use crate::storage::txn::Txn;

const ROW_ID_PREFIX: &str = "#next_row_id=";

/// Disk-backed storage.
/// Entries live in memory while the process runs; every committed change to
/// a table rewrites `tables/<table>.kv` (or waits for `checkpoint` when
/// `sync_on_commit` is off).
#[derive(Debug)]
pub struct DiskStorage {
    root: PathBuf,
    store: KvStore,
    sync_on_commit: bool,
    dirty: HashSet<String>,
}

impl DiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        initialize_layout(&root)?;
        Ok(Self {
            root,
            store: KvStore::new(),
            sync_on_commit: true,
            dirty: HashSet::new(),
        })
    }

    pub fn with_sync_on_commit(mut self, sync: bool) -> Self {
        self.sync_on_commit = sync;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn table_file_path(&self, table: &str) -> PathBuf {
        self.root.join("tables").join(format!("{table}.kv"))
    }

    /// Loads a table's snapshot file into memory, creating an empty file if
    /// none exists yet.
    pub fn bootstrap_table(&mut self, table: &str) -> StorageResult<()> {
        if self.store.has_table(table) {
            return Ok(());
        }
        let table_file = self.table_file_path(table);
        if !table_file.exists() {
            warn!(table, "table file missing, starting empty");
            File::create(&table_file)?;
        }

        let content = fs::read_to_string(&table_file)?;
        let data = parse_table_file(table, &content)?;
        debug!(table, entries = data.rows.len(), "table bootstrapped from disk");
        self.store.insert_table(table, data);
        Ok(())
    }

    pub fn checkpoint_all(&mut self) -> StorageResult<()> {
        for table in self.store.table_names() {
            self.persist_table(&table)?;
        }
        self.dirty.clear();
        Ok(())
    }

    pub fn persist_table(&self, table: &str) -> StorageResult<()> {
        let data = self.store.table(table)?;
        let mut payload = format!("{ROW_ID_PREFIX}{}\n", data.next_row_id);
        for (key, value) in &data.rows {
            payload.push_str(&hex::encode(key));
            payload.push('\t');
            payload.push_str(&hex::encode(value));
            payload.push('\n');
        }
        fs::write(self.table_file_path(table), payload)?;
        Ok(())
    }

    fn mark_dirty(&mut self, table: &str) -> StorageResult<()> {
        if self.sync_on_commit {
            self.persist_table(table)?;
            self.dirty.remove(table);
        } else {
            self.dirty.insert(table.to_string());
        }
        Ok(())
    }
}

fn initialize_layout(root: &Path) -> StorageResult<()> {
    fs::create_dir_all(root)?;
    fs::create_dir_all(root.join("tables"))?;
    Ok(())
}

fn parse_table_file(table: &str, content: &str) -> StorageResult<KvTable> {
    let mut rows: BTreeMap<Vec<u8>, Vec<u8>> = BTreeMap::new();
    let mut next_row_id: Option<u64> = None;

    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(raw) = line.strip_prefix(ROW_ID_PREFIX) {
            let id = raw.trim().parse::<u64>().map_err(|_| {
                StorageError::corrupt(table, format!("bad row id header at line {}", line_no + 1))
            })?;
            next_row_id = Some(id);
            continue;
        }
        let (key, value) = line.split_once('\t').ok_or_else(|| {
            StorageError::corrupt(table, format!("missing separator at line {}", line_no + 1))
        })?;
        let key = hex::decode(key).map_err(|e| {
            StorageError::corrupt(table, format!("bad key at line {}: {e}", line_no + 1))
        })?;
        let value = hex::decode(value).map_err(|e| {
            StorageError::corrupt(table, format!("bad value at line {}: {e}", line_no + 1))
        })?;
        if rows.insert(key, value).is_some() {
            return Err(StorageError::corrupt(
                table,
                format!("duplicate key at line {}", line_no + 1),
            ));
        }
    }

    let mut data = KvTable::new();
    // Older files may lack the header; never hand out an id below the largest
    // 8-byte key already present.
    let floor = rows
        .keys()
        .filter_map(|k| <[u8; 8]>::try_from(k.as_slice()).ok())
        .map(|b| u64::from_be_bytes(b) + 1)
        .max()
        .unwrap_or(1);
    data.next_row_id = next_row_id.unwrap_or(floor);
    data.rows = rows;
    Ok(data)
}

impl StorageEngine for DiskStorage {
    fn create_table(&mut self, table: &str) -> StorageResult<()> {
        if self.store.has_table(table) {
            return Err(StorageError::TableExists(table.to_string()));
        }

        let table_file = self.table_file_path(table);
        if table_file.exists() {
            warn!(table, file = %table_file.display(), "table file already exists, not overwriting");
            return Err(StorageError::TableExists(table.to_string()));
        }
        OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(table_file)?;
        self.store.create_table(table)?;
        self.persist_table(table)
    }

    fn has_table(&self, table: &str) -> bool {
        self.store.has_table(table)
    }

    fn begin(&mut self) -> StorageResult<Txn> {
        Ok(self.store.begin())
    }

    fn commit(&mut self, txn: Txn) -> StorageResult<()> {
        for table in self.store.commit(txn)? {
            self.mark_dirty(&table)?;
        }
        Ok(())
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
        if self.store.write(txn, table, key, value, true)? {
            self.mark_dirty(table)?;
        }
        Ok(())
    }

    fn put_new(
        &mut self,
        txn: Option<Txn>,
        table: &str,
        key: &[u8],
        value: &[u8],
    ) -> StorageResult<()> {
        if self.store.write(txn, table, key, value, false)? {
            self.mark_dirty(table)?;
        }
        Ok(())
    }

    fn append(&mut self, txn: Option<Txn>, table: &str, value: &[u8]) -> StorageResult<Vec<u8>> {
        let key = self.store.next_row_key(table)?;
        if self.store.write(txn, table, &key, value, false)? {
            self.mark_dirty(table)?;
        }
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

    fn checkpoint(&mut self) -> StorageResult<()> {
        self.checkpoint_all()
    }
}
