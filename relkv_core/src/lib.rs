//! Relational rows on top of a transactional key-value store.
//!
//! Each row is split by [`codec::encode`] into a key (the primary-key column)
//! and a value (every other column behind an offset header). Scans go
//! through a [`TableCursor`], which applies a [`Predicate`] and decodes
//! columns only when they are asked for.

pub mod codec;
pub mod config;
pub mod cursor;
pub mod error;
pub mod storage;
pub mod types;

use tracing::{debug, warn};

pub use config::Config;
pub use cursor::{CompareOp, Condition, CursorState, Predicate, RowSource, TableCursor};
pub use error::{DbError, Result};
pub use storage::{Catalog, Column, DiskStorage, MemStorage, Schema, StorageEngine, Txn};
pub use types::Row;
pub use types::datatype::ColumnType;
pub use types::value::Value;

#[derive(Debug)]
pub struct Database {
    config: Config,
    catalog: Catalog,
    storage: Box<dyn StorageEngine>,
}

impl Database {
    /// Opens an in-memory database, or the disk database at `config.path`
    /// with its catalog and every table it lists.
    pub fn open(config: Config) -> Result<Self> {
        let (catalog, storage): (Catalog, Box<dyn StorageEngine>) = match &config.path {
            None => (Catalog::new(), Box::new(MemStorage::new())),
            Some(root) => {
                let mut disk = DiskStorage::new(root)?.with_sync_on_commit(config.sync_on_commit);
                let catalog = match config.catalog_path() {
                    Some(path) => Catalog::load_from_path(&path)?,
                    None => Catalog::new(),
                };
                for table in catalog.table_names() {
                    disk.bootstrap_table(table)?;
                }
                (catalog, Box::new(disk))
            }
        };
        debug!(path = ?config.path, tables = catalog.table_names().len(), "database opened");
        Ok(Self {
            config,
            catalog,
            storage,
        })
    }

    pub fn in_memory() -> Self {
        Self {
            config: Config::in_memory(),
            catalog: Catalog::new(),
            storage: Box::new(MemStorage::new()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn storage(&self) -> &dyn StorageEngine {
        &*self.storage
    }

    /// Registers the table in the catalog and allocates it in storage. The
    /// new table starts closed. If storage refuses the table the catalog is
    /// left as it was.
    pub fn create_table(&mut self, table: &str, columns: Vec<Column>) -> Result<()> {
        if self.storage.has_table(table) {
            return Err(storage::StorageError::TableExists(table.to_string()).into());
        }
        self.catalog.create_table(table.to_string(), columns)?;
        if let Err(e) = self.storage.create_table(table) {
            self.catalog.drop_table(table)?;
            return Err(e.into());
        }
        self.save_catalog()
    }

    pub fn open_table(&mut self, table: &str) -> Result<()> {
        Ok(self.catalog.open_table(table)?)
    }

    pub fn close_table(&mut self, table: &str) -> Result<()> {
        Ok(self.catalog.close_table(table)?)
    }

    pub fn begin(&mut self) -> Result<Txn> {
        Ok(self.storage.begin()?)
    }

    pub fn commit(&mut self, txn: Txn) -> Result<()> {
        Ok(self.storage.commit(txn)?)
    }

    pub fn abort(&mut self, txn: Txn) -> Result<()> {
        Ok(self.storage.abort(txn)?)
    }

    /// Encodes `row` and writes it. Tables with a primary key reject a
    /// duplicate key; tables without one get an engine-assigned row id.
    pub fn insert(&mut self, txn: Option<Txn>, table: &str, row: &[Value]) -> Result<()> {
        if !self.catalog.is_open(table) {
            return Err(DbError::state(format!(
                "table {table} must be opened before inserting into it"
            )));
        }
        let schema = self.catalog.schema(table)?;
        let encoded = codec::encode(schema, row)?;
        match encoded.key {
            Some(key) => self.storage.put_new(txn, table, &key, &encoded.value)?,
            None => {
                self.storage.append(txn, table, &encoded.value)?;
            }
        }
        Ok(())
    }

    /// Opens a cursor over `table`. See [`TableCursor::open`].
    pub fn scan<'a>(
        &'a self,
        table: &str,
        columns: &[&str],
        predicate: Option<&'a dyn Predicate>,
        txn: Option<Txn>,
    ) -> Result<TableCursor<'a>> {
        TableCursor::open(&self.catalog, &*self.storage, table, columns, predicate, txn)
    }

    /// Runs a full scan and returns how many rows satisfied `predicate`.
    pub fn count_matching(
        &self,
        table: &str,
        predicate: Option<&dyn Predicate>,
        txn: Option<Txn>,
    ) -> Result<usize> {
        let mut cursor = self.scan(table, &[], predicate, txn)?;
        while cursor.next()? {}
        let matched = cursor.matched_row_count();
        cursor.close();
        Ok(matched)
    }

    pub fn checkpoint(&mut self) -> Result<()> {
        Ok(self.storage.checkpoint()?)
    }

    fn save_catalog(&self) -> Result<()> {
        if let Some(path) = self.config.catalog_path() {
            self.catalog.save_to_path(&path)?;
        }
        Ok(())
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if let Err(e) = self.storage.checkpoint() {
            warn!(error = %e, "checkpoint on close failed");
        }
    }
}
