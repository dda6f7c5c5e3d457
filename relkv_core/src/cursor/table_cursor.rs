use std::collections::HashMap;
use std::fmt;

use tracing::{debug, trace};

use crate::codec::decoder::RowView;
use crate::cursor::predicate::{Predicate, RowSource, TruePredicate};
use crate::error::{DbError, Result};
use crate::storage::catalog::Catalog;
use crate::storage::engine::{KvEntry, StorageCursor, StorageEngine};
use crate::storage::schema::{Column, Schema};
use crate::storage::txn::Txn;
use crate::types::Row;
use crate::types::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    Unpositioned,
    Positioned,
    Exhausted,
    Closed,
}

/// Sequential, predicate-filtering scan over one stored table.
///
/// Several cursors may be open on the same table at once (a self-join, for
/// example); each owns its own storage cursor and position. Columns are
/// decoded lazily from the current key/value pair.
pub struct TableCursor<'a> {
    table: String,
    schema: &'a Schema,
    bindings: HashMap<String, usize>,
    predicate: &'a dyn Predicate,
    storage: Option<Box<dyn StorageCursor + 'a>>,
    current: Option<KvEntry>,
    state: CursorState,
    matched: usize,
}

impl<'a> TableCursor<'a> {
    /// Opens a cursor on `table`, which must already be open in the catalog.
    ///
    /// `columns` are the names the calling statement reads; they and the
    /// predicate's columns are bound to this cursor when they belong to the
    /// table. Other names are left for other cursors of the statement.
    pub fn open(
        catalog: &'a Catalog,
        engine: &'a dyn StorageEngine,
        table: &str,
        columns: &[&str],
        predicate: Option<&'a dyn Predicate>,
        txn: Option<Txn>,
    ) -> Result<Self> {
        let schema = catalog.schema(table)?;
        if !catalog.is_open(table) {
            return Err(DbError::state(format!(
                "table {table} must be opened before attempting to create a cursor for it"
            )));
        }
        let predicate: &'a dyn Predicate = predicate.unwrap_or(&TruePredicate);

        let mut bindings = HashMap::new();
        for name in columns.iter().copied().chain(predicate.columns()) {
            match schema.column_index(name) {
                Some(idx) => {
                    bindings.insert(name.to_string(), idx);
                }
                None => trace!(table, column = name, "column not in table, left unbound"),
            }
        }

        let storage = engine.open_cursor(table, txn)?;
        debug!(table, bound = bindings.len(), "table cursor opened");
        Ok(Self {
            table: table.to_string(),
            schema,
            bindings,
            predicate,
            storage: Some(storage),
            current: None,
            state: CursorState::Unpositioned,
            matched: 0,
        })
    }

    /// Restarts the scan and positions on the first row that satisfies the
    /// predicate. Resets the matched-row count.
    pub fn first(&mut self) -> Result<bool> {
        let entry = self.storage_mut()?.get_first()?;
        self.matched = 0;
        self.seek_match(entry)
    }

    /// Advances to the next row satisfying the predicate. On a fresh cursor
    /// this starts the scan; once exhausted it keeps returning `false`.
    pub fn next(&mut self) -> Result<bool> {
        let entry = match self.state {
            CursorState::Closed => return Err(closed()),
            CursorState::Exhausted => return Ok(false),
            CursorState::Unpositioned => self.storage_mut()?.get_first()?,
            CursorState::Positioned => self.storage_mut()?.get_next()?,
        };
        self.seek_match(entry)
    }

    /// Releases the storage cursor. Calling it again is a no-op.
    pub fn close(&mut self) {
        if self.storage.take().is_some() {
            debug!(table = %self.table, matched = self.matched, "table cursor closed");
        }
        self.current = None;
        self.state = CursorState::Closed;
    }

    /// Decodes column `col` of the current row.
    pub fn get_column_value(&self, col: usize) -> Result<Value> {
        let entry = self.positioned_entry()?;
        Ok(RowView::new(self.schema, &entry.key, &entry.value)?.column(col)?)
    }

    /// Decodes a bound column of the current row by name.
    pub fn column_value(&self, name: &str) -> Result<Value> {
        let idx = self.bindings.get(name).copied().ok_or_else(|| {
            DbError::state(format!(
                "column '{name}' is not bound to the cursor on {}",
                self.table
            ))
        })?;
        self.get_column_value(idx)
    }

    /// Decodes every column of the current row.
    pub fn current_row(&self) -> Result<Row> {
        let entry = self.positioned_entry()?;
        Ok(RowView::new(self.schema, &entry.key, &entry.value)?.row()?)
    }

    pub fn matched_row_count(&self) -> usize {
        self.matched
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn column(&self, col: usize) -> Option<&'a Column> {
        self.schema.column(col)
    }

    pub fn column_count(&self) -> usize {
        self.schema.column_count()
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    fn seek_match(&mut self, mut entry: Option<KvEntry>) -> Result<bool> {
        while let Some(found) = entry {
            self.current = Some(found);
            self.state = CursorState::Positioned;
            let satisfied = match self.satisfied() {
                Ok(satisfied) => satisfied,
                Err(e) => {
                    // the row never matched, so it must not be readable
                    self.current = None;
                    return Err(e);
                }
            };
            if satisfied {
                self.matched += 1;
                return Ok(true);
            }
            entry = self.storage_mut()?.get_next()?;
        }
        self.current = None;
        self.state = CursorState::Exhausted;
        debug!(table = %self.table, matched = self.matched, "table cursor exhausted");
        Ok(false)
    }

    fn satisfied(&self) -> Result<bool> {
        let predicate = self.predicate;
        predicate.is_satisfied(self)
    }

    fn storage_mut(&mut self) -> Result<&mut (dyn StorageCursor + 'a)> {
        self.storage.as_deref_mut().ok_or_else(closed)
    }

    fn positioned_entry(&self) -> Result<&KvEntry> {
        match (self.state, &self.current) {
            (CursorState::Positioned, Some(entry)) => Ok(entry),
            (CursorState::Closed, _) => Err(closed()),
            _ => Err(DbError::state(format!(
                "the cursor on {} is not positioned on a row",
                self.table
            ))),
        }
    }
}

impl RowSource for TableCursor<'_> {
    fn value_of(&self, column: &str) -> Result<Value> {
        self.column_value(column)
    }
}

impl fmt::Debug for TableCursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableCursor")
            .field("table", &self.table)
            .field("state", &self.state)
            .field("matched", &self.matched)
            .field("bindings", &self.bindings)
            .finish_non_exhaustive()
    }
}

fn closed() -> DbError {
    DbError::state("this cursor has been closed")
}
