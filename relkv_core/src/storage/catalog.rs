use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::storage::error::CatalogError;
use crate::storage::schema::{Column, Schema};
use crate::types::datatype::parse_datatype;

#[derive(Debug)]
struct TableEntry {
    schema: Schema,
    open: bool,
}

/// Manages table schemas (metadata catalog) and which tables are open
#[derive(Debug, Default)]
pub struct Catalog {
    tables: HashMap<String, TableEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    tables: HashMap<String, Vec<ColumnFile>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ColumnFile {
    name: String,
    dtype: String,
    #[serde(default)]
    primary_key: bool,
}

impl Catalog {
    /// Creates a new empty catalog
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
        }
    }

    /// Checks if a table exists in the catalog
    pub fn exists(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Creates a new table schema in the catalog. The table starts closed.
    pub fn create_table(&mut self, table: String, columns: Vec<Column>) -> Result<(), CatalogError> {
        if self.exists(&table) {
            return Err(CatalogError::TableExists(table));
        }
        let schema = Schema::new(columns);
        schema.validate()?;
        debug!(table = %table, columns = schema.column_count(), "table created in catalog");
        self.tables.insert(
            table,
            TableEntry {
                schema,
                open: false,
            },
        );
        Ok(())
    }

    /// Removes a table and returns its schema.
    pub fn drop_table(&mut self, table: &str) -> Result<Schema, CatalogError> {
        let entry = self
            .tables
            .remove(table)
            .ok_or_else(|| CatalogError::NoSuchTable(table.to_string()))?;
        debug!(table, "table dropped from catalog");
        Ok(entry.schema)
    }

    pub fn open_table(&mut self, table: &str) -> Result<(), CatalogError> {
        let entry = self.entry_mut(table)?;
        if !entry.open {
            entry.open = true;
            debug!(table, "table opened");
        }
        Ok(())
    }

    pub fn close_table(&mut self, table: &str) -> Result<(), CatalogError> {
        let entry = self.entry_mut(table)?;
        if entry.open {
            entry.open = false;
            debug!(table, "table closed");
        }
        Ok(())
    }

    /// Unknown tables are reported as not open.
    pub fn is_open(&self, table: &str) -> bool {
        self.tables.get(table).is_some_and(|e| e.open)
    }

    /// Retrieves the schema for a given table
    pub fn schema(&self, table: &str) -> Result<&Schema, CatalogError> {
        self.tables
            .get(table)
            .map(|e| &e.schema)
            .ok_or_else(|| CatalogError::NoSuchTable(table.to_string()))
    }

    pub fn lookup_column(&self, table: &str, column: &str) -> Result<&Column, CatalogError> {
        self.schema(table)?
            .columns
            .iter()
            .find(|c| c.name == column)
            .ok_or_else(|| CatalogError::UnknownColumn {
                table: table.to_string(),
                column: column.to_string(),
            })
    }

    pub fn columns_of(&self, table: &str) -> Result<&[Column], CatalogError> {
        Ok(self.schema(table)?.columns.as_slice())
    }

    /// Table names in sorted order.
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn entry_mut(&mut self, table: &str) -> Result<&mut TableEntry, CatalogError> {
        self.tables
            .get_mut(table)
            .ok_or_else(|| CatalogError::NoSuchTable(table.to_string()))
    }

    /// Saves catalog metadata to disk.
    pub fn save_to_path(&self, path: &Path) -> Result<(), CatalogError> {
        let mut tables: HashMap<String, Vec<ColumnFile>> = HashMap::new();
        for (table, entry) in &self.tables {
            let cols: Vec<ColumnFile> = entry
                .schema
                .columns
                .iter()
                .map(|c| ColumnFile {
                    name: c.name.clone(),
                    dtype: c.dtype.to_string(),
                    primary_key: c.primary_key,
                })
                .collect();
            tables.insert(table.clone(), cols);
        }

        let payload = serde_json::to_string_pretty(&CatalogFile { tables })
            .map_err(|e| CatalogError::Malformed(format!("Failed to serialize catalog: {e}")))?;
        fs::write(path, payload)?;
        Ok(())
    }

    /// Loads catalog metadata from disk. Every loaded table starts closed.
    pub fn load_from_path(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::new());
        }

        let file: CatalogFile = serde_json::from_str(&content)
            .map_err(|e| CatalogError::Malformed(format!("Malformed catalog JSON: {e}")))?;
        let mut tables: HashMap<String, TableEntry> = HashMap::new();
        for (table, cols) in file.tables {
            let mut columns: Vec<Column> = Vec::with_capacity(cols.len());
            for c in cols {
                let dtype = parse_datatype(&c.dtype).map_err(CatalogError::Malformed)?;
                columns.push(Column {
                    name: c.name,
                    dtype,
                    primary_key: c.primary_key,
                });
            }
            let schema = Schema::new(columns);
            schema.validate()?;
            tables.insert(table, TableEntry { schema, open: false });
        }
        debug!(tables = tables.len(), path = %path.display(), "catalog loaded");

        Ok(Self { tables })
    }
}
