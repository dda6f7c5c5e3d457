use std::collections::HashSet;

use crate::storage::error::CatalogError;
use crate::types::datatype::ColumnType;

/// Represents a single column in a table schema
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub dtype: ColumnType,
    pub primary_key: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: ColumnType) -> Self {
        Self {
            name: name.into(),
            dtype,
            primary_key: false,
        }
    }

    pub fn primary_key(name: impl Into<String>, dtype: ColumnType) -> Self {
        Self {
            name: name.into(),
            dtype,
            primary_key: true,
        }
    }
}

/// Represents the schema of a table (list of columns)
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub columns: Vec<Column>,
}

impl Schema {
    /// Creates a new schema from a list of column definitions
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Returns the number of columns in this schema
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, idx: usize) -> Option<&Column> {
        self.columns.get(idx)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn primary_key_index(&self) -> Option<usize> {
        self.columns.iter().position(|c| c.primary_key)
    }

    /// Checks the invariants every stored table relies on: at least one
    /// column, unique names, at most one primary key.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.columns.is_empty() {
            return Err(CatalogError::InvalidSchema(
                "a table needs at least one column".to_string(),
            ));
        }
        let mut seen: HashSet<&str> = HashSet::new();
        for c in &self.columns {
            if c.name.is_empty() {
                return Err(CatalogError::InvalidSchema("empty column name".to_string()));
            }
            if !seen.insert(c.name.as_str()) {
                return Err(CatalogError::InvalidSchema(format!(
                    "duplicate column '{}'",
                    c.name
                )));
            }
            if c.dtype == ColumnType::FixedText(0) {
                return Err(CatalogError::InvalidSchema(format!(
                    "column '{}' has zero width",
                    c.name
                )));
            }
        }
        if self.columns.iter().filter(|c| c.primary_key).count() > 1 {
            return Err(CatalogError::InvalidSchema(
                "Only one PRIMARY KEY column is supported".to_string(),
            ));
        }
        Ok(())
    }
}
