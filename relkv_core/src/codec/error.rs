use thiserror::Error;

use crate::types::datatype::ColumnType;

/// A row that cannot be marshalled for its schema. Nothing is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("expected {expected} values but got {found}")]
    ArityMismatch { expected: usize, found: usize },

    #[error("column '{column}' expects a {expected} value")]
    TypeMismatch { column: String, expected: ColumnType },

    #[error("primary key column '{column}' cannot be null")]
    NullPrimaryKey { column: String },

    #[error("value for column '{column}' is {len} bytes, wider than char({max})")]
    TextTooLong {
        column: String,
        max: usize,
        len: usize,
    },

    /// char(n) payloads are NUL padded, so NUL cannot be part of the text.
    #[error("value for char column '{column}' contains a NUL byte")]
    EmbeddedNul { column: String },

    #[error("encoded row exceeds the maximum header offset")]
    RowTooLarge,
}

/// An encoded value whose offset header or payload is inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("column index {index} out of range for {count} columns")]
    ColumnOutOfRange { index: usize, count: usize },

    #[error("value is {len} bytes, shorter than its {needed}-byte offset header")]
    HeaderTruncated { len: usize, needed: usize },

    #[error("header declares {declared} bytes but the schema needs {expected}")]
    HeaderSizeMismatch { declared: i32, expected: usize },

    #[error("header slot {slot} holds invalid value {raw}")]
    InvalidSlot { slot: usize, raw: i32 },

    #[error("column {column} has negative length ({start}..{end})")]
    NegativeLength {
        column: usize,
        start: usize,
        end: usize,
    },

    #[error("column {column} payload {start}..{end} exceeds value of {len} bytes")]
    PayloadOutOfBounds {
        column: usize,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("column {column} is {found} bytes, expected {expected}")]
    WidthMismatch {
        column: usize,
        expected: usize,
        found: usize,
    },

    #[error("column {column} holds invalid UTF-8")]
    InvalidUtf8 { column: usize },
}
