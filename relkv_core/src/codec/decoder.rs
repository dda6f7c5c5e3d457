use tracing::trace;

use crate::codec::error::DecodeError;
use crate::codec::header::{OffsetHeader, Slot};
use crate::codec::scalar::{decode_int, decode_real, decode_sorted_real};
use crate::storage::schema::Schema;
use crate::types::Row;
use crate::types::datatype::ColumnType;
use crate::types::value::Value;

/// Read-only access to the columns of one stored key/value pair.
///
/// The header is validated once on construction; each column is decoded
/// only when asked for.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    schema: &'a Schema,
    key: &'a [u8],
    value: &'a [u8],
    header: OffsetHeader<'a>,
}

impl<'a> RowView<'a> {
    pub fn new(schema: &'a Schema, key: &'a [u8], value: &'a [u8]) -> Result<Self, DecodeError> {
        let header = OffsetHeader::parse(value, schema.column_count())?;
        Ok(Self {
            schema,
            key,
            value,
            header,
        })
    }

    pub fn header(&self) -> &OffsetHeader<'a> {
        &self.header
    }

    pub fn column(&self, col: usize) -> Result<Value, DecodeError> {
        let column = self
            .schema
            .column(col)
            .ok_or(DecodeError::ColumnOutOfRange {
                index: col,
                count: self.schema.column_count(),
            })?;
        let value = match self.header.column_slot(col)? {
            Slot::Null => Value::Null,
            Slot::InKey => decode_key(col, &column.dtype, self.key)?,
            Slot::Offset(end) => {
                let start = self.header.start_of(col)?;
                if end < start {
                    return Err(DecodeError::NegativeLength {
                        column: col,
                        start,
                        end,
                    });
                }
                if end > self.value.len() {
                    return Err(DecodeError::PayloadOutOfBounds {
                        column: col,
                        start,
                        end,
                        len: self.value.len(),
                    });
                }
                decode_payload(col, &column.dtype, &self.value[start..end])?
            }
        };
        trace!(column = col, "column decoded");
        Ok(value)
    }

    pub fn row(&self) -> Result<Row, DecodeError> {
        (0..self.schema.column_count())
            .map(|col| self.column(col))
            .collect()
    }
}

/// Decodes column `col` from a stored pair without touching the others.
pub fn decode_column(
    schema: &Schema,
    key: &[u8],
    value: &[u8],
    col: usize,
) -> Result<Value, DecodeError> {
    RowView::new(schema, key, value)?.column(col)
}

/// Decodes every column of a stored pair.
pub fn decode_row(schema: &Schema, key: &[u8], value: &[u8]) -> Result<Row, DecodeError> {
    RowView::new(schema, key, value)?.row()
}

fn decode_key(col: usize, dtype: &ColumnType, key: &[u8]) -> Result<Value, DecodeError> {
    match dtype {
        ColumnType::Integer => Ok(Value::Integer(decode_int(fixed(col, key)?))),
        ColumnType::Real => Ok(Value::Real(decode_sorted_real(fixed(col, key)?))),
        ColumnType::FixedText(_) | ColumnType::VarText => text(col, key),
    }
}

fn decode_payload(col: usize, dtype: &ColumnType, bytes: &[u8]) -> Result<Value, DecodeError> {
    match dtype {
        ColumnType::Integer => Ok(Value::Integer(decode_int(fixed(col, bytes)?))),
        ColumnType::Real => Ok(Value::Real(decode_real(fixed(col, bytes)?))),
        ColumnType::FixedText(width) => {
            if bytes.len() != *width {
                return Err(DecodeError::WidthMismatch {
                    column: col,
                    expected: *width,
                    found: bytes.len(),
                });
            }
            let used = bytes.iter().rposition(|b| *b != 0).map_or(0, |p| p + 1);
            text(col, &bytes[..used])
        }
        ColumnType::VarText => text(col, bytes),
    }
}

fn fixed<const N: usize>(col: usize, bytes: &[u8]) -> Result<[u8; N], DecodeError> {
    <[u8; N]>::try_from(bytes).map_err(|_| DecodeError::WidthMismatch {
        column: col,
        expected: N,
        found: bytes.len(),
    })
}

fn text(col: usize, bytes: &[u8]) -> Result<Value, DecodeError> {
    String::from_utf8(bytes.to_vec())
        .map(Value::Text)
        .map_err(|_| DecodeError::InvalidUtf8 { column: col })
}
