use tracing::trace;

use crate::codec::error::EncodeError;
use crate::codec::header::{Slot, header_size};
use crate::codec::scalar::{encode_int, encode_real, encode_sorted_real};
use crate::storage::schema::{Column, Schema};
use crate::types::datatype::ColumnType;
use crate::types::value::Value;

/// A row split into its storage key and value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRow {
    /// Primary-key column bytes; `None` when the schema has no primary key.
    pub key: Option<Vec<u8>>,
    /// Offset header followed by the non-key, non-null payloads.
    pub value: Vec<u8>,
}

/// How one column is laid out in the encoded value.
#[derive(Debug, Clone, Copy)]
enum Placement<'v> {
    PrimaryKey,
    Null,
    Payload { value: &'v Value, len: usize },
}

/// Marshals `values` into a key/value pair for `schema`.
///
/// Fails without producing anything if a value does not carry its column's
/// type, the primary key is null, or a fixed-width text does not fit or
/// contains a NUL byte.
pub fn encode(schema: &Schema, values: &[Value]) -> Result<EncodedRow, EncodeError> {
    if values.len() != schema.column_count() {
        return Err(EncodeError::ArityMismatch {
            expected: schema.column_count(),
            found: values.len(),
        });
    }

    let placements = schema
        .columns
        .iter()
        .zip(values)
        .map(|(column, value)| place(column, value))
        .collect::<Result<Vec<_>, _>>()?;

    let key = match schema.primary_key_index() {
        Some(pk) => Some(encode_key(&schema.columns[pk], &values[pk])?),
        None => None,
    };

    let header_len = header_size(schema.column_count());
    let payload_len: usize = placements
        .iter()
        .map(|p| match p {
            Placement::Payload { len, .. } => *len,
            _ => 0,
        })
        .sum();
    if header_len + payload_len > i32::MAX as usize {
        return Err(EncodeError::RowTooLarge);
    }

    let mut out = Vec::with_capacity(header_len + payload_len);
    out.extend_from_slice(&(header_len as i32).to_be_bytes());
    let mut offset = header_len;
    for placement in &placements {
        let slot = match placement {
            Placement::PrimaryKey => Slot::InKey,
            Placement::Null => Slot::Null,
            Placement::Payload { len, .. } => {
                offset += len;
                Slot::Offset(offset)
            }
        };
        out.extend_from_slice(&slot.to_raw().to_be_bytes());
    }

    for (column, placement) in schema.columns.iter().zip(&placements) {
        if let Placement::Payload { value, .. } = placement {
            write_payload(&mut out, column, value);
        }
    }

    trace!(
        columns = schema.column_count(),
        key_len = key.as_ref().map_or(0, Vec::len),
        value_len = out.len(),
        "row encoded"
    );
    Ok(EncodedRow { key, value: out })
}

/// Encodes a primary-key value the way it is stored as a key: fixed width
/// for numbers, raw unpadded bytes for text.
pub fn encode_key(column: &Column, value: &Value) -> Result<Vec<u8>, EncodeError> {
    check_type(column, value)?;
    match value {
        Value::Null => Err(EncodeError::NullPrimaryKey {
            column: column.name.clone(),
        }),
        Value::Integer(n) => Ok(encode_int(*n).to_vec()),
        Value::Real(x) => Ok(encode_sorted_real(*x).to_vec()),
        Value::Text(s) => {
            check_fixed_width(column, s)?;
            Ok(s.as_bytes().to_vec())
        }
    }
}

fn place<'v>(column: &Column, value: &'v Value) -> Result<Placement<'v>, EncodeError> {
    check_type(column, value)?;
    if column.primary_key {
        if value.is_null() {
            return Err(EncodeError::NullPrimaryKey {
                column: column.name.clone(),
            });
        }
        return Ok(Placement::PrimaryKey);
    }
    let len = match value {
        Value::Null => return Ok(Placement::Null),
        Value::Text(s) => {
            check_fixed_width(column, s)?;
            column.dtype.fixed_width().unwrap_or(s.len())
        }
        Value::Integer(_) | Value::Real(_) => column.dtype.fixed_width().unwrap_or_default(),
    };
    Ok(Placement::Payload { value, len })
}

fn check_type(column: &Column, value: &Value) -> Result<(), EncodeError> {
    if value.matches_type(&column.dtype) {
        Ok(())
    } else {
        Err(EncodeError::TypeMismatch {
            column: column.name.clone(),
            expected: column.dtype,
        })
    }
}

fn check_fixed_width(column: &Column, s: &str) -> Result<(), EncodeError> {
    if let ColumnType::FixedText(max) = column.dtype {
        if s.contains('\0') {
            return Err(EncodeError::EmbeddedNul {
                column: column.name.clone(),
            });
        }
        if s.len() > max {
            return Err(EncodeError::TextTooLong {
                column: column.name.clone(),
                max,
                len: s.len(),
            });
        }
    }
    Ok(())
}

fn write_payload(out: &mut Vec<u8>, column: &Column, value: &Value) {
    match value {
        Value::Integer(n) => out.extend_from_slice(&encode_int(*n)),
        Value::Real(x) => out.extend_from_slice(&encode_real(*x)),
        Value::Text(s) => {
            out.extend_from_slice(s.as_bytes());
            if let ColumnType::FixedText(width) = column.dtype {
                out.resize(out.len() + (width - s.len()), 0);
            }
        }
        Value::Null => {}
    }
}
