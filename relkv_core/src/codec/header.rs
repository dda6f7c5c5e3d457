//! Offset header at the front of every encoded value.
//!
//! ```text
//! slot 0        slot 1        ...  slot n        payloads
//! +-------------+-------------+----+-------------+----------------------+
//! | header size | col 0 end   |    | col n-1 end | col 0 | col 2 | ...  |
//! +-------------+-------------+----+-------------+----------------------+
//! ```
//!
//! Each slot is a big-endian `i32`. Slot `i + 1` belongs to column `i` and is
//! either the offset where that column's payload ends (which is where the
//! next payload starts), [`IN_KEY`] or [`NULL`]. Slot 0 is the header size and
//! also the start of the first payload, so the start of column `i` is the
//! nearest non-sentinel slot at or below `i`.

use crate::codec::error::DecodeError;

pub const SLOT_WIDTH: usize = 4;

/// Column value lives in the encoded key.
pub const IN_KEY: i32 = -1;

/// Column value is null.
pub const NULL: i32 = -2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    InKey,
    Null,
    Offset(usize),
}

impl Slot {
    pub fn from_raw(slot: usize, raw: i32) -> Result<Self, DecodeError> {
        match raw {
            IN_KEY => Ok(Slot::InKey),
            NULL => Ok(Slot::Null),
            n if n >= 0 => Ok(Slot::Offset(n as usize)),
            _ => Err(DecodeError::InvalidSlot { slot, raw }),
        }
    }

    pub fn to_raw(self) -> i32 {
        match self {
            Slot::InKey => IN_KEY,
            Slot::Null => NULL,
            Slot::Offset(n) => n as i32,
        }
    }
}

/// Byte size of the header for a table of `column_count` columns.
pub fn header_size(column_count: usize) -> usize {
    (column_count + 1) * SLOT_WIDTH
}

/// Borrowed, validated view over the header of one encoded value.
#[derive(Debug, Clone, Copy)]
pub struct OffsetHeader<'a> {
    bytes: &'a [u8],
    column_count: usize,
}

impl<'a> OffsetHeader<'a> {
    pub fn parse(value: &'a [u8], column_count: usize) -> Result<Self, DecodeError> {
        let needed = header_size(column_count);
        if value.len() < needed {
            return Err(DecodeError::HeaderTruncated {
                len: value.len(),
                needed,
            });
        }
        let declared = read_i32(value, 0);
        if declared < 0 || declared as usize != needed {
            return Err(DecodeError::HeaderSizeMismatch {
                declared,
                expected: needed,
            });
        }
        Ok(Self {
            bytes: &value[..needed],
            column_count,
        })
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Raw slot `idx`, where `idx` runs over `0..=column_count`.
    pub fn slot(&self, idx: usize) -> Result<Slot, DecodeError> {
        Slot::from_raw(idx, read_i32(self.bytes, idx * SLOT_WIDTH))
    }

    /// The slot describing column `col`.
    pub fn column_slot(&self, col: usize) -> Result<Slot, DecodeError> {
        self.slot(col + 1)
    }

    /// Start offset of column `col`'s payload, walking back over the
    /// sentinels of skipped columns that precede it. `parse` checked that
    /// slot 0 holds the header size, so the walk always ends there.
    pub fn start_of(&self, col: usize) -> Result<usize, DecodeError> {
        for idx in (1..=col).rev() {
            if let Slot::Offset(start) = self.slot(idx)? {
                return Ok(start);
            }
        }
        Ok(self.size())
    }
}

fn read_i32(buf: &[u8], at: usize) -> i32 {
    let mut raw = [0u8; SLOT_WIDTH];
    raw.copy_from_slice(&buf[at..at + SLOT_WIDTH]);
    i32::from_be_bytes(raw)
}
