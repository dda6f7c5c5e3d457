//! Row codec: splits a row into a primary-key byte string and a value byte
//! string with an offset header, and reads single columns back out of them.

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod header;
pub mod scalar;

pub use decoder::{RowView, decode_column, decode_row};
pub use encoder::{EncodedRow, encode, encode_key};
pub use error::{DecodeError, EncodeError};
