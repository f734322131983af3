//! Field decoding of raw records

mod cursor;
mod datetime;
mod field;

pub use cursor::Cursor;
pub use datetime::{DateTimeValue, DbVersion, TagEntry, EPOCH_YEAR};
pub use field::{decode_record, DecodedField, DecodedRecord, FieldValue};
