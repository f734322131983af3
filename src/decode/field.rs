//! Typed field decoding of raw record payloads

use serde::Serialize;
use tracing::debug;

use super::cursor::Cursor;
use super::datetime::{DateTimeValue, DbVersion, TagEntry};
use crate::error::Diagnostic;
use crate::format::{EmbeddedStruct, FieldSpec, FieldType, TableId, TableLayout, SENTINEL_U32};
use crate::scan::RawRecord;

/// A decoded field value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// `uint8`
    U8(u8),
    /// `uint16`
    U16(u16),
    /// `uint32`
    U32(u32),
    /// `enum32`, opaque code
    Enum(u32),
    /// `float32`
    F32(f32),
    /// `uint64`
    U64(u64),
    /// Auto-increment id
    AutoId(u64),
    /// Indicator byte, non-zero means present
    Indicator(bool),
    /// `char[n]` up to the first null
    Text(String),
    /// Opaque `u8[n]`
    Bytes(Vec<u8>),
    /// `date_time` struct
    DateTime(DateTimeValue),
    /// `tag_entry` struct
    Tag(TagEntry),
    /// `db_version` struct
    Version(DbVersion),
}

impl FieldValue {
    /// Integer value widened to u64, for any integer-like variant
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::U8(v) => Some(u64::from(v)),
            Self::U16(v) => Some(u64::from(v)),
            Self::U32(v) | Self::Enum(v) => Some(u64::from(v)),
            Self::U64(v) | Self::AutoId(v) => Some(v),
            Self::Indicator(v) => Some(u64::from(v)),
            _ => None,
        }
    }
}

/// One field of a decoded record; `value` is `None` when absent
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedField {
    /// Layout entry the value was read with
    pub spec: &'static FieldSpec,
    /// Decoded value
    pub value: Option<FieldValue>,
}

/// All fields of one record, in layout order
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    /// Table of the source record
    pub table: TableId,
    /// Offset of the source record header
    pub offset: usize,
    /// Object id of the source record
    pub oid: u64,
    /// Decoded fields
    pub fields: Vec<DecodedField>,
}

impl DecodedRecord {
    /// Value of `name` if the layout has it and it is present
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|f| f.spec.name == name)
            .and_then(|f| f.value.as_ref())
    }

    /// Integer field widened to u64
    #[must_use]
    pub fn u64(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(FieldValue::as_u64)
    }

    /// Integer field that fits in u32
    #[must_use]
    pub fn u32(&self, name: &str) -> Option<u32> {
        self.u64(name).and_then(|v| u32::try_from(v).ok())
    }

    /// Integer field that fits in u16
    #[must_use]
    pub fn u16(&self, name: &str) -> Option<u16> {
        self.u64(name).and_then(|v| u16::try_from(v).ok())
    }

    /// Integer field that fits in u8
    #[must_use]
    pub fn u8(&self, name: &str) -> Option<u8> {
        self.u64(name).and_then(|v| u8::try_from(v).ok())
    }

    /// Integer field read as a boolean flag
    #[must_use]
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.u64(name).map(|v| v != 0)
    }

    /// `float32` field
    #[must_use]
    pub fn f32(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            FieldValue::F32(v) => Some(*v),
            _ => None,
        }
    }

    /// Text field
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Opaque byte array field
    #[must_use]
    pub fn bytes(&self, name: &str) -> Option<&[u8]> {
        match self.get(name)? {
            FieldValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// `date_time` field
    #[must_use]
    pub fn date_time(&self, name: &str) -> Option<DateTimeValue> {
        match self.get(name)? {
            FieldValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// `db_version` field
    #[must_use]
    pub fn version(&self, name: &str) -> Option<DbVersion> {
        match self.get(name)? {
            FieldValue::Version(v) => Some(*v),
            _ => None,
        }
    }
}

enum Raw {
    Value(FieldValue),
    Null,
    Invalid,
}

fn read_value(cursor: &Cursor<'_>, spec: &FieldSpec) -> Raw {
    let at = spec.offset;
    let value = match spec.field_type {
        FieldType::UInt8 => cursor.u8(at).map(FieldValue::U8),
        FieldType::UInt16 => cursor.u16(at).map(FieldValue::U16),
        FieldType::UInt32 | FieldType::Enum32 => match cursor.u32(at) {
            Some(SENTINEL_U32) => return Raw::Null,
            Some(v) if spec.field_type == FieldType::Enum32 => Some(FieldValue::Enum(v)),
            other => other.map(FieldValue::U32),
        },
        FieldType::Float32 => cursor.f32(at).map(FieldValue::F32),
        FieldType::UInt64 => cursor.u64(at).map(FieldValue::U64),
        FieldType::AutoId => cursor.u64(at).map(FieldValue::AutoId),
        FieldType::Indicator => cursor.u8(at).map(|b| FieldValue::Indicator(b != 0)),
        FieldType::FixedChar(n) => cursor.fixed_str(at, n).map(FieldValue::Text),
        FieldType::Bytes(n) => cursor.bytes(at, n).map(|b| FieldValue::Bytes(b.to_vec())),
        FieldType::Struct(EmbeddedStruct::DateTime) => {
            // Never-set timestamps are stored zeroed.
            if cursor
                .bytes(at, DateTimeValue::SIZE)
                .is_some_and(|b| b.iter().all(|&x| x == 0))
            {
                return Raw::Null;
            }
            DateTimeValue::decode(cursor, at).map(FieldValue::DateTime)
        }
        FieldType::Struct(EmbeddedStruct::TagEntry) => {
            TagEntry::decode(cursor, at).map(FieldValue::Tag)
        }
        FieldType::Struct(EmbeddedStruct::DbVersion) => {
            DbVersion::decode(cursor, at).map(FieldValue::Version)
        }
    };

    // Range was checked by the caller, so a miss here is a rejected value.
    value.map_or(Raw::Invalid, Raw::Value)
}

/// Decode every field of `record` with `layout`
///
/// Pure function of the payload bytes and the layout. Problems stay local to
/// the field they concern: the field is reported absent and a diagnostic is
/// returned alongside the record.
#[must_use]
pub fn decode_record(
    record: &RawRecord<'_>,
    layout: &'static TableLayout,
) -> (DecodedRecord, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let cursor = Cursor::new(record.payload);

    if !layout.accepts(record.declared_size) {
        diagnostics.push(Diagnostic::LayoutSizeMismatch {
            table: record.table,
            offset: record.offset,
            declared: record.declared_size,
            expected: layout.expected_size,
        });
    }

    let mut fields: Vec<DecodedField> = layout
        .fields()
        .map(|spec| {
            if spec.end() > cursor.len() {
                diagnostics.push(Diagnostic::FieldOutOfRange {
                    table: record.table,
                    offset: record.offset,
                    field: spec.name,
                    start: spec.offset,
                    end: spec.end(),
                    payload_len: cursor.len(),
                });
                return DecodedField { spec, value: None };
            }

            let value = match read_value(&cursor, spec) {
                Raw::Value(v) => Some(v),
                Raw::Null => None,
                Raw::Invalid => {
                    diagnostics.push(Diagnostic::FieldValueInvalid {
                        table: record.table,
                        offset: record.offset,
                        field: spec.name,
                    });
                    None
                }
            };
            DecodedField { spec, value }
        })
        .collect();

    // An optional field is only present when its indicator reads non-zero.
    let gated: Vec<bool> = fields
        .iter()
        .map(|field| match field.spec.indicator {
            Some(indicator) if field.spec.flags.is_optional() => !matches!(
                fields
                    .iter()
                    .find(|f| f.spec.name == indicator)
                    .and_then(|f| f.value.as_ref()),
                Some(FieldValue::Indicator(true))
            ),
            _ => false,
        })
        .collect();

    for (field, off) in fields.iter_mut().zip(gated) {
        if off && field.value.take().is_some() {
            debug!(
                "{} @ {:#x}: {} suppressed by indicator",
                record.table, record.offset, field.spec.name
            );
        }
    }

    let decoded = DecodedRecord {
        table: record.table,
        offset: record.offset,
        oid: record.oid,
        fields,
    };
    (decoded, diagnostics)
}
