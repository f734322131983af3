//! On-disk format of the media index database

mod engine;
mod header;
mod layout;
mod reader;

use std::fmt;

use serde::Serialize;

pub use engine::{
    detect_mco_version, detect_page_size, EngineInfo, McoVersion, DEFAULT_PAGE_SIZE,
};
pub use header::{RecordHeader, OID_SIZE, RECORD_HEADER_SIZE};
pub use layout::{
    EmbeddedStruct, FieldFlags, FieldSpec, FieldType, LayoutSet, TableLayout, HERO11_PLUS,
    HERO5_TO_8, HERO9_TO_10,
};
pub use reader::DatabaseFile;

/// File signature: `00 FF*10 07 FF FF FF FF`
pub const FILE_MAGIC: [u8; 16] = [
    0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x07, 0xFF, 0xFF, 0xFF, 0xFF,
];

/// Offset of the first record slot
pub const DATA_REGION_START: usize = 0x2C00;

/// Records are padded out to this granularity
pub const RECORD_ALIGNMENT: usize = 256;

/// 32-bit null marker
pub const SENTINEL_U32: u32 = 0xFFFF_FFFF;

/// Record kinds stored in the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u16)]
pub enum TableId {
    /// `mdb_global`: database-wide counters, one record
    Global = 1,
    /// `mdb_single`: file handle lookup table
    Single = 2,
    /// `mdb_single_ex`: extended per-file metadata
    SingleEx = 3,
    /// `mdb_grouped_ex`: video group (chapters, timelapse sequences)
    GroupedEx = 4,
}

impl TableId {
    /// Map a raw table id, rejecting anything outside 1..=4
    #[must_use]
    pub fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            1 => Some(Self::Global),
            2 => Some(Self::Single),
            3 => Some(Self::SingleEx),
            4 => Some(Self::GroupedEx),
            _ => None,
        }
    }

    /// Table name as it appears in the embedded schema
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Global => "mdb_global",
            Self::Single => "mdb_single",
            Self::SingleEx => "mdb_single_ex",
            Self::GroupedEx => "mdb_grouped_ex",
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Check the file signature against `magic`
///
/// Buffers shorter than the signature are invalid. Never fails otherwise;
/// callers record a mismatch as a warning and keep decoding.
#[must_use]
pub fn validate_header(buffer: &[u8], magic: &[u8; 16]) -> bool {
    buffer.get(..magic.len()).is_some_and(|head| head == magic)
}
