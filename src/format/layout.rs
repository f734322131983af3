//! Static record layouts per camera generation
//!
//! Offsets are relative to the start of the record payload. Layouts are fixed
//! configuration; the schema dictionary embedded in the file is not consulted.

use super::TableId;

/// Structs embedded inline in a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddedStruct {
    /// `{year_offset:u16, month:u8, day:u8}` followed by `{minute:u8, hour:u8, second:u8}`
    DateTime,
    /// HiLight tag: `{time_code:u32, tag_index:u8}`
    TagEntry,
    /// `{minor:u32, major:u32}`
    DbVersion,
}

impl EmbeddedStruct {
    /// Packed size in bytes
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::DateTime => 7,
            Self::TagEntry => 5,
            Self::DbVersion => 8,
        }
    }
}

/// Element types used by the record layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// `0x01`
    UInt8,
    /// `0x02`
    UInt16,
    /// `0x03`
    UInt32,
    /// `0x06`, 4-byte enum kept as an opaque code
    Enum32,
    /// `0x0A`
    Float32,
    /// `0x0C`
    UInt64,
    /// `0x0E`, auto-increment object id
    AutoId,
    /// `0x17`, presence byte for an optional field
    Indicator,
    /// Null-terminated `char[n]`
    FixedChar(usize),
    /// Opaque `u8[n]`
    Bytes(usize),
    /// `0x32`
    Struct(EmbeddedStruct),
}

impl FieldType {
    /// Element type code as stored in the schema dictionary
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::UInt8 | Self::FixedChar(_) | Self::Bytes(_) => 0x01,
            Self::UInt16 => 0x02,
            Self::UInt32 => 0x03,
            Self::Enum32 => 0x06,
            Self::Float32 => 0x0A,
            Self::UInt64 => 0x0C,
            Self::AutoId => 0x0E,
            Self::Indicator => 0x17,
            Self::Struct(_) => 0x32,
        }
    }

    /// Width of the field in bytes
    #[must_use]
    pub const fn byte_length(self) -> usize {
        match self {
            Self::UInt8 | Self::Indicator => 1,
            Self::UInt16 => 2,
            Self::UInt32 | Self::Enum32 | Self::Float32 => 4,
            Self::UInt64 | Self::AutoId => 8,
            Self::FixedChar(n) | Self::Bytes(n) => n,
            Self::Struct(s) => s.size(),
        }
    }
}

/// Field flag bits from the schema dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldFlags(u8);

impl FieldFlags {
    /// No flags
    pub const NONE: Self = Self(0x00);
    /// Fixed-size array
    pub const FIXED_ARRAY: Self = Self(0x02);
    /// Part of an index
    pub const INDEXED: Self = Self(0x08);
    /// Gated by an indicator field
    pub const OPTIONAL: Self = Self(0x20);
    /// Optional vector
    pub const OPTIONAL_VECTOR: Self = Self(0x21);
    /// This field is an indicator
    pub const INDICATOR: Self = Self(0x40);

    /// Raw bits
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Build from raw bits
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Combine two flag sets
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Check whether every bit of `other` is set
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether the field is gated by an indicator (0x20 or 0x21)
    #[must_use]
    pub const fn is_optional(self) -> bool {
        self.0 & Self::OPTIONAL.0 != 0
    }
}

/// One field of a record layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name from the embedded schema
    pub name: &'static str,
    /// Byte offset within the payload
    pub offset: usize,
    /// Element type
    pub field_type: FieldType,
    /// Dictionary flags
    pub flags: FieldFlags,
    /// Indicator gating this field when `flags` marks it optional
    pub indicator: Option<&'static str>,
}

impl FieldSpec {
    const fn new(name: &'static str, offset: usize, field_type: FieldType) -> Self {
        let flags = match field_type {
            FieldType::FixedChar(_) | FieldType::Bytes(_) => FieldFlags::FIXED_ARRAY,
            FieldType::Indicator => FieldFlags::INDICATOR,
            _ => FieldFlags::NONE,
        };
        Self {
            name,
            offset,
            field_type,
            flags,
            indicator: None,
        }
    }

    const fn indexed(self) -> Self {
        Self {
            flags: self.flags.union(FieldFlags::INDEXED),
            ..self
        }
    }

    const fn optional(self, indicator: &'static str) -> Self {
        Self {
            flags: self.flags.union(FieldFlags::OPTIONAL),
            indicator: Some(indicator),
            ..self
        }
    }

    /// Width in bytes
    #[must_use]
    pub const fn byte_length(&self) -> usize {
        self.field_type.byte_length()
    }

    /// Offset one past the last byte
    #[must_use]
    pub const fn end(&self) -> usize {
        self.offset + self.byte_length()
    }
}

/// Field list and accepted sizes for one table in one schema version
#[derive(Debug, PartialEq, Eq)]
pub struct TableLayout {
    /// Table the layout describes
    pub table: TableId,
    /// Smallest declared size this layout was built for
    pub min_size: u32,
    /// Canonical record size
    pub expected_size: u32,
    /// Layout whose fields precede `fields`
    pub extends: Option<&'static TableLayout>,
    /// Fields added by this layout
    pub fields: &'static [FieldSpec],
}

impl TableLayout {
    /// All fields, inherited ones first
    pub fn fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.extends
            .map(|base| base.fields)
            .unwrap_or_default()
            .iter()
            .chain(self.fields.iter())
    }

    /// Look up a field by name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().find(|spec| spec.name == name)
    }

    /// Whether a declared record size is one this layout expects
    #[must_use]
    pub fn accepts(&self, size: u32) -> bool {
        (self.min_size..=self.expected_size).contains(&size)
    }
}

/// The four table layouts of one schema version
#[derive(Debug)]
pub struct LayoutSet {
    /// `mdb_global`
    pub global: &'static TableLayout,
    /// `mdb_single`
    pub single: &'static TableLayout,
    /// `mdb_single_ex`
    pub single_ex: &'static TableLayout,
    /// `mdb_grouped_ex`
    pub grouped_ex: &'static TableLayout,
}

impl LayoutSet {
    /// Layout for `table`
    #[must_use]
    pub fn get(&self, table: TableId) -> &'static TableLayout {
        match table {
            TableId::Global => self.global,
            TableId::Single => self.single,
            TableId::SingleEx => self.single_ex,
            TableId::GroupedEx => self.grouped_ex,
        }
    }
}

use EmbeddedStruct::{DateTime, DbVersion, TagEntry};
use FieldType::{
    AutoId, Bytes, Enum32, FixedChar, Float32, Indicator, Struct, UInt16, UInt32, UInt64, UInt8,
};

static GLOBAL: TableLayout = TableLayout {
    table: TableId::Global,
    min_size: 23,
    expected_size: 23,
    extends: None,
    fields: &[
        FieldSpec::new("version", 0, Struct(DbVersion)),
        FieldSpec::new("autoid", 8, AutoId),
        FieldSpec::new("last_db_scan_time", 16, Struct(DateTime)),
    ],
};

static SINGLE: TableLayout = TableLayout {
    table: TableId::Single,
    min_size: 9,
    expected_size: 9,
    extends: None,
    fields: &[
        FieldSpec::new("file_handle", 0, UInt64).indexed(),
        FieldSpec::new("file_scanned", 8, UInt8),
    ],
};

static SINGLE_EX_78: TableLayout = TableLayout {
    table: TableId::SingleEx,
    min_size: 78,
    expected_size: 78,
    extends: None,
    fields: &[
        FieldSpec::new("file_type_ex", 0, Enum32),
        FieldSpec::new("duration", 4, UInt64),
        FieldSpec::new("size", 12, UInt64),
        FieldSpec::new("upload_status", 20, UInt32),
        FieldSpec::new("file_handle", 24, UInt64).indexed(),
        FieldSpec::new("tag_cnt", 36, UInt16),
        FieldSpec::new("ctm", 38, Struct(DateTime)),
        FieldSpec::new("last_scan_time", 46, Struct(DateTime)),
        FieldSpec::new("chp_cnt", 54, UInt16).optional("chp_cnt_indicator"),
        FieldSpec::new("latm", 56, Struct(DateTime)),
        FieldSpec::new("protune_option", 63, UInt8).optional("protune_option_indicator"),
        FieldSpec::new("aud_option", 64, UInt8).optional("aud_option_indicator"),
        FieldSpec::new("protune_option_indicator", 65, Indicator),
        FieldSpec::new("has_eis", 66, UInt8).optional("has_eis_indicator"),
        FieldSpec::new("is_clip", 67, UInt8),
        FieldSpec::new("vtag_indicator", 68, Indicator),
        FieldSpec::new("avc_level", 69, UInt8),
        FieldSpec::new("f_meta_present", 70, UInt8),
        FieldSpec::new("chp_cnt_indicator", 71, Indicator),
        FieldSpec::new("has_eis_indicator", 72, Indicator),
        FieldSpec::new("aud_option_indicator", 73, Indicator),
        FieldSpec::new("file_scanned", 74, UInt8),
        FieldSpec::new("avc_profile", 75, UInt8),
    ],
};

// Hero9/10 grew the 78-byte record; only the model name is placed with any confidence.
static SINGLE_EX_GROWN: TableLayout = TableLayout {
    table: TableId::SingleEx,
    min_size: 79,
    expected_size: 133,
    extends: Some(&SINGLE_EX_78),
    fields: &[FieldSpec::new("camera_model", 78, FixedChar(20))],
};

static SINGLE_EX_134: TableLayout = TableLayout {
    table: TableId::SingleEx,
    min_size: 134,
    expected_size: 134,
    extends: None,
    fields: &[
        FieldSpec::new("duration", 0, UInt64),
        FieldSpec::new("size", 8, UInt64),
        FieldSpec::new("file_handle", 16, UInt64).indexed(),
        FieldSpec::new("media_status", 24, UInt32),
        FieldSpec::new("file_type_ex", 36, Enum32),
        FieldSpec::new("max_moment_score", 40, Float32),
        FieldSpec::new("vtag", 44, Struct(TagEntry)),
        FieldSpec::new("moment_cnt", 50, UInt16),
        FieldSpec::new("ctm", 52, Struct(DateTime)),
        FieldSpec::new("tag_cnt", 60, UInt16),
        FieldSpec::new("chp_cnt", 62, UInt16),
        FieldSpec::new("grp_no", 64, UInt16),
        FieldSpec::new("latm", 66, Struct(DateTime)),
        FieldSpec::new("total_tag_cnt", 74, UInt16),
        FieldSpec::new("dir_no", 76, UInt16),
        FieldSpec::new("last_scan_time", 78, Struct(DateTime)),
        FieldSpec::new("has_hdr", 85, UInt8),
        FieldSpec::new("is_clip", 86, UInt8),
        FieldSpec::new("file_scanned", 87, UInt8),
        FieldSpec::new("avc_level", 88, UInt8),
        FieldSpec::new("avc_profile", 89, UInt8),
        FieldSpec::new("protune_option", 90, UInt8),
        FieldSpec::new("aud_option", 91, UInt8),
        FieldSpec::new("has_eis", 92, UInt8),
        FieldSpec::new("f_meta_present", 93, UInt8),
        FieldSpec::new("projection", 94, UInt8),
        FieldSpec::new("lens_config", 96, UInt8),
        FieldSpec::new("camera_model", 97, FixedChar(30)),
        // overlaps fov and orientation; printable runs only
        FieldSpec::new("sub_model", 128, Bytes(6)),
        FieldSpec::new("fov", 129, UInt8),
        FieldSpec::new("media_orientation", 133, UInt8),
    ],
};

static GROUPED_EX_57: TableLayout = TableLayout {
    table: TableId::GroupedEx,
    min_size: 57,
    expected_size: 57,
    extends: None,
    fields: &[
        FieldSpec::new("file_handle", 0, UInt64).indexed(),
        FieldSpec::new("frame_rate_timescale", 8, UInt32)
            .optional("frame_rate_timescale_indicator"),
        FieldSpec::new("frame_rate_duration", 12, UInt32).optional("frame_rate_duration_indicator"),
        FieldSpec::new("n_elems", 16, UInt32),
        FieldSpec::new("grp_ctm", 20, Struct(DateTime)),
        FieldSpec::new("grp_no", 28, UInt16).optional("grp_no_indicator"),
        FieldSpec::new("width", 30, UInt16),
        FieldSpec::new("height", 32, UInt16),
        FieldSpec::new("frame_rate_duration_indicator", 34, Indicator),
        FieldSpec::new("frame_rate_timescale_indicator", 35, Indicator),
        FieldSpec::new("gusi_blob", 36, Bytes(16)),
        FieldSpec::new("f_is_subsample", 52, UInt8).optional("f_is_subsample_indicator"),
        FieldSpec::new("f_is_progressive", 53, UInt8).optional("f_is_progressive_indicator"),
        FieldSpec::new("f_is_progressive_indicator", 54, Indicator),
        FieldSpec::new("grp_no_indicator", 55, Indicator),
        FieldSpec::new("f_is_subsample_indicator", 56, Indicator),
    ],
};

static GROUPED_EX_73: TableLayout = TableLayout {
    table: TableId::GroupedEx,
    min_size: 73,
    expected_size: 73,
    extends: Some(&GROUPED_EX_57),
    fields: &[FieldSpec::new("blob", 57, Bytes(16))],
};

/// HERO5 through HERO8
pub static HERO5_TO_8: LayoutSet = LayoutSet {
    global: &GLOBAL,
    single: &SINGLE,
    single_ex: &SINGLE_EX_78,
    grouped_ex: &GROUPED_EX_57,
};

/// HERO9 and HERO10
pub static HERO9_TO_10: LayoutSet = LayoutSet {
    global: &GLOBAL,
    single: &SINGLE,
    single_ex: &SINGLE_EX_GROWN,
    grouped_ex: &GROUPED_EX_57,
};

/// HERO11 and later
pub static HERO11_PLUS: LayoutSet = LayoutSet {
    global: &GLOBAL,
    single: &SINGLE,
    single_ex: &SINGLE_EX_134,
    grouped_ex: &GROUPED_EX_73,
};
