//! Embedded structs: date/time, tag entry, database version

use std::fmt;

use serde::{Serialize, Serializer};

use super::cursor::Cursor;

/// Year the stored year offset counts from (FAT convention)
pub const EPOCH_YEAR: u16 = 1980;

/// Calendar timestamp decoded from a 7-byte `date_time` struct
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTimeValue {
    /// Calendar year
    pub year: u16,
    /// 1..=12
    pub month: u8,
    /// 1..=31
    pub day: u8,
    /// 0..=23
    pub hour: u8,
    /// 0..=59
    pub minute: u8,
    /// 0..=59
    pub second: u8,
}

impl DateTimeValue {
    /// Packed size on disk
    pub const SIZE: usize = 7;

    /// Decode `{year_offset:u16, month, day}{minute, hour, second}` at `offset`
    ///
    /// Returns `None` when the bytes are out of range or any component is
    /// impossible (month 13, hour 24, ...).
    #[must_use]
    pub fn decode(cursor: &Cursor<'_>, offset: usize) -> Option<Self> {
        let year_offset = cursor.u16(offset)?;
        let raw = cursor.bytes(offset + 2, 5)?;
        let (month, day, minute, hour, second) = (raw[0], raw[1], raw[2], raw[3], raw[4]);

        let valid = (1..=12).contains(&month)
            && (1..=31).contains(&day)
            && hour <= 23
            && minute <= 59
            && second <= 59;
        if !valid {
            return None;
        }

        Some(Self {
            year: EPOCH_YEAR.checked_add(year_offset)?,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    /// Encode to the on-disk representation
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let year = self.year.saturating_sub(EPOCH_YEAR).to_le_bytes();
        [
            year[0],
            year[1],
            self.month,
            self.day,
            self.minute,
            self.hour,
            self.second,
        ]
    }
}

impl fmt::Display for DateTimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

impl Serialize for DateTimeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// HiLight tag entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TagEntry {
    /// Tag position within the clip
    pub time_code: u32,
    /// Tag index
    pub tag_index: u8,
}

impl TagEntry {
    /// Decode at `offset`
    #[must_use]
    pub fn decode(cursor: &Cursor<'_>, offset: usize) -> Option<Self> {
        Some(Self {
            time_code: cursor.u32(offset)?,
            tag_index: cursor.u8(offset + 4)?,
        })
    }
}

/// Database schema version stored in `mdb_global`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DbVersion {
    /// Major version
    pub major: u32,
    /// Minor version
    pub minor: u32,
}

impl DbVersion {
    /// Decode `{minor:u32, major:u32}` at `offset`
    #[must_use]
    pub fn decode(cursor: &Cursor<'_>, offset: usize) -> Option<Self> {
        Some(Self {
            minor: cursor.u32(offset)?,
            major: cursor.u32(offset + 4)?,
        })
    }
}

impl fmt::Display for DbVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
