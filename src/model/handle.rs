//! Packed file handle

use std::fmt;

use serde::{Serialize, Serializer};

/// 8-byte file identifier: type flag in bits 56-63, directory in 32-39, file number in 0-15
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileHandle(pub u64);

impl FileHandle {
    /// Pack the three components
    #[must_use]
    pub fn from_parts(type_flag: u8, dir_no: u8, file_no: u16) -> Self {
        Self((u64::from(type_flag) << 56) | (u64::from(dir_no) << 32) | u64::from(file_no))
    }

    /// Raw packed value
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }

    /// Type flag, bits 56-63
    #[must_use]
    pub fn type_flag(self) -> u8 {
        (self.0 >> 56) as u8
    }

    /// Directory number, bits 32-39 (100 for `100GOPRO`)
    #[must_use]
    pub fn dir_no(self) -> u8 {
        (self.0 >> 32) as u8
    }

    /// File number within the directory, bits 0-15
    #[must_use]
    pub fn file_no(self) -> u16 {
        self.0 as u16
    }

    /// Best-effort path on the card, e.g. `100GOPRO/GX010069.MP4`
    ///
    /// The codec prefix is not stored anywhere; `GH` is assumed for type flag 1
    /// and `GX` otherwise, and the chapter is always taken as 01.
    #[must_use]
    pub fn estimated_path(self) -> String {
        let prefix = if self.type_flag() == 1 { "GH" } else { "GX" };
        format!(
            "{:03}GOPRO/{prefix}01{:04}.MP4",
            self.dir_no(),
            self.file_no()
        )
    }
}

impl fmt::Display for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

impl Serialize for FileHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
