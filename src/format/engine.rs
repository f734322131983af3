//! Storage engine metadata: MCO version and page size

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::decode::Cursor;

/// Page size assumed when no candidate size shows enough valid page headers
pub const DEFAULT_PAGE_SIZE: u32 = 512;

/// Where HERO11 images keep the MCO version triple
const MCO_VERSION_OFFSET: usize = 0x0C10;

/// Dictionary range searched when the fixed location holds no version
const MCO_SEARCH_START: usize = 0x0C00;
const MCO_SEARCH_END: usize = 0x1000;

/// Page kinds seen in the low nibble of a page's first byte
const PAGE_KINDS: [u8; 13] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 10, 11, 12, 15];

/// Version of the embedded database engine that wrote the file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct McoVersion {
    /// Major version
    pub major: u16,
    /// Minor version
    pub minor: u16,
    /// Build number
    pub build: u16,
}

impl fmt::Display for McoVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.build)
    }
}

/// Engine-level facts read from outside the record region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineInfo {
    /// Engine version, when a plausible triple was found
    pub mco_version: Option<McoVersion>,
    /// Storage page size in bytes
    pub page_size: u32,
}

impl EngineInfo {
    /// Inspect `buffer`; never fails
    #[must_use]
    pub fn inspect(buffer: &[u8]) -> Self {
        let info = Self {
            mco_version: detect_mco_version(buffer),
            page_size: detect_page_size(buffer),
        };
        debug!(
            "Engine version {:?}, page size {}",
            info.mco_version.map(|v| v.to_string()),
            info.page_size
        );
        info
    }
}

/// Pick the first candidate page size with at least three plausible page headers
///
/// Candidates are tried in the order 512, 1024, 256, 2048 and need four pages
/// of data. A page header is plausible when its kind nibble is a known kind and
/// its user word is below 0x100 or 0xFFFF.
#[must_use]
pub fn detect_page_size(buffer: &[u8]) -> u32 {
    let cursor = Cursor::new(buffer);

    for size in [512usize, 1024, 256, 2048] {
        if buffer.len() < size * 4 {
            continue;
        }
        let valid = (size..buffer.len().min(size * 16))
            .step_by(size)
            .filter(|&at| {
                let kind = buffer[at] & 0x0F;
                let user = cursor.u16(at + 2).unwrap_or(0);
                PAGE_KINDS.contains(&kind) && (user < 0x100 || user == 0xFFFF)
            })
            .count();
        if valid >= 3 {
            return size as u32;
        }
    }
    DEFAULT_PAGE_SIZE
}

/// Find the MCO version triple in the dictionary area
///
/// The fixed location accepts major 1..=15, minor <= 99, build < 10000. The
/// fallback scan is stricter: major 5..=10, minor <= 10, build 1000..3000.
#[must_use]
pub fn detect_mco_version(buffer: &[u8]) -> Option<McoVersion> {
    let cursor = Cursor::new(buffer);
    let triple = |at: usize| {
        Some(McoVersion {
            major: cursor.u16(at)?,
            minor: cursor.u16(at + 2)?,
            build: cursor.u16(at + 4)?,
        })
    };

    if let Some(v) = triple(MCO_VERSION_OFFSET) {
        if (1..=15).contains(&v.major) && v.minor <= 99 && v.build < 10_000 {
            return Some(v);
        }
    }

    let end = MCO_SEARCH_END.min(buffer.len().saturating_sub(6));
    (MCO_SEARCH_START..end)
        .step_by(2)
        .filter_map(triple)
        .find(|v| {
            (5..=10).contains(&v.major) && v.minor <= 10 && (1000..3000).contains(&v.build)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put_triple(buf: &mut [u8], at: usize, major: u16, minor: u16, build: u16) {
        buf[at..at + 2].copy_from_slice(&major.to_le_bytes());
        buf[at + 2..at + 4].copy_from_slice(&minor.to_le_bytes());
        buf[at + 4..at + 6].copy_from_slice(&build.to_le_bytes());
    }

    #[test]
    fn test_version_at_fixed_offset() {
        let mut buf = vec![0u8; 0x2000];
        put_triple(&mut buf, MCO_VERSION_OFFSET, 8, 1, 1947);

        let version = detect_mco_version(&buf).unwrap();
        assert_eq!(version.to_string(), "8.1.1947");
    }

    #[test]
    fn test_version_found_by_search() {
        let mut buf = vec![0u8; 0x2000];
        put_triple(&mut buf, 0x0C40, 7, 2, 1234);

        assert_eq!(
            detect_mco_version(&buf),
            Some(McoVersion {
                major: 7,
                minor: 2,
                build: 1234,
            })
        );
    }

    #[test]
    fn test_no_version() {
        assert_eq!(detect_mco_version(&[0u8; 0x2000]), None);
        assert_eq!(detect_mco_version(&[]), None);
        assert_eq!(detect_mco_version(&[0xFF; 0x0C20]), None);
    }

    #[test]
    fn test_page_size_detection() {
        // kind nibble 9 is not a page kind; 512-byte probing stops at 0x2000
        let mut buf = vec![0u8; 0x4000];
        for at in (512..0x4000).step_by(512) {
            buf[at] = 0x09;
        }
        for at in (0x2000..0x4000).step_by(1024) {
            buf[at] = 0x01;
        }
        assert_eq!(detect_page_size(&buf), 1024);
    }

    #[test]
    fn test_page_size_default() {
        assert_eq!(detect_page_size(&[]), DEFAULT_PAGE_SIZE);
        assert_eq!(detect_page_size(&[0x09; 0x400]), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_inspect() {
        let mut buf = vec![0u8; 0x3000];
        put_triple(&mut buf, MCO_VERSION_OFFSET, 8, 1, 1947);
        let info = EngineInfo::inspect(&buf);
        assert_eq!(info.page_size, 512);
        assert_eq!(info.mco_version.map(|v| v.major), Some(8));
    }
}
