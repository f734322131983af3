//! Record header structure

use bytemuck::{Pod, Zeroable};

/// Record header size
pub const RECORD_HEADER_SIZE: usize = 16;

/// Object id stored between the header and the record body
pub const OID_SIZE: usize = 8;

/// Header preceding every record payload (16 bytes, little-endian on disk)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct RecordHeader {
    /// Slot flags (opaque)
    pub flags: u16,

    /// Table id, 1..=4 for live records
    pub table_id: u16,

    /// Size of the record body, not counting the object id
    pub record_size: u32,

    /// Offset of a chained record, 0 when unused
    pub next_ptr: u64,
}

static_assertions::const_assert_eq!(std::mem::size_of::<RecordHeader>(), RECORD_HEADER_SIZE);

impl RecordHeader {
    /// Read a header at the start of `bytes`, or `None` if fewer than 16 bytes remain
    #[must_use]
    pub fn read(bytes: &[u8]) -> Option<Self> {
        let raw = bytes.get(..RECORD_HEADER_SIZE)?;
        let header: Self = bytemuck::pod_read_unaligned(raw);

        Some(Self {
            flags: u16::from_le(header.flags),
            table_id: u16::from_le(header.table_id),
            record_size: u32::from_le(header.record_size),
            next_ptr: u64::from_le(header.next_ptr),
        })
    }

    /// Encode to the on-disk representation
    #[must_use]
    pub fn to_bytes(&self) -> [u8; RECORD_HEADER_SIZE] {
        let le = Self {
            flags: self.flags.to_le(),
            table_id: self.table_id.to_le(),
            record_size: self.record_size.to_le(),
            next_ptr: self.next_ptr.to_le(),
        };
        let mut out = [0u8; RECORD_HEADER_SIZE];
        out.copy_from_slice(bytemuck::bytes_of(&le));
        out
    }
}
