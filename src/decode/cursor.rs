//! Bounds-checked little-endian reads over a byte slice

use bytes::Buf;

/// Read-only view over a payload; every read is checked against its length
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    buf: &'a [u8],
}

impl<'a> Cursor<'a> {
    /// Wrap a byte slice
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Length of the underlying slice
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the underlying slice is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// `len` bytes at `offset`, or `None` if any of them is out of range
    #[must_use]
    pub fn bytes(&self, offset: usize, len: usize) -> Option<&'a [u8]> {
        let end = offset.checked_add(len)?;
        self.buf.get(offset..end)
    }

    /// Byte at `offset`
    #[must_use]
    pub fn u8(&self, offset: usize) -> Option<u8> {
        self.buf.get(offset).copied()
    }

    /// Little-endian u16 at `offset`
    #[must_use]
    pub fn u16(&self, offset: usize) -> Option<u16> {
        self.bytes(offset, 2).map(|mut b| b.get_u16_le())
    }

    /// Little-endian u32 at `offset`
    #[must_use]
    pub fn u32(&self, offset: usize) -> Option<u32> {
        self.bytes(offset, 4).map(|mut b| b.get_u32_le())
    }

    /// Little-endian u64 at `offset`
    #[must_use]
    pub fn u64(&self, offset: usize) -> Option<u64> {
        self.bytes(offset, 8).map(|mut b| b.get_u64_le())
    }

    /// Little-endian IEEE-754 single at `offset`
    #[must_use]
    pub fn f32(&self, offset: usize) -> Option<f32> {
        self.bytes(offset, 4).map(|mut b| b.get_f32_le())
    }

    /// Text of a `char[len]` buffer, cut at the first null byte
    #[must_use]
    pub fn fixed_str(&self, offset: usize, len: usize) -> Option<String> {
        let raw = self.bytes(offset, len)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Some(String::from_utf8_lossy(&raw[..end]).into_owned())
    }
}
