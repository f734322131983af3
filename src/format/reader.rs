//! Database file reader

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use tracing::debug;

use crate::parser::{Decoder, ParseResult};
use crate::{MdbError, Result};

/// Read-only memory map of an `mdb*.db` file
pub struct DatabaseFile {
    _file: File,
    mmap: Mmap,
}

impl DatabaseFile {
    /// Open and map a database file
    ///
    /// # Errors
    ///
    /// Returns error if the file does not exist or cannot be mapped
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MdbError::FileNotFound(path.display().to_string()));
        }

        let file = File::open(path)?;
        // SAFETY: the map is read-only and the decoder treats the bytes as untrusted input.
        let mmap = unsafe { Mmap::map(&file)? };

        debug!("Mapped {} ({} bytes)", path.display(), mmap.len());

        Ok(Self { _file: file, mmap })
    }

    /// Raw file contents
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.mmap
    }

    /// File size in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Whether the file is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Decode the mapped contents
    #[must_use]
    pub fn parse(&self, decoder: &Decoder) -> ParseResult {
        decoder.parse(&self.mmap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::FILE_MAGIC;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_open_and_parse() {
        let mut file = NamedTempFile::new().unwrap();
        let mut image = FILE_MAGIC.to_vec();
        image.resize(0x3000, 0);
        file.write_all(&image).unwrap();

        let db = DatabaseFile::open(file.path()).unwrap();
        assert_eq!(db.len(), 0x3000);
        assert_eq!(&db.bytes()[..16], &FILE_MAGIC);

        let result = db.parse(&Decoder::default());
        assert!(result.header_valid);
        assert!(!result.partial_scan);
        assert!(result.media_files.is_empty());
    }

    #[test]
    fn test_open_missing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("mdb0.db");
        assert!(matches!(
            DatabaseFile::open(&missing),
            Err(MdbError::FileNotFound(_))
        ));
    }
}
