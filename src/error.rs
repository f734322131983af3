//! Error and diagnostic types for the media database decoder

use std::io;
use thiserror::Error;

use crate::format::TableId;

/// Result type for fallible operations outside the decode core
pub type Result<T> = std::result::Result<T, MdbError>;

/// Errors raised while loading a database file or decoder configuration
///
/// Decoding itself never fails; see [`Diagnostic`] for what it reports instead.
#[derive(Debug, Error)]
pub enum MdbError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Database file not found
    #[error("Database file not found: {0}")]
    FileNotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Non-fatal condition observed while decoding
///
/// Every diagnostic is rendered into `ParseResult::warnings` in the order it
/// was observed. None of them stop the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    /// The 16-byte file signature did not match
    #[error("header mismatch: file signature is not the expected mdb magic")]
    HeaderMismatch,

    /// No `mdb_single_ex` record was found to pick a layout from
    #[error("schema ambiguous: no mdb_single_ex record found, decoding with best-effort layout")]
    SchemaUndetected,

    /// The first `mdb_single_ex` record has a size outside every known bucket
    #[error("schema ambiguous: mdb_single_ex size {size} matches no known layout, decoding with best-effort layout")]
    SchemaUnknownSize {
        /// Declared record size
        size: u32,
    },

    /// `mdb_single_ex` records of different sizes appear in the same file
    #[error("schema ambiguous: mdb_single_ex record at {offset:#x} has size {size}, first record had {first}; keeping first")]
    SchemaConflict {
        /// Offset of the conflicting record
        offset: usize,
        /// Its declared size
        size: u32,
        /// Size of the record the version was detected from
        first: u32,
    },

    /// An invalid record header was skipped and scanning resumed
    #[error("record scan desync at {offset:#x}: skipped {skipped} bytes to next valid header")]
    RecordScanDesync {
        /// Offset of the invalid header
        offset: usize,
        /// Bytes abandoned before the next valid header
        skipped: usize,
    },

    /// No valid header was found within the resync window
    #[error("record scan abandoned at {offset:#x}: no valid header within {window} bytes")]
    ScanAbandoned {
        /// Offset of the invalid header
        offset: usize,
        /// Size of the search window that was exhausted
        window: usize,
    },

    /// A record's declared size falls outside what its layout expects
    #[error("{table} record at {offset:#x}: declared size {declared}, layout expects {expected}")]
    LayoutSizeMismatch {
        /// Table of the record
        table: TableId,
        /// Offset of the record header
        offset: usize,
        /// Declared record size
        declared: u32,
        /// Size the layout was built for
        expected: u32,
    },

    /// A field's byte range lies outside the record payload
    #[error("{table} record at {offset:#x}: field {field} [{start}..{end}) exceeds payload of {payload_len} bytes")]
    FieldOutOfRange {
        /// Table of the record
        table: TableId,
        /// Offset of the record header
        offset: usize,
        /// Field name
        field: &'static str,
        /// Field start within the payload
        start: usize,
        /// Field end within the payload
        end: usize,
        /// Payload length
        payload_len: usize,
    },

    /// A field was in range but held an impossible value
    #[error("{table} record at {offset:#x}: field {field} holds an invalid value")]
    FieldValueInvalid {
        /// Table of the record
        table: TableId,
        /// Offset of the record header
        offset: usize,
        /// Field name
        field: &'static str,
    },

    /// More than one `mdb_global` record was found
    #[error("extra mdb_global record at {offset:#x} ignored")]
    DuplicateGlobal {
        /// Offset of the ignored record
        offset: usize,
    },
}
