//! Linear record scanner with bounded resynchronization

use tracing::debug;

use crate::config::DecoderConfig;
use crate::decode::Cursor;
use crate::error::Diagnostic;
use crate::format::{RecordHeader, TableId, OID_SIZE, RECORD_HEADER_SIZE};

/// A record as found in the data region, before field decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord<'a> {
    /// Absolute offset of the record header
    pub offset: usize,
    /// Header flags (opaque)
    pub flags: u16,
    /// Table the record belongs to
    pub table: TableId,
    /// Declared payload size
    pub declared_size: u32,
    /// Chain pointer from the header
    pub next_ptr: u64,
    /// Object id stored ahead of the body
    pub oid: u64,
    /// Record body: `declared_size` bytes following the object id
    pub payload: &'a [u8],
}

impl RawRecord<'_> {
    /// Offset one past the last payload byte
    #[must_use]
    pub fn end(&self) -> usize {
        self.offset + RECORD_HEADER_SIZE + OID_SIZE + self.payload.len()
    }
}

/// Diagnostics left behind by a scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Desync and abandonment notices, in scan order
    pub diagnostics: Vec<Diagnostic>,
    /// Scanning stopped before the end of the buffer
    pub partial: bool,
}

enum Slot<'a> {
    Record(RawRecord<'a>),
    Empty,
    Invalid,
}

/// One-pass iterator over the records of a database image
///
/// Starts at the configured data-region offset and only moves forward, so it
/// always terminates. Once exhausted, [`RecordScanner::finish`] hands back
/// what went wrong along the way.
pub struct RecordScanner<'a> {
    buffer: &'a [u8],
    config: &'a DecoderConfig,
    step: usize,
    alignment: usize,
    pos: usize,
    finished: bool,
    report: ScanReport,
}

impl<'a> RecordScanner<'a> {
    /// Create a scanner over `buffer`
    #[must_use]
    pub fn new(buffer: &'a [u8], config: &'a DecoderConfig) -> Self {
        Self {
            buffer,
            config,
            // zero would stall the scan on an unvalidated config
            step: config.resync.step.max(1),
            alignment: config.record_alignment.max(1),
            pos: config.data_region_start,
            finished: false,
            report: ScanReport::default(),
        }
    }

    /// Whether the scan was cut short so far
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.report.partial
    }

    /// Consume the scanner and return its report
    #[must_use]
    pub fn finish(self) -> ScanReport {
        self.report
    }

    fn slot_at(&self, at: usize) -> Slot<'a> {
        let Some(raw) = self.buffer.get(at..at + RECORD_HEADER_SIZE) else {
            return Slot::Invalid;
        };
        if raw.iter().all(|&b| b == 0x00) || raw.iter().all(|&b| b == 0xFF) {
            return Slot::Empty;
        }

        let Some(header) = RecordHeader::read(raw) else {
            return Slot::Invalid;
        };
        let Some(table) = TableId::from_raw(header.table_id) else {
            return Slot::Invalid;
        };
        if header.record_size == 0 || header.record_size > self.config.max_record_size {
            return Slot::Invalid;
        }

        let cursor = Cursor::new(self.buffer);
        let Some(oid) = cursor.u64(at + RECORD_HEADER_SIZE) else {
            return Slot::Invalid;
        };
        let body = at + RECORD_HEADER_SIZE + OID_SIZE;
        let Some(payload) = cursor.bytes(body, header.record_size as usize) else {
            return Slot::Invalid;
        };

        Slot::Record(RawRecord {
            offset: at,
            flags: header.flags,
            table,
            declared_size: header.record_size,
            next_ptr: header.next_ptr,
            oid,
            payload,
        })
    }

    /// Search forward from an invalid header for the next valid one
    fn resync(&self, from: usize) -> Option<usize> {
        let cursor = Cursor::new(self.buffer);
        let step = self.step;
        let limit = from.saturating_add(self.config.resync.window);

        let mut at = from + step;
        while at <= limit && at + RECORD_HEADER_SIZE <= self.buffer.len() {
            let plausible = cursor.u16(at + 2).and_then(TableId::from_raw).is_some();
            if plausible && matches!(self.slot_at(at), Slot::Record(_)) {
                return Some(at);
            }
            at += step;
        }
        None
    }

    /// Follow the chain pointer when it points ahead, else pad to the next slot
    fn next_position(&self, record: &RawRecord<'_>) -> usize {
        let end = record.end();
        match usize::try_from(record.next_ptr) {
            Ok(next) if next != 0 && next >= end && next < self.buffer.len() => next,
            _ => align_up(end, self.alignment),
        }
    }
}

impl<'a> Iterator for RecordScanner<'a> {
    type Item = RawRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            let at = self.pos;
            if at.saturating_add(RECORD_HEADER_SIZE) > self.buffer.len() {
                self.finished = true;
                break;
            }

            match self.slot_at(at) {
                Slot::Record(record) => {
                    debug!(
                        "{} record at {:#x}, {} bytes",
                        record.table, at, record.declared_size
                    );
                    self.pos = self.next_position(&record);
                    return Some(record);
                }
                Slot::Empty => {
                    self.pos = align_up(at + 1, self.alignment);
                }
                Slot::Invalid => {
                    if let Some(next) = self.resync(at) {
                        debug!("Resynchronized from {:#x} to {:#x}", at, next);
                        self.report.diagnostics.push(Diagnostic::RecordScanDesync {
                            offset: at,
                            skipped: next - at,
                        });
                        self.pos = next;
                    } else {
                        debug!("No valid header within resync window after {:#x}", at);
                        self.report.diagnostics.push(Diagnostic::ScanAbandoned {
                            offset: at,
                            window: self.config.resync.window,
                        });
                        self.report.partial = true;
                        self.finished = true;
                    }
                }
            }
        }
        None
    }
}

fn align_up(offset: usize, alignment: usize) -> usize {
    offset.div_ceil(alignment) * alignment
}
