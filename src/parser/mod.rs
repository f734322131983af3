//! End-to-end decoding of a database image

mod aggregate;

pub use aggregate::{ParseResult, ResultAggregator};

use tracing::debug;

use crate::config::DecoderConfig;
use crate::decode::decode_record;
use crate::error::Diagnostic;
use crate::format::{validate_header, EngineInfo};
use crate::model::derive_entity;
use crate::scan::{detect_schema, RecordScanner};
use crate::Result;

/// Database decoder
///
/// Holds only configuration; every call to [`Decoder::parse`] is independent,
/// so one decoder can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    /// Create a decoder with the given configuration
    ///
    /// # Errors
    ///
    /// Returns error if the configuration fails validation
    pub fn new(config: DecoderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode a complete database image
    ///
    /// Never fails. Anything unexpected ends up in `ParseResult::warnings`:
    /// header problems first, then scan problems, then schema ambiguity, then
    /// per-record problems in scan order.
    #[must_use]
    pub fn parse(&self, buffer: &[u8]) -> ParseResult {
        debug!("Decoding {} byte image", buffer.len());

        let header_valid = validate_header(buffer, &self.config.magic);
        let engine = EngineInfo::inspect(buffer);

        let mut scanner = RecordScanner::new(buffer, &self.config);
        let records: Vec<_> = scanner.by_ref().collect();
        let scan = scanner.finish();

        let detection = detect_schema(&records);
        let layouts = detection.version.layouts();

        let mut aggregator = ResultAggregator::new(detection.version, header_valid, engine);
        if !header_valid {
            aggregator.warn(&Diagnostic::HeaderMismatch);
        }
        aggregator.warn_all(&scan.diagnostics);
        aggregator.warn_all(&detection.diagnostics);
        if scan.partial {
            aggregator.mark_partial();
        }

        for record in &records {
            let (decoded, diagnostics) = decode_record(record, layouts.get(record.table));
            aggregator.warn_all(&diagnostics);
            aggregator.push(record.offset, derive_entity(&decoded));
        }

        aggregator.finish(records.len())
    }
}

/// Decode `buffer` with the default configuration
#[must_use]
pub fn parse(buffer: &[u8]) -> ParseResult {
    Decoder::default().parse(buffer)
}
