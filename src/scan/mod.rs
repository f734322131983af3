//! Record discovery and schema detection

mod scanner;
mod schema;

pub use scanner::{RawRecord, RecordScanner, ScanReport};
pub use schema::{
    detect_schema, detect_schema_in, Detection, SchemaVersion, GROUPED_EX_SIZE_HERO11,
    GROUPED_EX_SIZE_HERO5, SINGLE_EX_SIZE_HERO11, SINGLE_EX_SIZE_HERO5,
};
