//! gopro-mdb - Decoder for the GoPro SD-card media index (`mdb*.db`)
//!
//! Takes the raw bytes of a database image and produces typed media-file and
//! video-group entities. Decoding never fails: corruption and ambiguity are
//! reported as warnings next to whatever could be recovered.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::cargo)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::field_reassign_with_default,
    clippy::multiple_crate_versions
)]

pub mod config;
pub mod decode;
pub mod error;
pub mod format;
pub mod model;
pub mod parser;
pub mod scan;

pub use config::DecoderConfig;
pub use error::{Diagnostic, MdbError, Result};
pub use format::{DatabaseFile, EngineInfo, McoVersion};
pub use model::{FileHandle, GlobalInfo, MediaFile, SegmentId, VideoGroup};
pub use parser::{parse, Decoder, ParseResult};
pub use scan::SchemaVersion;
