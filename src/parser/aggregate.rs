//! Collection of derived entities into the final result

use serde::Serialize;
use tracing::{info, warn};

use crate::error::Diagnostic;
use crate::format::EngineInfo;
use crate::model::{Entity, FileHandle, GlobalInfo, MediaFile, VideoGroup};
use crate::scan::SchemaVersion;

/// Everything decoded from one database image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseResult {
    /// Layout family the records were decoded with
    pub schema_version: SchemaVersion,
    /// File signature matched
    pub header_valid: bool,
    /// Engine version and page size
    pub engine: EngineInfo,
    /// First `mdb_global` record
    pub global_info: Option<GlobalInfo>,
    /// One entry per `mdb_single_ex` record, in scan order
    pub media_files: Vec<MediaFile>,
    /// One entry per `mdb_grouped_ex` record, in scan order
    pub video_groups: Vec<VideoGroup>,
    /// Handles listed in `mdb_single`, in scan order
    pub file_handles: Vec<FileHandle>,
    /// Raw records found by the scanner
    pub record_count: usize,
    /// Diagnostics in the order they were observed
    pub warnings: Vec<String>,
    /// Scanning stopped at unrecoverable corruption
    pub partial_scan: bool,
}

/// Accumulates entities and diagnostics in arrival order
pub struct ResultAggregator {
    schema_version: SchemaVersion,
    header_valid: bool,
    engine: EngineInfo,
    global_info: Option<GlobalInfo>,
    media_files: Vec<MediaFile>,
    video_groups: Vec<VideoGroup>,
    file_handles: Vec<FileHandle>,
    warnings: Vec<String>,
    partial_scan: bool,
}

impl ResultAggregator {
    /// Start an empty result
    #[must_use]
    pub fn new(schema_version: SchemaVersion, header_valid: bool, engine: EngineInfo) -> Self {
        Self {
            schema_version,
            header_valid,
            engine,
            global_info: None,
            media_files: Vec::new(),
            video_groups: Vec::new(),
            file_handles: Vec::new(),
            warnings: Vec::new(),
            partial_scan: false,
        }
    }

    /// Record a diagnostic
    pub fn warn(&mut self, diagnostic: &Diagnostic) {
        warn!("{diagnostic}");
        self.warnings.push(diagnostic.to_string());
    }

    /// Record several diagnostics in order
    pub fn warn_all<'d>(&mut self, diagnostics: impl IntoIterator<Item = &'d Diagnostic>) {
        for diagnostic in diagnostics {
            self.warn(diagnostic);
        }
    }

    /// Flag the scan as cut short
    pub fn mark_partial(&mut self) {
        self.partial_scan = true;
    }

    /// Add the entity derived from the record at `offset`
    pub fn push(&mut self, offset: usize, entity: Entity) {
        match entity {
            Entity::Global(global) => {
                if self.global_info.is_none() {
                    self.global_info = Some(global);
                } else {
                    self.warn(&Diagnostic::DuplicateGlobal { offset });
                }
            }
            Entity::Indexed(Some(handle)) => self.file_handles.push(handle),
            Entity::Indexed(None) => {}
            Entity::Media(media) => self.media_files.push(*media),
            Entity::Group(group) => self.video_groups.push(group),
        }
    }

    /// Produce the final result
    ///
    /// Media files whose layout carries no frame size take it from the first
    /// video group with the same file handle.
    #[must_use]
    pub fn finish(mut self, record_count: usize) -> ParseResult {
        for media in &mut self.media_files {
            if media.width.is_some() || media.height.is_some() {
                continue;
            }
            let Some(group) = media.file_handle.and_then(|handle| {
                self.video_groups
                    .iter()
                    .find(|g| g.file_handle == Some(handle))
            }) else {
                continue;
            };
            media.width = group.width;
            media.height = group.height;
        }

        info!(
            "Decoded {} records ({}): {} media files, {} video groups, {} warnings",
            record_count,
            self.schema_version,
            self.media_files.len(),
            self.video_groups.len(),
            self.warnings.len()
        );

        ParseResult {
            schema_version: self.schema_version,
            header_valid: self.header_valid,
            engine: self.engine,
            global_info: self.global_info,
            media_files: self.media_files,
            video_groups: self.video_groups,
            file_handles: self.file_handles,
            record_count,
            warnings: self.warnings,
            partial_scan: self.partial_scan,
        }
    }
}
