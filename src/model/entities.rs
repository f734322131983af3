//! Semantic entities derived from decoded records

use serde::Serialize;

use super::FileHandle;
use crate::decode::{DateTimeValue, DbVersion};

/// Database-wide state from the `mdb_global` record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalInfo {
    /// Schema version of the database
    pub version: Option<DbVersion>,
    /// Auto-increment object id counter
    pub autoid: Option<u64>,
    /// When the camera last rescanned the card
    pub last_scan_time: Option<DateTimeValue>,
}

/// A recorded media file, from an `mdb_single_ex` record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaFile {
    /// Object id of the source record
    pub object_id: u64,
    /// Opaque file type code
    pub file_type_ex: Option<u32>,
    /// Duration in seconds
    pub duration: Option<f64>,
    /// File size in bytes
    pub size_bytes: Option<u64>,
    /// Packed file handle
    pub file_handle: Option<FileHandle>,
    /// Best-effort path derived from the handle
    pub estimated_path: Option<String>,
    /// Camera model name
    pub camera_model: Option<String>,
    /// Model suffix such as `Black` or `Mini`, HERO11 and later
    pub sub_model: Option<String>,
    /// Frame width, from the matching video group
    pub width: Option<u16>,
    /// Frame height, from the matching video group
    pub height: Option<u16>,
    /// Number of HiLight tags
    pub tag_count: Option<u16>,
    /// HiLight tags across all chapters
    pub total_tag_count: Option<u16>,
    /// Number of chapters
    pub chapter_count: Option<u16>,
    /// Group the file belongs to
    pub group_number: Option<u16>,
    /// Directory number as stored in the record
    pub dir_no: Option<u16>,
    /// Electronic image stabilization was on
    pub has_eis: Option<bool>,
    /// HDR was on
    pub has_hdr: Option<bool>,
    /// Projection code
    pub projection: Option<u8>,
    /// Lens configuration code
    pub lens_config: Option<u8>,
    /// Field of view code
    pub fov: Option<u8>,
    /// Orientation code
    pub media_orientation: Option<u8>,
    /// Protune setting code
    pub protune_option: Option<u8>,
    /// Audio setting code
    pub aud_option: Option<u8>,
    /// Recorded as a clip
    pub is_clip: Option<bool>,
    /// AVC profile
    pub avc_profile: Option<u8>,
    /// AVC level
    pub avc_level: Option<u8>,
    /// Number of detected moments
    pub moment_count: Option<u16>,
    /// Best moment score
    pub max_moment_score: Option<f32>,
    /// Opaque media status code
    pub media_status: Option<u32>,
    /// Opaque upload status code, HERO5 through HERO10
    pub upload_status: Option<u32>,
    /// Camera finished scanning the file
    pub file_scanned: Option<bool>,
    /// File carries a metadata track
    pub f_meta_present: Option<bool>,
    /// Creation time
    pub creation_time: Option<DateTimeValue>,
    /// Last access time
    pub last_access_time: Option<DateTimeValue>,
    /// Last time the camera scanned this file
    pub last_scan_time: Option<DateTimeValue>,
}

impl MediaFile {
    /// Camera model with its suffix, e.g. `HERO11 Black Mini`
    #[must_use]
    pub fn full_model(&self) -> Option<String> {
        match (&self.camera_model, &self.sub_model) {
            (Some(model), Some(sub)) => Some(format!("{model} {sub}")),
            (Some(model), None) => Some(model.clone()),
            (None, sub) => sub.clone(),
        }
    }
}

/// GoPro unique segment identifier, shared by videos of one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SegmentId {
    /// Session identifier, blob bytes 0-3
    pub session_id: u32,
    /// Camera/recording identifier, blob bytes 8-11
    pub recording_id: u32,
}

/// A video group (chapters, timelapse sequence), from an `mdb_grouped_ex` record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoGroup {
    /// Object id of the source record
    pub object_id: u64,
    /// Handle of the group's file
    pub file_handle: Option<FileHandle>,
    /// Best-effort path derived from the handle
    pub estimated_path: Option<String>,
    /// Frame rate numerator
    pub frame_rate_timescale: Option<u32>,
    /// Frame rate denominator
    pub frame_rate_duration: Option<u32>,
    /// `timescale / duration`, undefined when either is absent or duration is 0
    pub fps: Option<f64>,
    /// Number of elements in the group
    pub n_elems: Option<u32>,
    /// Group number
    pub group_number: Option<u16>,
    /// Frame width
    pub width: Option<u16>,
    /// Frame height
    pub height: Option<u16>,
    /// Group creation time
    pub creation_time: Option<DateTimeValue>,
    /// Progressive scan
    pub is_progressive: Option<bool>,
    /// Subsampled
    pub is_subsample: Option<bool>,
    /// Session identifiers
    pub segment: Option<SegmentId>,
    /// 128-bit content id as hex, HERO11 and later
    pub content_id: Option<String>,
}

/// Frames per second, `None` instead of dividing by zero
#[must_use]
pub fn frames_per_second(timescale: u32, duration: u32) -> Option<f64> {
    (duration != 0).then(|| f64::from(timescale) / f64::from(duration))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps() {
        let fps = frames_per_second(60_000, 1_001).unwrap();
        assert!((fps - 59.94).abs() < 0.01);
        assert_eq!(frames_per_second(30, 1), Some(30.0));
    }

    #[test]
    fn test_fps_zero_duration() {
        assert_eq!(frames_per_second(60_000, 0), None);
    }
}
