//! Conversion of decoded records into entities

use bytes::Buf;

use super::entities::{frames_per_second, GlobalInfo, MediaFile, SegmentId, VideoGroup};
use super::FileHandle;
use crate::decode::DecodedRecord;
use crate::format::TableId;

/// Entity produced from one decoded record
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    /// From `mdb_global`
    Global(GlobalInfo),
    /// From `mdb_single`; `None` when the handle field was absent
    Indexed(Option<FileHandle>),
    /// From `mdb_single_ex`
    Media(Box<MediaFile>),
    /// From `mdb_grouped_ex`
    Group(VideoGroup),
}

/// Derive the entity for `record`, dispatching on its table
#[must_use]
pub fn derive_entity(record: &DecodedRecord) -> Entity {
    match record.table {
        TableId::Global => Entity::Global(global_info(record)),
        TableId::Single => Entity::Indexed(record.u64("file_handle").map(FileHandle)),
        TableId::SingleEx => Entity::Media(Box::new(media_file(record))),
        TableId::GroupedEx => Entity::Group(video_group(record)),
    }
}

/// `GlobalInfo` from an `mdb_global` record
#[must_use]
pub fn global_info(record: &DecodedRecord) -> GlobalInfo {
    GlobalInfo {
        version: record.version("version"),
        autoid: record.u64("autoid"),
        last_scan_time: record.date_time("last_db_scan_time"),
    }
}

/// `MediaFile` from an `mdb_single_ex` record
#[must_use]
pub fn media_file(record: &DecodedRecord) -> MediaFile {
    let file_handle = record.u64("file_handle").map(FileHandle);

    MediaFile {
        object_id: record.oid,
        file_type_ex: record.u32("file_type_ex"),
        duration: record.u64("duration").map(|ms| ms as f64 / 1000.0),
        size_bytes: record.u64("size"),
        file_handle,
        estimated_path: file_handle.map(FileHandle::estimated_path),
        camera_model: record
            .text("camera_model")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        sub_model: record.bytes("sub_model").and_then(printable_text),
        width: record.u16("width"),
        height: record.u16("height"),
        tag_count: record.u16("tag_cnt"),
        total_tag_count: record.u16("total_tag_cnt"),
        chapter_count: record.u16("chp_cnt"),
        group_number: record.u16("grp_no"),
        dir_no: record.u16("dir_no"),
        has_eis: record.flag("has_eis"),
        has_hdr: record.flag("has_hdr"),
        projection: record.u8("projection"),
        lens_config: record.u8("lens_config"),
        fov: record.u8("fov"),
        media_orientation: record.u8("media_orientation"),
        protune_option: record.u8("protune_option"),
        aud_option: record.u8("aud_option"),
        is_clip: record.flag("is_clip"),
        avc_profile: record.u8("avc_profile"),
        avc_level: record.u8("avc_level"),
        moment_count: record.u16("moment_cnt"),
        max_moment_score: record.f32("max_moment_score"),
        media_status: record.u32("media_status"),
        upload_status: record.u32("upload_status"),
        file_scanned: record.flag("file_scanned"),
        f_meta_present: record.flag("f_meta_present"),
        creation_time: record.date_time("ctm"),
        last_access_time: record.date_time("latm"),
        last_scan_time: record.date_time("last_scan_time"),
    }
}

/// `VideoGroup` from an `mdb_grouped_ex` record
#[must_use]
pub fn video_group(record: &DecodedRecord) -> VideoGroup {
    let file_handle = record.u64("file_handle").map(FileHandle);
    let timescale = record.u32("frame_rate_timescale");
    let duration = record.u32("frame_rate_duration");

    VideoGroup {
        object_id: record.oid,
        file_handle,
        estimated_path: file_handle.map(FileHandle::estimated_path),
        frame_rate_timescale: timescale,
        frame_rate_duration: duration,
        fps: timescale
            .zip(duration)
            .and_then(|(ts, d)| frames_per_second(ts, d)),
        n_elems: record.u32("n_elems"),
        group_number: record.u16("grp_no"),
        width: record.u16("width"),
        height: record.u16("height"),
        creation_time: record.date_time("grp_ctm"),
        is_progressive: record.flag("f_is_progressive"),
        is_subsample: record.flag("f_is_subsample"),
        segment: record.bytes("gusi_blob").and_then(segment_id),
        content_id: record.bytes("blob").and_then(content_id),
    }
}

/// Two little-endian u64 halves, printed high half first
fn content_id(mut blob: &[u8]) -> Option<String> {
    if blob.len() < 16 || blob.iter().all(|&b| b == 0) {
        return None;
    }
    let high = blob.get_u64_le();
    let low = blob.get_u64_le();

    let mut id = [0u8; 16];
    id[..8].copy_from_slice(&high.to_be_bytes());
    id[8..].copy_from_slice(&low.to_be_bytes());
    Some(hex::encode(id))
}

/// Printable ASCII runs of at least two characters, joined by spaces
fn printable_text(raw: &[u8]) -> Option<String> {
    let text = raw
        .split(|b| !(0x20..0x7F).contains(b))
        .map(|run| String::from_utf8_lossy(run).trim().to_string())
        .filter(|run| run.len() >= 2)
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then_some(text)
}

fn segment_id(mut blob: &[u8]) -> Option<SegmentId> {
    if blob.len() < 12 {
        return None;
    }
    let session_id = blob.get_u32_le();
    blob.advance(4);
    let recording_id = blob.get_u32_le();

    (session_id != 0 || recording_id != 0).then_some(SegmentId {
        session_id,
        recording_id,
    })
}
