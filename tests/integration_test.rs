//! Integration tests for whole-image decoding

use std::io::Write;

use gopro_mdb::config::DecoderConfig;
use gopro_mdb::format::{
    RecordHeader, DATA_REGION_START, DEFAULT_PAGE_SIZE, FILE_MAGIC, OID_SIZE, RECORD_ALIGNMENT,
};
use gopro_mdb::scan::{
    GROUPED_EX_SIZE_HERO11, GROUPED_EX_SIZE_HERO5, SINGLE_EX_SIZE_HERO11, SINGLE_EX_SIZE_HERO5,
};
use gopro_mdb::{parse, DatabaseFile, Decoder, FileHandle, MdbError, SchemaVersion};
use proptest::prelude::*;
use tempfile::NamedTempFile;

const HANDLE: u64 = 0x0100_0064_0000_0045;

/// Builds database images one record slot at a time
struct ImageBuilder {
    buf: Vec<u8>,
    pos: usize,
    next_oid: u64,
}

impl ImageBuilder {
    fn new() -> Self {
        let mut buf = vec![0u8; DATA_REGION_START];
        buf[..16].copy_from_slice(&FILE_MAGIC);
        Self {
            buf,
            pos: DATA_REGION_START,
            next_oid: 1,
        }
    }

    /// Record with the next object id in sequence
    fn record(mut self, table_id: u16, payload: &[u8]) -> Self {
        let oid = self.next_oid;
        self.next_oid += 1;
        self.record_with_oid(table_id, oid, payload)
    }

    fn record_with_oid(mut self, table_id: u16, oid: u64, payload: &[u8]) -> Self {
        let header = RecordHeader {
            flags: 0,
            table_id,
            record_size: u32::try_from(payload.len()).unwrap(),
            next_ptr: 0,
        };
        self.raw(&header.to_bytes());
        self.buf.extend_from_slice(&oid.to_le_bytes());
        self.buf.extend_from_slice(payload);
        self.pad();
        self
    }

    /// Arbitrary bytes at the current slot, then pad
    fn garbage(mut self, bytes: &[u8]) -> Self {
        self.raw(bytes);
        self.pad();
        self
    }

    fn raw(&mut self, bytes: &[u8]) {
        self.buf.resize(self.pos, 0);
        self.buf.extend_from_slice(bytes);
    }

    fn pad(&mut self) {
        self.pos = self.buf.len().div_ceil(RECORD_ALIGNMENT) * RECORD_ALIGNMENT;
        self.buf.resize(self.pos, 0);
    }

    fn build(self) -> Vec<u8> {
        self.buf
    }
}

fn date_time(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> [u8; 7] {
    let y = (year - 1980).to_le_bytes();
    [y[0], y[1], month, day, minute, hour, second]
}

fn hero11_media(duration_ms: u64, size: u64, handle: u64, model: &str) -> Vec<u8> {
    let mut p = vec![0u8; SINGLE_EX_SIZE_HERO11 as usize];
    p[0..8].copy_from_slice(&duration_ms.to_le_bytes());
    p[8..16].copy_from_slice(&size.to_le_bytes());
    p[16..24].copy_from_slice(&handle.to_le_bytes());
    p[52..59].copy_from_slice(&date_time(2023, 6, 15, 14, 30, 5));
    p[60..62].copy_from_slice(&2u16.to_le_bytes());
    p[97..97 + model.len()].copy_from_slice(model.as_bytes());
    p
}

fn hero5_media(duration_ms: u64, handle: u64) -> Vec<u8> {
    let mut p = vec![0u8; SINGLE_EX_SIZE_HERO5 as usize];
    p[4..12].copy_from_slice(&duration_ms.to_le_bytes());
    p[24..32].copy_from_slice(&handle.to_le_bytes());
    p
}

fn grouped(size: u32, handle: u64, width: u16, height: u16, timescale: u32, duration: u32) -> Vec<u8> {
    let mut p = vec![0u8; size as usize];
    p[0..8].copy_from_slice(&handle.to_le_bytes());
    p[8..12].copy_from_slice(&timescale.to_le_bytes());
    p[12..16].copy_from_slice(&duration.to_le_bytes());
    p[30..32].copy_from_slice(&width.to_le_bytes());
    p[32..34].copy_from_slice(&height.to_le_bytes());
    p[34] = 1;
    p[35] = 1;
    p
}

fn global(autoid: u64) -> Vec<u8> {
    let mut p = vec![0u8; 23];
    p[0..4].copy_from_slice(&2u32.to_le_bytes());
    p[4..8].copy_from_slice(&1u32.to_le_bytes());
    p[8..16].copy_from_slice(&autoid.to_le_bytes());
    p[16..23].copy_from_slice(&date_time(2023, 6, 16, 9, 0, 0));
    p
}

#[test]
fn test_hero11_single_media_file() {
    let image = ImageBuilder::new()
        .record(3, &hero11_media(3_904_000, 57_357_517, HANDLE, "HERO11 Black"))
        .build();

    let result = parse(&image);
    assert!(result.header_valid);
    assert_eq!(result.schema_version, SchemaVersion::Hero11Plus);
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    assert!(!result.partial_scan);
    assert_eq!(result.media_files.len(), 1);

    assert_eq!(result.engine.page_size, DEFAULT_PAGE_SIZE);
    assert_eq!(result.engine.mco_version, None);

    let media = &result.media_files[0];
    assert_eq!(media.object_id, 1);
    assert_eq!(media.duration, Some(3904.0));
    assert_eq!(media.size_bytes, Some(57_357_517));
    assert_eq!(media.file_handle, Some(FileHandle(HANDLE)));
    assert_eq!(media.estimated_path.as_deref(), Some("100GOPRO/GH010069.MP4"));
    assert_eq!(media.camera_model.as_deref(), Some("HERO11 Black"));
    assert_eq!(media.tag_count, Some(2));
    assert_eq!(
        media.creation_time.map(|t| t.to_string()).as_deref(),
        Some("2023-06-15T14:30:05")
    );
}

#[test]
fn test_body_follows_object_id() {
    let body = hero11_media(3_904_000, 57_357_517, HANDLE, "HERO11 Black");
    let image = ImageBuilder::new().record_with_oid(3, 42, &body).build();

    // header, then the 8-byte object id, then the declared body
    let at = DATA_REGION_START;
    assert_eq!(image[at + 16..at + 16 + OID_SIZE], 42u64.to_le_bytes());
    assert_eq!(image[at + 16 + OID_SIZE..at + 16 + OID_SIZE + body.len()], body[..]);

    let result = parse(&image);
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    let media = &result.media_files[0];
    assert_eq!(media.object_id, 42);
    assert_eq!(media.duration, Some(3904.0));
    assert_eq!(media.file_handle, Some(FileHandle(HANDLE)));
    assert_eq!(media.camera_model.as_deref(), Some("HERO11 Black"));
}

#[test]
fn test_engine_version_reported() {
    let mut image = ImageBuilder::new()
        .record(3, &hero11_media(1_000, 1, HANDLE, "HERO11 Black"))
        .build();
    image[0x0C10..0x0C12].copy_from_slice(&8u16.to_le_bytes());
    image[0x0C12..0x0C14].copy_from_slice(&1u16.to_le_bytes());
    image[0x0C14..0x0C16].copy_from_slice(&1947u16.to_le_bytes());

    let result = parse(&image);
    let version = result.engine.mco_version.unwrap();
    assert_eq!(version.to_string(), "8.1.1947");
    assert_eq!(result.media_files.len(), 1);
}

#[test]
fn test_full_hero11_database() {
    let image = ImageBuilder::new()
        .record(1, &global(17))
        .record(2, &{
            let mut p = HANDLE.to_le_bytes().to_vec();
            p.push(1);
            p
        })
        .record(3, &hero11_media(1_000, 1, HANDLE, "HERO12 Black"))
        .record(
            4,
            &grouped(GROUPED_EX_SIZE_HERO11, HANDLE, 3840, 2160, 60_000, 1_001),
        )
        .record(4, &{
            let mut p = grouped(GROUPED_EX_SIZE_HERO11, HANDLE + 1, 1920, 1080, 30, 1);
            for (i, b) in p[57..73].iter_mut().enumerate() {
                *b = i as u8 + 1;
            }
            p
        })
        .build();

    let result = Decoder::default().parse(&image);
    assert_eq!(result.record_count, 5);
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);

    let global = result.global_info.as_ref().unwrap();
    assert_eq!(global.autoid, Some(17));
    assert_eq!(global.version.map(|v| v.to_string()).as_deref(), Some("1.2"));

    assert_eq!(result.file_handles, vec![FileHandle(HANDLE)]);

    assert_eq!(result.video_groups.len(), 2);
    let fps = result.video_groups[0].fps.unwrap();
    assert!((fps - 59.94).abs() < 0.01);
    assert_eq!(result.video_groups[1].fps, Some(30.0));
    assert_eq!(result.video_groups[1].width, Some(1920));
    assert_eq!(result.video_groups[0].content_id, None);
    assert_eq!(
        result.video_groups[1].content_id.as_deref(),
        Some("0807060504030201100f0e0d0c0b0a09")
    );
    assert_eq!(result.video_groups[1].object_id, 5);

    // frame size comes from the group with the same handle
    assert_eq!(result.media_files[0].width, Some(3840));
    assert_eq!(result.media_files[0].height, Some(2160));
}

#[test]
fn test_hero5_database() {
    let image = ImageBuilder::new()
        .record(3, &hero5_media(10_500, HANDLE))
        .record(4, &grouped(GROUPED_EX_SIZE_HERO5, HANDLE, 2704, 1520, 48, 1))
        .build();

    let result = parse(&image);
    assert_eq!(result.schema_version, SchemaVersion::Hero5To8);
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    assert_eq!(result.media_files[0].duration, Some(10.5));
    assert_eq!(result.media_files[0].camera_model, None);
    assert_eq!(result.video_groups[0].content_id, None);
    assert_eq!(result.media_files[0].width, Some(2704));
}

#[test]
fn test_corrupt_header_resync() {
    let mut bad = RecordHeader {
        flags: 0,
        table_id: 9,
        record_size: 134,
        next_ptr: 0,
    }
    .to_bytes()
    .to_vec();
    bad.resize(16 + 134, 0xAB);

    let mut image = ImageBuilder::new().build();
    image.extend_from_slice(&bad);
    // 304 is the first multiple of the resync step past 300
    image.resize(DATA_REGION_START + 304, 0);
    let media = hero11_media(2_000, 5, HANDLE, "HERO11 Black");
    let header = RecordHeader {
        flags: 0,
        table_id: 3,
        record_size: SINGLE_EX_SIZE_HERO11,
        next_ptr: 0,
    };
    image.extend_from_slice(&header.to_bytes());
    image.extend_from_slice(&7u64.to_le_bytes());
    image.extend_from_slice(&media);

    let result = parse(&image);
    assert!(!result.partial_scan);
    assert_eq!(result.media_files.len(), 1);
    assert_eq!(result.media_files[0].duration, Some(2.0));
    assert_eq!(result.media_files[0].object_id, 7);
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].starts_with("record scan desync"));
}

#[test]
fn test_unrecoverable_corruption_keeps_prior_records() {
    let mut image = ImageBuilder::new()
        .record(3, &hero11_media(1_000, 1, HANDLE, "HERO11 Black"))
        .record(3, &hero11_media(2_000, 2, HANDLE + 1, "HERO11 Black"))
        .build();
    image.extend(std::iter::repeat(0x5A).take(8192));

    let result = parse(&image);
    assert!(result.partial_scan);
    assert_eq!(result.media_files.len(), 2);
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].starts_with("record scan abandoned"));
}

#[test]
fn test_first_single_ex_decides_schema() {
    let image = ImageBuilder::new()
        .record(3, &hero5_media(1_000, HANDLE))
        .record(3, &hero11_media(1_000, 1, HANDLE, "HERO11 Black"))
        .build();

    let result = parse(&image);
    assert_eq!(result.schema_version, SchemaVersion::Hero5To8);
    assert_eq!(result.media_files.len(), 2);
    assert!(result
        .warnings
        .iter()
        .any(|w| w.starts_with("schema ambiguous")));
}

#[test]
fn test_no_single_ex_records() {
    let image = ImageBuilder::new().record(1, &global(3)).build();

    let result = parse(&image);
    assert_eq!(result.schema_version, SchemaVersion::UnknownBestEffort);
    assert_eq!(result.global_info.unwrap().autoid, Some(3));
    assert_eq!(result.warnings.len(), 1);
}

#[test]
fn test_garbage_slot_between_records() {
    let image = ImageBuilder::new()
        .record(3, &hero11_media(1_000, 1, HANDLE, "HERO11 Black"))
        .garbage(&[0x01, 0x02, 0x07, 0x00, 0xFF, 0xFF, 0xFF, 0x7F])
        .record(3, &hero11_media(2_000, 2, HANDLE + 1, "HERO11 Black"))
        .build();

    let result = parse(&image);
    assert_eq!(result.media_files.len(), 2);
    assert!(!result.partial_scan);
    assert_eq!(result.warnings.len(), 1);
}

#[test]
fn test_parse_mapped_file() {
    let image = ImageBuilder::new()
        .record(3, &hero11_media(3_904_000, 57_357_517, HANDLE, "HERO11 Black"))
        .build();
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&image).unwrap();

    let db = DatabaseFile::open(file.path()).unwrap();
    assert_eq!(db.parse(&Decoder::default()), parse(&image));
}

#[test]
fn test_custom_resync_config() {
    let mut config = DecoderConfig::default();
    config.resync.window = 64;
    let image = ImageBuilder::new()
        .garbage(&[0xAB; 64])
        .record(3, &hero11_media(1_000, 1, HANDLE, "HERO11 Black"))
        .build();

    // the next header is 256 bytes away, outside the narrowed window
    let narrow = Decoder::new(config).unwrap().parse(&image);
    assert!(narrow.partial_scan);
    assert!(narrow.media_files.is_empty());

    let wide = parse(&image);
    assert!(!wide.partial_scan);
    assert_eq!(wide.media_files.len(), 1);
}

#[test]
fn test_decoder_rejects_zero_alignment() {
    let mut config = DecoderConfig::default();
    config.record_alignment = 0;
    assert!(matches!(Decoder::new(config), Err(MdbError::ConfigError(_))));
}

#[test]
fn test_result_serializes() {
    let image = ImageBuilder::new()
        .record(3, &hero11_media(1_000, 1, HANDLE, "HERO11 Black"))
        .build();
    let result = parse(&image);

    let value = toml::Value::try_from(&result.media_files[0]).unwrap();
    assert_eq!(
        value.get("file_handle").and_then(toml::Value::as_str),
        Some("0x0100006400000045")
    );
    assert_eq!(
        value.get("creation_time").and_then(toml::Value::as_str),
        Some("2023-06-15T14:30:05")
    );
}

proptest! {
    #[test]
    fn prop_arbitrary_bytes_terminate(bytes in proptest::collection::vec(any::<u8>(), 0..16_384)) {
        // Debug output, since arbitrary float32 fields may be NaN
        let first = format!("{:?}", parse(&bytes));
        prop_assert_eq!(first, format!("{:?}", parse(&bytes)));
    }

    #[test]
    fn prop_arbitrary_data_region(tail in proptest::collection::vec(any::<u8>(), 0..8_192)) {
        let mut image = ImageBuilder::new().build();
        image.extend_from_slice(&tail);
        let result = parse(&image);
        prop_assert!(result.header_valid);
        prop_assert!(result.record_count <= tail.len() / 17 + 1);
    }
}
