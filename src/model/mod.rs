//! Media files, video groups and global state

mod derive;
mod entities;
mod handle;

pub use derive::{derive_entity, global_info, media_file, video_group, Entity};
pub use entities::{frames_per_second, GlobalInfo, MediaFile, SegmentId, VideoGroup};
pub use handle::FileHandle;
