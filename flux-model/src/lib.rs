//! Core data model definitions shared across flux crates.
#![allow(missing_docs)]

pub mod envelope;
pub mod error;
pub mod ids;
pub mod playback;
pub mod record;
pub mod settings;

// Intentionally curated re-exports for downstream consumers.
pub use envelope::{ApiResponse, ErrorBody, RequestBody, ResponseMeta};
pub use error::{ModelError, Result as ModelResult};
pub use ids::{RecordId, SeasonId, ThumbnailId, TrackId, VideoId};
pub use playback::{CurrentVideo, PlaybackPosition, PlaybackUpdate};
pub use record::{
    Record, RecordContent, RecordType, Season, SeriesContent, TrackMetadata,
    VideoInfo,
};
pub use settings::{SettingsPatch, UserConfiguration, UserInfo, UserSettings};
