//! Playback position records exchanged with the playback service.

use crate::ids::VideoId;
use crate::record::VideoInfo;

/// Body of `POST /playback/{record}`: where the user currently is
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PlaybackUpdate {
    pub video_id: VideoId,
    /// Seconds into the video
    pub timestamp: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaybackPosition {
    #[cfg_attr(feature = "serde", serde(default))]
    pub timestamp: Option<f64>,
}

/// Where to continue a record: the stored playback if any, else its first
/// video
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurrentVideo {
    pub video: VideoInfo,
    #[cfg_attr(feature = "serde", serde(default))]
    pub playback: Option<PlaybackPosition>,
}

impl CurrentVideo {
    /// Resume offset in seconds, 0 when starting anew
    pub fn resume_at(&self) -> f64 {
        self.playback
            .and_then(|p| p.timestamp)
            .filter(|t| t.is_finite() && *t >= 0.0)
            .unwrap_or(0.0)
    }
}
