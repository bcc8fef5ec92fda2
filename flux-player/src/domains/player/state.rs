//! Observable state of the watch page

use flux_model::{Record, VideoId, VideoInfo};

use crate::common::store::ObservableStore;
use crate::infra::constants::player::rate;
use crate::store_state;

/// Inline playback failure shown over the video until the next load
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackError {
    pub message: String,
    /// Host-provided detail (media error code, message)
    pub diagnostic: String,
    /// Descriptor of the video that failed, for the diagnostics panel
    pub video: Option<VideoInfo>,
}

store_state! {
    /// Everything the watch page renders.
    ///
    /// `visual_time` follows the media element (or the pointer while
    /// seeking); `committed_time` only changes on load, seek commit and
    /// skips.
    pub struct WatchState {
        video_id: Option<VideoId> => VideoId,
        video: Option<VideoInfo> => Video,
        record: Option<Record> => Record,
        loading: bool => Loading,
        visual_time: f64 => VisualTime,
        committed_time: f64 => CommittedTime,
        duration: f64 => Duration,
        paused: bool => Paused,
        seek_pointer_down: bool => SeekPointerDown,
        seek_dragging: bool => SeekDragging,
        playback_rate: f64 => PlaybackRate,
        volume: u8 => Volume,
        muted: bool => Muted,
        controls_visible: bool => ControlsVisible,
        back_visible: bool => BackVisible,
        playback_error: Option<PlaybackError> => PlaybackError,
    }
    field WatchField;
    patch WatchPatch;
}

impl Default for WatchState {
    fn default() -> Self {
        Self {
            video_id: None,
            video: None,
            record: None,
            loading: false,
            visual_time: 0.0,
            committed_time: 0.0,
            duration: 0.0,
            paused: false,
            seek_pointer_down: false,
            seek_dragging: false,
            playback_rate: rate::DEFAULT,
            volume: 100,
            muted: false,
            controls_visible: true,
            back_visible: true,
            playback_error: None,
        }
    }
}

impl WatchState {
    /// Title line: record name, then video name when they differ
    pub fn title(&self) -> Option<String> {
        let video = self.video.as_ref().and_then(|v| v.name.clone());
        let record = self.record.as_ref().and_then(|r| r.name.clone());
        match (record, video) {
            (Some(record), Some(video)) if record != video => {
                Some(format!("{record}: {video}"))
            }
            (Some(name), _) | (None, Some(name)) => Some(name),
            (None, None) => None,
        }
    }
}

pub type WatchStore = ObservableStore<WatchState>;
