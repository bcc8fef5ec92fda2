//! Recording fakes for the API, the media element and the notifier

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use flux_model::{
    CurrentVideo, PlaybackPosition, PlaybackUpdate, Record, RecordId,
    UserConfiguration, VideoId, VideoInfo,
};
use parking_lot::Mutex;

use crate::domains::player::video::MediaElement;
use crate::infra::errors::{ApiError, ApiResult};
use crate::infra::notifier::{Notification, Notifier};
use crate::infra::services::api::ApiService;

/// One request seen by [`RecordingApi`]
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    FetchRecord(String),
    FetchVideo(VideoId),
    FetchCurrentVideo(RecordId),
    UpdatePlayback(RecordId, PlaybackUpdate),
    DeletePlayback(RecordId),
    FetchUserConfiguration,
    PutUserConfiguration(UserConfiguration),
}

#[derive(Debug, Default)]
struct Script {
    records: Vec<Record>,
    resume: HashMap<RecordId, f64>,
    delays: HashMap<String, Duration>,
    failures: HashMap<String, ApiError>,
    configuration: UserConfiguration,
    configuration_error: Option<ApiError>,
    fail_configuration_writes: bool,
    calls: Vec<ApiCall>,
}

impl Script {
    fn record_for(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|record| {
            record.id.as_str() == id || record.videos().any(|v| v.id.as_str() == id)
        })
    }
}

fn not_found(id: &str) -> ApiError {
    ApiError::Api {
        code: 404,
        short: "Not Found".into(),
        long: format!("Nothing indexed under {}", id),
    }
}

/// In-memory [`ApiService`] serving scripted records and recording every
/// call in arrival order
#[derive(Debug, Default)]
pub struct RecordingApi {
    script: Mutex<Script>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(self, record: Record) -> Self {
        self.add_record(record);
        self
    }

    pub fn add_record(&self, record: Record) {
        self.script.lock().records.push(record);
    }

    /// Stored progress returned by `fetch_current_video`
    pub fn set_resume(&self, record_id: impl Into<RecordId>, timestamp: f64) {
        self.script.lock().resume.insert(record_id.into(), timestamp);
    }

    /// Hold lookups of `id` (record or video) for `delay`
    pub fn delay_lookup(&self, id: impl Into<String>, delay: Duration) {
        self.script.lock().delays.insert(id.into(), delay);
    }

    pub fn fail_lookup(&self, id: impl Into<String>, error: ApiError) {
        self.script.lock().failures.insert(id.into(), error);
    }

    pub fn set_configuration(&self, configuration: UserConfiguration) {
        let mut script = self.script.lock();
        script.configuration = configuration;
        script.configuration_error = None;
    }

    pub fn set_configuration_error(&self, error: ApiError) {
        self.script.lock().configuration_error = Some(error);
    }

    pub fn fail_configuration_writes(&self) {
        self.script.lock().fail_configuration_writes = true;
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.script.lock().calls.clone()
    }

    pub fn playback_updates(&self) -> Vec<PlaybackUpdate> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::UpdatePlayback(_, update) => Some(update),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.script.lock().calls.clear();
    }

    /// Record the call and pick up any scripted delay or failure for `id`
    fn begin(&self, call: ApiCall, id: &str) -> (Option<Duration>, Option<ApiError>) {
        let mut script = self.script.lock();
        script.calls.push(call);
        (
            script.delays.get(id).copied(),
            script.failures.get(id).cloned(),
        )
    }
}

async fn hold(delay: Option<Duration>) {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl ApiService for RecordingApi {
    async fn fetch_record(&self, id: &str) -> ApiResult<Record> {
        let (delay, failure) = self.begin(ApiCall::FetchRecord(id.to_string()), id);
        hold(delay).await;
        if let Some(error) = failure {
            return Err(error);
        }
        self.script
            .lock()
            .record_for(id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn fetch_video(&self, id: &VideoId) -> ApiResult<VideoInfo> {
        let (delay, failure) =
            self.begin(ApiCall::FetchVideo(id.clone()), id.as_str());
        hold(delay).await;
        if let Some(error) = failure {
            return Err(error);
        }
        let script = self.script.lock();
        script
            .record_for(id.as_str())
            .and_then(|record| record.find_video(id))
            .cloned()
            .ok_or_else(|| not_found(id.as_str()))
    }

    async fn fetch_current_video(
        &self,
        record_id: &RecordId,
    ) -> ApiResult<CurrentVideo> {
        let (delay, failure) = self.begin(
            ApiCall::FetchCurrentVideo(record_id.clone()),
            record_id.as_str(),
        );
        hold(delay).await;
        if let Some(error) = failure {
            return Err(error);
        }
        let script = self.script.lock();
        let record = script
            .record_for(record_id.as_str())
            .ok_or_else(|| not_found(record_id.as_str()))?;
        let video = record
            .videos()
            .next()
            .cloned()
            .ok_or_else(|| not_found(record_id.as_str()))?;
        Ok(CurrentVideo {
            video,
            playback: script.resume.get(record_id).map(|timestamp| {
                PlaybackPosition {
                    timestamp: Some(*timestamp),
                }
            }),
        })
    }

    async fn update_playback(
        &self,
        record_id: &RecordId,
        update: &PlaybackUpdate,
    ) -> ApiResult<()> {
        self.begin(
            ApiCall::UpdatePlayback(record_id.clone(), update.clone()),
            record_id.as_str(),
        );
        Ok(())
    }

    async fn delete_playback(&self, record_id: &RecordId) -> ApiResult<()> {
        self.begin(ApiCall::DeletePlayback(record_id.clone()), record_id.as_str());
        self.script.lock().resume.remove(record_id);
        Ok(())
    }

    async fn fetch_user_configuration(&self) -> ApiResult<UserConfiguration> {
        let mut script = self.script.lock();
        script.calls.push(ApiCall::FetchUserConfiguration);
        match &script.configuration_error {
            Some(error) => Err(error.clone()),
            None => Ok(script.configuration.clone()),
        }
    }

    async fn put_user_configuration(
        &self,
        configuration: &UserConfiguration,
    ) -> ApiResult<()> {
        let mut script = self.script.lock();
        script
            .calls
            .push(ApiCall::PutUserConfiguration(configuration.clone()));
        if script.fail_configuration_writes {
            return Err(ApiError::Network("connection refused".into()));
        }
        script.configuration = configuration.clone();
        Ok(())
    }
}

/// What the fake media element has been told
#[derive(Debug, Clone, PartialEq)]
pub struct FakeMediaState {
    pub playing: bool,
    pub current_time: f64,
    pub duration: Option<f64>,
    pub volume: f64,
    pub muted: bool,
    pub playback_rate: f64,
    pub looping: bool,
    /// Every `set_current_time` in order
    pub seeks: Vec<f64>,
}

/// Media element double; clones share state so a test can keep a handle
/// after giving one to a controller
#[derive(Debug, Clone)]
pub struct FakeMediaElement {
    state: Arc<Mutex<FakeMediaState>>,
}

impl FakeMediaElement {
    pub fn new(duration: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeMediaState {
                playing: false,
                current_time: 0.0,
                duration: Some(duration),
                volume: 1.0,
                muted: false,
                playback_rate: 1.0,
                looping: false,
                seeks: Vec::new(),
            })),
        }
    }

    pub fn state(&self) -> FakeMediaState {
        self.state.lock().clone()
    }

    /// Move the playhead as playback would, without recording a seek
    pub fn play_to(&self, secs: f64) {
        self.state.lock().current_time = secs;
    }

    pub fn set_looping(&self, looping: bool) {
        self.state.lock().looping = looping;
    }
}

impl MediaElement for FakeMediaElement {
    fn play(&mut self) {
        self.state.lock().playing = true;
    }

    fn pause(&mut self) {
        self.state.lock().playing = false;
    }

    fn current_time(&self) -> f64 {
        self.state.lock().current_time
    }

    fn set_current_time(&mut self, secs: f64) {
        let mut state = self.state.lock();
        state.current_time = secs;
        state.seeks.push(secs);
    }

    fn duration(&self) -> Option<f64> {
        self.state.lock().duration
    }

    fn set_volume(&mut self, gain: f64) {
        self.state.lock().volume = gain;
    }

    fn set_muted(&mut self, muted: bool) {
        self.state.lock().muted = muted;
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.state.lock().playback_rate = rate;
    }

    fn is_looping(&self) -> bool {
        self.state.lock().looping
    }
}

/// Notifier that keeps everything it was given
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().push(notification);
    }
}
