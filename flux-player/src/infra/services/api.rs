//! API service trait
//!
//! Domain code talks to the server only through [`ApiService`], so tests
//! can swap in [`RecordingApi`](crate::infra::testing::RecordingApi).

use std::fmt::Debug;

use async_trait::async_trait;
use flux_model::{
    CurrentVideo, PlaybackUpdate, Record, RecordId, UserConfiguration,
    VideoId, VideoInfo,
};

use crate::infra::errors::ApiResult;

#[async_trait]
pub trait ApiService: Send + Sync + Debug {
    /// Fetch a record by its own id or by the id of a video it contains
    async fn fetch_record(&self, id: &str) -> ApiResult<Record>;

    async fn fetch_video(&self, id: &VideoId) -> ApiResult<VideoInfo>;

    /// Resume target of a record: its stored playback or its first video
    async fn fetch_current_video(
        &self,
        record_id: &RecordId,
    ) -> ApiResult<CurrentVideo>;

    async fn update_playback(
        &self,
        record_id: &RecordId,
        update: &PlaybackUpdate,
    ) -> ApiResult<()>;

    /// Forget the stored progress for a record
    async fn delete_playback(&self, record_id: &RecordId) -> ApiResult<()>;

    async fn fetch_user_configuration(&self) -> ApiResult<UserConfiguration>;

    async fn put_user_configuration(
        &self,
        configuration: &UserConfiguration,
    ) -> ApiResult<()>;
}

pub type SharedApi = std::sync::Arc<dyn ApiService>;
