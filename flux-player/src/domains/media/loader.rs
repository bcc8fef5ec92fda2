//! Fetches the descriptor and owning record of the active video
//!
//! Each `load` cancels the previous one. A cancelled fetch never writes to
//! the watch store and never notifies, so a slow answer for an old id cannot
//! overwrite the current one.

use flux_model::VideoId;
use log::{debug, warn};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::domains::player::state::{WatchPatch, WatchStore};
use crate::infra::notifier::SharedNotifier;
use crate::infra::services::api::SharedApi;
use crate::infra::tasks::spawn_tracked;

#[derive(Debug)]
pub struct ContentLoader {
    api: SharedApi,
    watch: WatchStore,
    notifier: SharedNotifier,
    tasks: TaskTracker,
    current: Option<CancellationToken>,
}

impl ContentLoader {
    pub fn new(
        api: SharedApi,
        watch: WatchStore,
        notifier: SharedNotifier,
        tasks: TaskTracker,
    ) -> Self {
        Self {
            api,
            watch,
            notifier,
            tasks,
            current: None,
        }
    }

    /// Start fetching `video_id` and the record containing it
    pub fn load(&mut self, video_id: VideoId) {
        self.cancel();
        let token = CancellationToken::new();
        self.current = Some(token.clone());
        self.watch.set(WatchPatch::default().loading(true));

        let api = self.api.clone();
        let watch = self.watch.clone();
        let notifier = self.notifier.clone();
        let label = format!("content fetch for {}", video_id);

        let spawned = spawn_tracked(&self.tasks, &label, async move {
            let fetches = async {
                futures::join!(
                    api.fetch_video(&video_id),
                    api.fetch_record(video_id.as_str())
                )
            };
            let (video, record) = tokio::select! {
                _ = token.cancelled() => {
                    debug!("[Loader] Discarding fetch for {}", video_id);
                    return;
                }
                results = fetches => results,
            };
            if token.is_cancelled() {
                return;
            }

            let mut patch = WatchPatch::default().loading(false);
            match video {
                Ok(video) => patch = patch.video(Some(video)),
                Err(err) => {
                    warn!("[Loader] Video {} failed: {}", video_id, err);
                    notifier.notify(err.to_notification());
                }
            }
            match record {
                Ok(record) => patch = patch.record(Some(record)),
                Err(err) => {
                    warn!("[Loader] Record for {} failed: {}", video_id, err);
                    notifier.notify(err.to_notification());
                }
            }
            watch.set(patch);
        });

        if !spawned {
            self.watch.set(WatchPatch::default().loading(false));
        }
    }

    /// Drop interest in the in-flight fetch, if any
    pub fn cancel(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }

    pub fn is_loading(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
            && self.watch.with(|state| state.loading)
    }
}

impl Drop for ContentLoader {
    fn drop(&mut self) {
        self.cancel();
    }
}
