//! End-of-video chaining and idle fading of the controls

use flux_model::VideoId;
use log::{debug, info};

use super::state::{PlaybackError, WatchPatch, WatchStore};
use super::video::MediaElement;
use crate::domains::location::{LocationStore, SearchParams};
use crate::domains::media::sequence;
use crate::domains::session::SessionStore;
use crate::infra::constants::player::{controls, messages};
use crate::infra::constants::routes;
use crate::infra::time::SharedClock;
use crate::infra::timing::DeadlineTimer;

#[derive(Debug)]
pub struct AutoplayAndIdleUiController {
    watch: WatchStore,
    session: SessionStore,
    location: LocationStore,
    clock: SharedClock,
    hide_timer: DeadlineTimer,
    /// False while the pointer rests over the toolbar
    should_hide: bool,
}

impl AutoplayAndIdleUiController {
    pub fn new(
        watch: WatchStore,
        session: SessionStore,
        location: LocationStore,
        clock: SharedClock,
    ) -> Self {
        Self {
            watch,
            session,
            location,
            clock,
            hide_timer: DeadlineTimer::new(),
            should_hide: true,
        }
    }

    /// Playback reached the end. Returns the video navigated to, if any.
    pub fn on_ended(&mut self, media: &mut dyn MediaElement) -> Option<VideoId> {
        let state = self.watch.get();
        let autoplay = self.session.settings().autoplay;

        let next = match (&state.record, &state.video_id) {
            (Some(record), Some(current))
                if autoplay
                    && !media.is_looping()
                    && state.playback_error.is_none() =>
            {
                Some(sequence::next(record, current)).filter(|next| next != current)
            }
            _ => None,
        };

        match next {
            Some(next) => {
                info!("[Autoplay] Continuing with {}", next);
                self.location.navigate(
                    None,
                    Some(SearchParams::new().with(routes::PARAM_ID, next.as_str())),
                    false,
                );
                Some(next)
            }
            None => {
                debug!("[Autoplay] Stopping at end of video");
                media.pause();
                let duration = media.duration().unwrap_or(state.duration);
                self.watch.set(
                    WatchPatch::default()
                        .paused(true)
                        .visual_time(duration),
                );
                None
            }
        }
    }

    /// The media element failed; keep the message up until the next load
    pub fn on_media_error(&mut self, media: &mut dyn MediaElement, diagnostic: String) {
        let video = self.watch.with(|state| state.video.clone());
        log::error!("[Playback] Media error: {}", diagnostic);
        media.pause();
        self.watch.set(
            WatchPatch::default()
                .paused(true)
                .playback_error(Some(PlaybackError {
                    message: messages::PLAYBACK_ERROR.to_string(),
                    diagnostic,
                    video,
                })),
        );
    }

    /// Pointer moved or a key was pressed: show everything and restart the
    /// hide countdown
    pub fn activity(&mut self) {
        self.hide_timer.arm(self.clock.now(), controls::HIDE_DELAY);
        let state = self.watch.get();
        if !state.controls_visible || !state.back_visible {
            self.watch.set(
                WatchPatch::default()
                    .controls_visible(true)
                    .back_visible(true),
            );
        }
    }

    pub fn pointer_over_toolbar(&mut self, over: bool) {
        self.should_hide = !over;
    }

    /// Hide the controls if the countdown elapsed and nothing holds them
    pub fn tick(&mut self) {
        if self.hide_timer.fire_if_due(self.clock.now()) && self.should_hide {
            self.watch.set(
                WatchPatch::default()
                    .controls_visible(false)
                    .back_visible(false),
            );
        }
    }

    pub fn cancel_hide(&mut self) {
        self.hide_timer.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::location::MemoryHistory;
    use crate::domains::player::state::WatchState;
    use crate::infra::testing::{FakeMediaElement, ManualClock, RecordingApi};
    use flux_model::{Record, RecordContent, SettingsPatch, VideoInfo};
    use std::sync::Arc;
    use tokio_util::task::TaskTracker;

    struct Harness {
        controller: AutoplayAndIdleUiController,
        watch: WatchStore,
        history: MemoryHistory,
        clock: ManualClock,
        media: FakeMediaElement,
    }

    fn harness(autoplay: bool, current: &str) -> Harness {
        let api = Arc::new(RecordingApi::new());
        let session = SessionStore::new(api, TaskTracker::new(), autoplay);
        let history = MemoryHistory::new(format!("/watch?id={current}"));
        let location = LocationStore::new(history.clone());
        let clock = ManualClock::new();
        let watch = WatchStore::new(WatchState::default());
        let record = Record::new(
            "mix",
            RecordContent::Collection(vec![
                VideoInfo::new("v1"),
                VideoInfo::new("v2"),
            ]),
        )
        .unwrap();
        watch.set(
            WatchPatch::default()
                .record(Some(record))
                .video_id(Some(current.into()))
                .duration(90.0),
        );
        let controller = AutoplayAndIdleUiController::new(
            watch.clone(),
            session,
            location,
            Arc::new(clock.clone()),
        );
        Harness {
            controller,
            watch,
            history,
            clock,
            media: FakeMediaElement::new(90.0),
        }
    }

    #[test]
    fn autoplay_replaces_entry_with_next_video() {
        let mut h = harness(true, "v1");
        let next = h.controller.on_ended(&mut h.media);
        assert_eq!(next.map(|id| id.to_string()).as_deref(), Some("v2"));
        assert_eq!(h.history.urls(), vec!["/watch?id=v2"]);
    }

    #[test]
    fn last_video_stops_and_pins_to_duration() {
        let mut h = harness(true, "v2");
        assert!(h.controller.on_ended(&mut h.media).is_none());
        let state = h.watch.get();
        assert!(state.paused);
        assert_eq!(state.visual_time, 90.0);
        assert_eq!(h.history.urls(), vec!["/watch?id=v2"]);
    }

    #[test]
    fn without_autoplay_nothing_navigates() {
        let mut h = harness(false, "v1");
        assert!(h.controller.on_ended(&mut h.media).is_none());
        assert!(h.watch.get().paused);
    }

    #[test]
    fn looping_element_does_not_advance() {
        let mut h = harness(true, "v1");
        h.media.set_looping(true);
        assert!(h.controller.on_ended(&mut h.media).is_none());
    }

    #[test]
    fn media_error_suppresses_advance() {
        let mut h = harness(true, "v1");
        h.controller
            .on_media_error(&mut h.media, "MEDIA_ERR_SRC_NOT_SUPPORTED".into());
        assert!(h.controller.on_ended(&mut h.media).is_none());

        let error = h.watch.get().playback_error.unwrap();
        assert_eq!(error.message, messages::PLAYBACK_ERROR);
        assert_eq!(error.diagnostic, "MEDIA_ERR_SRC_NOT_SUPPORTED");
    }

    #[test]
    fn controls_hide_after_idle_delay() {
        let mut h = harness(false, "v1");
        h.controller.activity();
        h.clock.advance_millis(1999);
        h.controller.tick();
        assert!(h.watch.get().controls_visible);

        h.clock.advance_millis(1);
        h.controller.tick();
        let state = h.watch.get();
        assert!(!state.controls_visible);
        assert!(!state.back_visible);
    }

    #[test]
    fn activity_restarts_the_countdown() {
        let mut h = harness(false, "v1");
        h.controller.activity();
        h.clock.advance_millis(1500);
        h.controller.activity();
        h.clock.advance_millis(1500);
        h.controller.tick();
        assert!(h.watch.get().controls_visible);
    }

    #[test]
    fn hovered_toolbar_stays_visible() {
        let mut h = harness(false, "v1");
        h.controller.pointer_over_toolbar(true);
        h.controller.activity();
        h.clock.advance_millis(2500);
        h.controller.tick();
        assert!(h.watch.get().controls_visible);

        // leaving does not hide until the next countdown elapses
        h.controller.pointer_over_toolbar(false);
        h.controller.tick();
        assert!(h.watch.get().controls_visible);
        h.controller.activity();
        h.clock.advance_millis(2000);
        h.controller.tick();
        assert!(!h.watch.get().controls_visible);
    }

    #[test]
    fn autoplay_setting_change_is_seen_immediately() {
        let api = Arc::new(RecordingApi::new());
        let mut h = harness(false, "v1");
        let session = SessionStore::new(api, TaskTracker::new(), false);
        h.controller.session = session.clone();
        session.put_user_configuration(SettingsPatch::autoplay(true));
        assert!(h.controller.on_ended(&mut h.media).is_some());
    }
}
