//! Playback position: what is shown, what is committed, what is reported
//!
//! `visual_time` tracks the media element while playing and the pointer while
//! scrubbing. `committed_time` moves only at decision points: a load (resume
//! offset), a seek commit and a skip. The server learns the position at most
//! once per [`REPORT_INTERVAL_SECS`] of video time.

use flux_model::{PlaybackUpdate, SettingsPatch, VideoId};
use log::{debug, trace, warn};
use tokio_util::task::TaskTracker;

use super::state::{WatchPatch, WatchStore};
use super::video::{MediaElement, SeekPointer};
use crate::domains::session::SessionStore;
use crate::infra::constants::player::persistence::{
    REPORT_INTERVAL_SECS, VOLUME_DEBOUNCE,
};
use crate::infra::constants::player::{rate, seeking, volume};
use crate::infra::services::api::SharedApi;
use crate::infra::tasks::spawn_tracked;
use crate::infra::time::SharedClock;
use crate::infra::timing::{Debounce, Throttle};

/// Bookkeeping that is never rendered
#[derive(Debug)]
struct PlaybackSession {
    /// Rounded video time of the last report (or of the last commit)
    last_persisted_at: f64,
    /// Latest pointer-derived time while the seek pointer is down
    seek_candidate: Option<f64>,
    /// Offset to apply once the media element can seek
    pending_resume: Option<f64>,
    drag_throttle: Throttle,
}

impl PlaybackSession {
    fn new(resume_at: f64) -> Self {
        Self {
            last_persisted_at: resume_at.round(),
            seek_candidate: None,
            pending_resume: Some(resume_at),
            drag_throttle: Throttle::new(seeking::DRAG_THROTTLE),
        }
    }
}

#[derive(Debug)]
pub struct PlaybackPositionController {
    watch: WatchStore,
    session: SessionStore,
    api: SharedApi,
    clock: SharedClock,
    tasks: TaskTracker,
    playback: PlaybackSession,
    volume_write: Debounce<u8>,
}

fn round_rate(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl PlaybackPositionController {
    pub fn new(
        watch: WatchStore,
        session: SessionStore,
        api: SharedApi,
        clock: SharedClock,
        tasks: TaskTracker,
    ) -> Self {
        Self {
            watch,
            session,
            api,
            clock,
            tasks,
            playback: PlaybackSession::new(0.0),
            volume_write: Debounce::new(VOLUME_DEBOUNCE),
        }
    }

    /// Begin a new session for `video_id`, starting at `resume_at` seconds
    pub fn load(&mut self, video_id: VideoId, resume_at: f64) {
        let resume_at = if resume_at.is_finite() {
            resume_at.max(0.0)
        } else {
            0.0
        };
        debug!("[Playback] Loading {} at {:.1}s", video_id, resume_at);

        self.playback = PlaybackSession::new(resume_at);
        let settings = self.session.settings();
        self.watch.set(
            WatchPatch::default()
                .video_id(Some(video_id))
                .video(None)
                .visual_time(resume_at)
                .committed_time(resume_at)
                .duration(0.0)
                .paused(false)
                .seek_pointer_down(false)
                .seek_dragging(false)
                .playback_rate(rate::DEFAULT)
                .volume(settings.volume)
                .muted(settings.muted)
                .playback_error(None),
        );
    }

    /// The media element has metadata: apply resume offset, rate and the
    /// user's volume settings, then start playing.
    pub fn media_ready(&mut self, media: &mut dyn MediaElement) {
        let duration = media.duration().unwrap_or(0.0);
        let state = self.watch.get();
        let settings = self.session.settings();

        if let Some(resume_at) = self.playback.pending_resume.take() {
            let resume_at = if duration > 0.0 {
                resume_at.min(duration)
            } else {
                resume_at
            };
            if resume_at > 0.0 {
                media.set_current_time(resume_at);
            }
        }
        media.set_playback_rate(state.playback_rate);
        media.set_volume(settings.gain());
        media.set_muted(settings.muted);
        if !state.paused && !state.seek_pointer_down {
            media.play();
        }

        self.watch.set(
            WatchPatch::default()
                .duration(duration)
                .volume(settings.volume)
                .muted(settings.muted),
        );
    }

    /// The media element reported progress
    pub fn time_update(&mut self, media: &dyn MediaElement) {
        let state = self.watch.get();
        if state.seek_pointer_down {
            return;
        }

        let current = media.current_time();
        let mut patch = WatchPatch::default().visual_time(current);
        if let Some(duration) = media.duration()
            && duration != state.duration
        {
            patch = patch.duration(duration);
        }
        self.watch.set(patch);

        if current > self.playback.last_persisted_at + REPORT_INTERVAL_SECS {
            self.persist(current);
            self.playback.last_persisted_at = current.round();
        }
    }

    fn persist(&self, timestamp: f64) {
        let state = self.watch.get();
        let (Some(record), Some(video_id)) = (state.record, state.video_id)
        else {
            trace!("[Playback] No record yet, skipping position report");
            return;
        };
        // The record of the previous video lingers until the new fetch lands
        if record.find_video(&video_id).is_none() {
            trace!(
                "[Playback] {} not in record {} yet, skipping position report",
                video_id, record.id
            );
            return;
        }

        let api = self.api.clone();
        let record_id = record.id;
        let update = PlaybackUpdate {
            video_id,
            timestamp,
        };
        spawn_tracked(&self.tasks, "position report", async move {
            if let Err(err) = api.update_playback(&record_id, &update).await {
                warn!("[Playback] Position report failed: {}", err);
            }
        });
    }

    /// Pointer went down on the seek bar
    pub fn seek_pressed(
        &mut self,
        media: &mut dyn MediaElement,
        pointer: SeekPointer,
    ) {
        media.pause();
        let candidate = pointer.time_for(self.duration(media));
        self.playback.seek_candidate = Some(candidate);
        self.watch.set(
            WatchPatch::default()
                .seek_pointer_down(true)
                .committed_time(candidate)
                .visual_time(candidate),
        );
    }

    /// Pointer moved; only meaningful while it is down
    pub fn seek_moved(&mut self, media: &dyn MediaElement, pointer: SeekPointer) {
        if !self.watch.with(|state| state.seek_pointer_down) {
            return;
        }
        let candidate = pointer.time_for(self.duration(media));
        self.playback.seek_candidate = Some(candidate);

        let now = self.clock.now();
        let watch = &self.watch;
        let shown = self.playback.drag_throttle.call(now, || {
            watch.set(
                WatchPatch::default()
                    .seek_dragging(true)
                    .visual_time(candidate),
            );
        });
        if shown.is_none() && !watch.with(|state| state.seek_dragging) {
            watch.set(WatchPatch::default().seek_dragging(true));
        }
    }

    /// Pointer released: make the candidate authoritative
    pub fn seek_released(
        &mut self,
        media: &mut dyn MediaElement,
        pointer: Option<SeekPointer>,
    ) {
        let state = self.watch.get();
        let target = if state.seek_pointer_down {
            pointer
                .map(|pointer| pointer.time_for(self.duration(media)))
                .or(self.playback.seek_candidate)
        } else {
            None
        };
        self.playback.seek_candidate = None;
        self.playback.drag_throttle.reset();

        let mut patch = WatchPatch::default()
            .seek_pointer_down(false)
            .seek_dragging(false);
        if let Some(target) = target {
            media.set_current_time(target);
            self.playback.last_persisted_at = target.round();
            patch = patch.committed_time(target).visual_time(target);
        }
        self.watch.set(patch);

        if target.is_some() && !state.paused {
            media.play();
        }
    }

    /// Flip the user's pause intent. While the seek pointer is down the
    /// element stays paused; the release restores playback from the flag.
    pub fn toggle_paused(&mut self, media: &mut dyn MediaElement) {
        let (paused, pointer_down) = self
            .watch
            .with(|state| (!state.paused, state.seek_pointer_down));
        if paused {
            media.pause();
        } else if !pointer_down {
            media.play();
        }
        self.watch.set(WatchPatch::default().paused(paused));
    }

    /// Pause without toggling; used when playback reaches the end
    pub fn force_paused(&mut self, media: &mut dyn MediaElement) {
        media.pause();
        self.watch.set(WatchPatch::default().paused(true));
    }

    /// Jump by `delta` seconds, clamped to the video
    pub fn skip(&mut self, media: &mut dyn MediaElement, delta: f64) {
        if self.watch.with(|state| state.seek_pointer_down) {
            return;
        }
        let duration = self.duration(media);
        let target = (media.current_time() + delta).clamp(0.0, duration.max(0.0));
        media.set_current_time(target);
        self.playback.last_persisted_at = target.round();
        self.watch.set(
            WatchPatch::default()
                .committed_time(target)
                .visual_time(target),
        );
    }

    pub fn slower(&mut self, media: &mut dyn MediaElement) {
        self.step_rate(media, -rate::STEP);
    }

    pub fn faster(&mut self, media: &mut dyn MediaElement) {
        self.step_rate(media, rate::STEP);
    }

    fn step_rate(&mut self, media: &mut dyn MediaElement, step: f64) {
        let current = self.watch.with(|state| state.playback_rate);
        let next = round_rate((current + step).clamp(rate::MIN, rate::MAX));
        if next == current {
            return;
        }
        media.set_playback_rate(next);
        self.watch.set(WatchPatch::default().playback_rate(next));
    }

    /// One wheel notch over the volume control. Negative `delta_y` (wheel
    /// up) raises the volume.
    pub fn volume_wheel(&mut self, media: &mut dyn MediaElement, delta_y: f64) {
        if delta_y == 0.0 {
            return;
        }
        let step = if delta_y < 0.0 {
            volume::WHEEL_STEP
        } else {
            -volume::WHEEL_STEP
        };
        let current = i16::from(self.watch.with(|state| state.volume));
        let next = (current + step).clamp(0, i16::from(volume::MAX)) as u8;

        media.set_volume(f64::from(next) / 100.0);
        self.watch.set(WatchPatch::default().volume(next));
        self.volume_write.push(self.clock.now(), next);
    }

    pub fn toggle_muted(&mut self, media: &mut dyn MediaElement) {
        let muted = !self.watch.with(|state| state.muted);
        media.set_muted(muted);
        self.watch.set(WatchPatch::default().muted(muted));
        self.session.put_user_configuration(SettingsPatch::muted(muted));
    }

    /// Flush debounced work whose delay has passed
    pub fn tick(&mut self) {
        if let Some(volume) = self.volume_write.poll(self.clock.now()) {
            debug!("[Playback] Saving volume {}", volume);
            self.session
                .put_user_configuration(SettingsPatch::volume(volume));
        }
    }

    /// Forget stored progress for the active record
    pub fn forget_progress(&self) {
        let Some(record) = self.watch.with(|state| state.record.clone()) else {
            return;
        };
        let api = self.api.clone();
        spawn_tracked(&self.tasks, "progress reset", async move {
            if let Err(err) = api.delete_playback(&record.id).await {
                warn!("[Playback] Failed to reset progress: {}", err);
            }
        });
    }

    /// Best known duration: the element's, else the last one stored
    fn duration(&self, media: &dyn MediaElement) -> f64 {
        media
            .duration()
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or_else(|| self.watch.with(|state| state.duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::player::state::WatchState;
    use crate::infra::tasks::drain;
    use crate::infra::testing::{FakeMediaElement, ManualClock, RecordingApi};
    use flux_model::{Record, RecordContent, VideoInfo};
    use std::sync::Arc;
    use std::time::Duration;

    struct Harness {
        controller: PlaybackPositionController,
        watch: WatchStore,
        api: Arc<RecordingApi>,
        clock: ManualClock,
        tasks: TaskTracker,
        media: FakeMediaElement,
    }

    fn harness() -> Harness {
        let api = Arc::new(RecordingApi::new());
        let tasks = TaskTracker::new();
        let clock = ManualClock::new();
        let watch = WatchStore::new(WatchState::default());
        let session = SessionStore::new(api.clone(), tasks.clone(), false);
        let controller = PlaybackPositionController::new(
            watch.clone(),
            session,
            api.clone(),
            Arc::new(clock.clone()),
            tasks.clone(),
        );
        let record =
            Record::new("r1", RecordContent::Movie(VideoInfo::new("v1"))).unwrap();
        watch.set(WatchPatch::default().record(Some(record)));
        Harness {
            controller,
            watch,
            api,
            clock,
            tasks,
            media: FakeMediaElement::new(100.0),
        }
    }

    #[test]
    fn load_commits_resume_offset_and_ready_applies_it() {
        let mut h = harness();
        h.controller.load("v1".into(), 42.0);
        assert_eq!(h.watch.get().committed_time, 42.0);

        h.controller.media_ready(&mut h.media);
        let media = h.media.state();
        assert_eq!(media.current_time, 42.0);
        assert!(media.playing);
        assert_eq!(h.watch.get().duration, 100.0);
    }

    #[tokio::test]
    async fn reports_at_most_once_per_interval() {
        let mut h = harness();
        h.controller.load("v1".into(), 0.0);

        for tenth in 0..=120 {
            h.media.play_to(f64::from(tenth) / 10.0);
            h.controller.time_update(&h.media);
        }
        drain(&h.tasks).await;

        let updates = h.api.playback_updates();
        assert_eq!(updates.len(), 2);
        assert!(updates[0].timestamp > 5.0 && updates[0].timestamp < 5.2);
        assert!(updates[1].timestamp > 10.0 && updates[1].timestamp < 10.2);
        assert_eq!(updates[0].video_id.as_str(), "v1");
    }

    #[tokio::test]
    async fn no_report_before_record_is_known() {
        let mut h = harness();
        h.watch.set(WatchPatch::default().record(None));
        h.controller.load("v1".into(), 0.0);
        h.media.play_to(30.0);
        h.controller.time_update(&h.media);
        drain(&h.tasks).await;
        assert!(h.api.playback_updates().is_empty());
    }

    #[test]
    fn seek_press_pauses_and_commits_candidate() {
        let mut h = harness();
        h.controller.load("v1".into(), 0.0);
        h.controller.media_ready(&mut h.media);

        h.controller
            .seek_pressed(&mut h.media, SeekPointer::new(25.0, 100.0));

        let state = h.watch.get();
        assert!(state.seek_pointer_down);
        assert_eq!(state.committed_time, 25.0);
        assert_eq!(state.visual_time, 25.0);
        assert!(!h.media.state().playing);
    }

    #[test]
    fn time_updates_are_ignored_while_pointer_is_down() {
        let mut h = harness();
        h.controller.load("v1".into(), 0.0);
        h.controller
            .seek_pressed(&mut h.media, SeekPointer::new(50.0, 100.0));

        h.media.play_to(3.0);
        h.controller.time_update(&h.media);

        assert_eq!(h.watch.get().visual_time, 50.0);
    }

    #[test]
    fn drag_updates_are_throttled() {
        let mut h = harness();
        h.controller.load("v1".into(), 0.0);
        h.controller
            .seek_pressed(&mut h.media, SeekPointer::new(10.0, 100.0));

        h.controller.seek_moved(&h.media, SeekPointer::new(20.0, 100.0));
        h.clock.advance_millis(5);
        h.controller.seek_moved(&h.media, SeekPointer::new(30.0, 100.0));

        let state = h.watch.get();
        assert!(state.seek_dragging);
        assert_eq!(state.visual_time, 20.0);

        h.clock.advance(Duration::from_millis(16));
        h.controller.seek_moved(&h.media, SeekPointer::new(40.0, 100.0));
        assert_eq!(h.watch.get().visual_time, 40.0);
    }

    #[test]
    fn move_without_press_is_ignored() {
        let mut h = harness();
        h.controller.load("v1".into(), 0.0);
        h.controller.seek_moved(&h.media, SeekPointer::new(40.0, 100.0));
        assert!(!h.watch.get().seek_dragging);
    }

    #[test]
    fn release_commits_last_candidate_and_clears_flags() {
        let mut h = harness();
        h.controller.load("v1".into(), 0.0);
        h.controller.media_ready(&mut h.media);
        h.controller
            .seek_pressed(&mut h.media, SeekPointer::new(10.0, 100.0));
        h.controller.seek_moved(&h.media, SeekPointer::new(20.0, 100.0));
        h.clock.advance_millis(1);
        // throttled away, but still the latest candidate
        h.controller.seek_moved(&h.media, SeekPointer::new(70.0, 100.0));

        h.controller.seek_released(&mut h.media, None);

        let state = h.watch.get();
        assert!(!state.seek_pointer_down);
        assert!(!state.seek_dragging);
        assert_eq!(state.committed_time, 70.0);
        assert_eq!(state.visual_time, 70.0);
        let media = h.media.state();
        assert_eq!(media.current_time, 70.0);
        assert!(media.playing);
    }

    #[test]
    fn release_keeps_user_pause() {
        let mut h = harness();
        h.controller.load("v1".into(), 0.0);
        h.controller.media_ready(&mut h.media);
        h.controller.toggle_paused(&mut h.media);

        h.controller
            .seek_pressed(&mut h.media, SeekPointer::new(30.0, 100.0));
        h.controller
            .seek_released(&mut h.media, Some(SeekPointer::new(60.0, 100.0)));

        assert_eq!(h.media.state().current_time, 60.0);
        assert!(!h.media.state().playing);
    }

    #[test]
    fn stray_release_only_clears_flags() {
        let mut h = harness();
        h.controller.load("v1".into(), 12.0);
        h.watch.set(WatchPatch::default().seek_dragging(true));

        h.controller.seek_released(&mut h.media, None);

        let state = h.watch.get();
        assert!(!state.seek_dragging);
        assert_eq!(state.committed_time, 12.0);
        assert!(h.media.state().seeks.is_empty());
    }

    #[test]
    fn pause_toggles_never_play_while_pointer_is_down() {
        let mut h = harness();
        h.controller.load("v1".into(), 0.0);
        h.controller.media_ready(&mut h.media);
        h.controller.toggle_paused(&mut h.media);
        h.controller
            .seek_pressed(&mut h.media, SeekPointer::new(40.0, 100.0));

        h.controller.toggle_paused(&mut h.media);

        let state = h.watch.get();
        assert!(state.seek_pointer_down);
        assert!(!state.paused);
        assert!(!h.media.state().playing);

        h.controller.seek_released(&mut h.media, None);
        assert!(h.media.state().playing);
    }

    #[test]
    fn media_ready_during_seek_stays_paused() {
        let mut h = harness();
        h.controller.load("v1".into(), 0.0);
        h.controller
            .seek_pressed(&mut h.media, SeekPointer::new(10.0, 100.0));

        h.controller.media_ready(&mut h.media);

        assert!(!h.media.state().playing);
    }

    #[tokio::test]
    async fn no_report_while_record_belongs_to_previous_video() {
        let mut h = harness();
        h.controller.load("other".into(), 0.0);
        h.media.play_to(30.0);
        h.controller.time_update(&h.media);
        drain(&h.tasks).await;
        assert!(h.api.playback_updates().is_empty());
    }

    #[test]
    fn rate_steps_within_bounds() {
        let mut h = harness();
        h.controller.load("v1".into(), 0.0);
        for _ in 0..10 {
            h.controller.faster(&mut h.media);
        }
        assert_eq!(h.watch.get().playback_rate, 2.0);
        assert_eq!(h.media.state().playback_rate, 2.0);

        for _ in 0..10 {
            h.controller.slower(&mut h.media);
        }
        assert_eq!(h.watch.get().playback_rate, 0.4);
        assert_eq!(h.media.state().playback_rate, 0.4);
    }

    #[test]
    fn skip_clamps_to_video() {
        let mut h = harness();
        h.controller.load("v1".into(), 0.0);
        h.media.play_to(97.0);
        h.controller.skip(&mut h.media, seeking::SEEK_FORWARD);
        assert_eq!(h.watch.get().committed_time, 100.0);

        h.media.play_to(2.0);
        h.controller.skip(&mut h.media, seeking::SEEK_BACKWARD);
        assert_eq!(h.media.state().current_time, 0.0);
    }

    #[tokio::test]
    async fn wheel_volume_is_saved_once_after_debounce() {
        let mut h = harness();
        h.controller.load("v1".into(), 0.0);

        h.controller.volume_wheel(&mut h.media, 1.0);
        h.clock.advance_millis(300);
        h.controller.volume_wheel(&mut h.media, 1.0);
        assert_eq!(h.watch.get().volume, 60);
        assert!((h.media.state().volume - 0.6).abs() < 1e-9);

        h.clock.advance_millis(500);
        h.controller.tick();
        drain(&h.tasks).await;
        assert!(h.api.calls().is_empty());

        h.clock.advance_millis(600);
        h.controller.tick();
        drain(&h.tasks).await;
        assert_eq!(h.api.calls().len(), 1);
    }

    #[test]
    fn wheel_volume_saturates() {
        let mut h = harness();
        h.controller.load("v1".into(), 0.0);
        for _ in 0..3 {
            h.controller.volume_wheel(&mut h.media, -1.0);
        }
        assert_eq!(h.watch.get().volume, 100);
    }
}
