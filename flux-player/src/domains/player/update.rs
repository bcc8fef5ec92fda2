//! Watch page dispatcher
//!
//! Owns the media element and the three watch controllers, and routes each
//! [`WatchMessage`] to them. Location changes arrive through a store
//! subscription and are queued, so a navigation triggered while handling a
//! message (autoplay) is processed right after it.

use flux_model::VideoId;
use log::{debug, trace};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use super::autoplay::AutoplayAndIdleUiController;
use super::messages::WatchMessage;
use super::position::PlaybackPositionController;
use super::video::MediaElement;
use crate::app::AppContext;
use crate::common::store::Subscription;
use crate::domains::location::{LocationChannel, SearchParams};
use crate::domains::media::loader::ContentLoader;
use crate::domains::media::sequence;
use crate::infra::constants::player::seeking;
use crate::infra::constants::routes;

#[derive(Debug)]
pub struct WatchController {
    ctx: AppContext,
    media: Box<dyn MediaElement>,
    position: PlaybackPositionController,
    playback: AutoplayAndIdleUiController,
    loader: ContentLoader,
    inbox: UnboundedReceiver<WatchMessage>,
    location_subscriptions: Vec<Subscription>,
}

impl WatchController {
    /// Attach to the watch page; the current location is reconciled on the
    /// first `update`
    pub fn new(ctx: AppContext, media: Box<dyn MediaElement>) -> Self {
        let (sender, inbox) = mpsc::unbounded_channel();
        let location_subscriptions = [LocationChannel::Pathname, LocationChannel::Search]
            .into_iter()
            .map(|channel| {
                let sender = sender.clone();
                ctx.location.subscribe(channel, move || {
                    let _ = sender.send(WatchMessage::LocationChanged);
                })
            })
            .collect();
        let _ = sender.send(WatchMessage::LocationChanged);

        let position = PlaybackPositionController::new(
            ctx.watch.clone(),
            ctx.session.clone(),
            ctx.api.clone(),
            ctx.clock.clone(),
            ctx.tasks.clone(),
        );
        let playback = AutoplayAndIdleUiController::new(
            ctx.watch.clone(),
            ctx.session.clone(),
            ctx.location.clone(),
            ctx.clock.clone(),
        );
        let loader = ContentLoader::new(
            ctx.api.clone(),
            ctx.watch.clone(),
            ctx.notifier.clone(),
            ctx.tasks.clone(),
        );

        Self {
            ctx,
            media,
            position,
            playback,
            loader,
            inbox,
            location_subscriptions,
        }
    }

    /// Handle `message`, then anything it queued
    pub fn update(&mut self, message: WatchMessage) {
        self.pump();
        self.handle(message);
        self.pump();
    }

    /// Process queued location changes
    pub fn pump(&mut self) {
        while let Ok(message) = self.inbox.try_recv() {
            self.handle(message);
        }
    }

    fn handle(&mut self, message: WatchMessage) {
        trace!("[Watch] {}", message.name());
        let media = self.media.as_mut();

        match message {
            WatchMessage::LocationChanged => self.sync_location(),
            WatchMessage::MediaReady => self.position.media_ready(media),
            WatchMessage::TimeUpdate => self.position.time_update(media),
            WatchMessage::Ended => {
                self.playback.on_ended(media);
            }
            WatchMessage::MediaError(diagnostic) => {
                self.playback.on_media_error(media, diagnostic)
            }
            WatchMessage::SeekPressed(pointer) => {
                self.playback.activity();
                self.position.seek_pressed(media, pointer)
            }
            WatchMessage::SeekMoved(pointer) => {
                self.playback.activity();
                self.position.seek_moved(media, pointer)
            }
            WatchMessage::SeekReleased(pointer) => {
                self.playback.activity();
                self.position.seek_released(media, pointer)
            }
            WatchMessage::TogglePause => self.position.toggle_paused(media),
            WatchMessage::SkipBackward => {
                self.position.skip(media, seeking::SEEK_BACKWARD)
            }
            WatchMessage::SkipForward => {
                self.position.skip(media, seeking::SEEK_FORWARD)
            }
            WatchMessage::Slower => self.position.slower(media),
            WatchMessage::Faster => self.position.faster(media),
            WatchMessage::VolumeWheel(delta_y) => {
                self.position.volume_wheel(media, delta_y)
            }
            WatchMessage::ToggleMute => self.position.toggle_muted(media),
            WatchMessage::PlayPrevious => self.step(sequence::previous),
            WatchMessage::PlayNext => self.step(sequence::next),
            WatchMessage::ForgetProgress => self.position.forget_progress(),
            WatchMessage::PointerActivity => self.playback.activity(),
            WatchMessage::ToolbarEntered => {
                self.playback.pointer_over_toolbar(true)
            }
            WatchMessage::ToolbarLeft => {
                self.playback.pointer_over_toolbar(false)
            }
            WatchMessage::Tick => {
                self.position.tick();
                self.playback.tick();
            }
            WatchMessage::NavigateBack => {
                self.ctx.location.open(routes::BROWSE, SearchParams::new())
            }
        }
    }

    /// Load whatever `?id=` now names, if it differs from the active video
    fn sync_location(&mut self) {
        let location = self.ctx.location.get();
        if location.pathname != routes::WATCH {
            self.loader.cancel();
            return;
        }
        let Some(id) = location.search.get(routes::PARAM_ID) else {
            return;
        };
        let video_id = VideoId::from(id);
        if self.ctx.watch.with(|state| state.video_id.as_ref() == Some(&video_id)) {
            return;
        }

        let resume_at = location
            .search
            .get(routes::PARAM_TIME)
            .and_then(|t| t.parse::<f64>().ok())
            .unwrap_or(0.0);
        debug!("[Watch] Switching to {}", video_id);
        self.position.load(video_id.clone(), resume_at);
        self.loader.load(video_id);
        self.playback.activity();
    }

    /// Manual previous/next: a new history entry, unlike autoplay
    fn step(&mut self, pick: fn(&flux_model::Record, &VideoId) -> VideoId) {
        let state = self.ctx.watch.get();
        let (Some(record), Some(current)) = (state.record, state.video_id) else {
            return;
        };
        let target = pick(&record, &current);
        if target != current {
            self.ctx.location.set_search(
                SearchParams::new().with(routes::PARAM_ID, target.as_str()),
            );
        }
    }

    pub fn media(&self) -> &dyn MediaElement {
        self.media.as_ref()
    }

    /// Detach from the location store and drop any in-flight fetch
    pub fn close(mut self) {
        self.loader.cancel();
        self.playback.cancel_hide();
        for subscription in self.location_subscriptions.drain(..) {
            subscription.unsubscribe();
        }
    }
}
