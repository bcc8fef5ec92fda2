//! The explicitly constructed set of stores and services
//!
//! Nothing in the crate reaches for a global: controllers get clones of the
//! handles they need from an [`AppContext`]. A context lives as long as the
//! host page; logout resets its stores instead of rebuilding it.

use std::sync::Arc;

use tokio_util::task::TaskTracker;

use crate::domains::location::{BrowserHistory, LocationStore};
use crate::domains::player::state::{WatchState, WatchStore};
use crate::domains::session::SessionStore;
use crate::infra::config::Config;
use crate::infra::notifier::SharedNotifier;
use crate::infra::services::api::SharedApi;
use crate::infra::tasks;
use crate::infra::time::SharedClock;

#[derive(Clone, Debug)]
pub struct AppContext {
    pub api: SharedApi,
    pub location: LocationStore,
    pub session: SessionStore,
    pub watch: WatchStore,
    pub notifier: SharedNotifier,
    pub clock: SharedClock,
    /// Fire-and-forget requests spawned by controllers
    pub tasks: TaskTracker,
}

impl AppContext {
    pub fn new(
        config: &Config,
        api: SharedApi,
        history: impl BrowserHistory + 'static,
        notifier: SharedNotifier,
        clock: SharedClock,
    ) -> Self {
        let tasks = TaskTracker::new();
        Self {
            session: SessionStore::new(
                Arc::clone(&api),
                tasks.clone(),
                config.autoplay_default,
            ),
            location: LocationStore::new(history),
            watch: WatchStore::new(WatchState::default()),
            api,
            notifier,
            clock,
            tasks,
        }
    }

    /// Wait for every spawned request to finish
    pub async fn settle(&self) {
        tasks::drain(&self.tasks).await;
    }

    /// Drop all per-user state, e.g. on logout
    pub fn reset(&self) {
        self.session.reset();
        self.watch.reset();
    }
}
