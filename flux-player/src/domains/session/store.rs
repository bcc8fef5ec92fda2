use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use flux_model::{SettingsPatch, UserConfiguration, UserSettings};
use log::{debug, info, trace, warn};
use tokio::sync::Mutex;
use tokio_util::task::TaskTracker;

use crate::common::store::{ObservableStore, Subscription};
use crate::infra::errors::{ApiError, ApiResult};
use crate::infra::services::api::SharedApi;
use crate::infra::tasks::spawn_tracked;
use crate::store_state;

store_state! {
    pub struct SessionState {
        /// `None` until the first configuration request has answered
        logged_in: Option<bool> => LoggedIn,
        configuration: UserConfiguration => Configuration,
    }
    field SessionField;
    patch SessionPatch;
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            logged_in: None,
            configuration: UserConfiguration::default(),
        }
    }
}

/// Orders configuration writes so the server ends with the newest value
#[derive(Debug, Default)]
struct WriteQueue {
    /// Generation of the most recently queued write
    latest: AtomicU64,
    /// Held for the duration of one PUT
    in_flight: Mutex<()>,
}

/// Session store plus the actions that write to it
#[derive(Clone, Debug)]
pub struct SessionStore {
    store: ObservableStore<SessionState>,
    api: SharedApi,
    tasks: TaskTracker,
    writes: Arc<WriteQueue>,
}

impl SessionStore {
    pub fn new(api: SharedApi, tasks: TaskTracker, autoplay_default: bool) -> Self {
        let store = ObservableStore::with_factory(|_| SessionState {
            logged_in: None,
            configuration: UserConfiguration::default()
                .with_settings_patch(&SettingsPatch::autoplay(autoplay_default)),
        });
        Self {
            store,
            api,
            tasks,
            writes: Arc::new(WriteQueue::default()),
        }
    }

    pub fn get(&self) -> SessionState {
        self.store.get()
    }

    pub fn settings(&self) -> UserSettings {
        self.store.with(|state| state.configuration.settings_or_default())
    }

    pub fn subscribe(
        &self,
        field: SessionField,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> Subscription {
        self.store.subscribe(field, callback)
    }

    /// Forget the user (logout) and return to the initial snapshot
    pub fn reset(&self) {
        self.store.reset();
    }

    /// Fetch the user's configuration; an unauthorized answer marks the
    /// session as logged out rather than failing.
    pub async fn load_configuration(&self) -> ApiResult<()> {
        match self.api.fetch_user_configuration().await {
            Ok(configuration) => {
                info!("[Session] User configuration loaded");
                self.store.set(
                    SessionPatch::default()
                        .logged_in(Some(true))
                        .configuration(configuration),
                );
                Ok(())
            }
            Err(err) if err.code() == Some(401) => {
                debug!("[Session] Not logged in");
                self.store.set(SessionPatch::default().logged_in(Some(false)));
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Merge `patch` locally right away, then write the merged configuration
    /// to the server without waiting for it. A failed write is logged and
    /// the local value is kept.
    ///
    /// Writes go out one at a time. A queued write that has been overtaken
    /// by a newer one is skipped, so the last PUT always carries the latest
    /// merge.
    pub fn put_user_configuration(&self, patch: SettingsPatch) {
        if patch.is_empty() {
            return;
        }
        let merged = self
            .store
            .with(|state| state.configuration.clone().with_settings_patch(&patch));
        self.store
            .set(SessionPatch::default().configuration(merged.clone()));

        let api = self.api.clone();
        let writes = Arc::clone(&self.writes);
        let generation = writes.latest.fetch_add(1, Ordering::SeqCst) + 1;
        spawn_tracked(&self.tasks, "user configuration write", async move {
            let _slot = writes.in_flight.lock().await;
            if writes.latest.load(Ordering::SeqCst) != generation {
                trace!("[Session] Skipping superseded configuration write");
                return;
            }
            if let Err(err) = api.put_user_configuration(&merged).await {
                log_write_failure(&err);
            }
        });
    }
}

fn log_write_failure(err: &ApiError) {
    warn!("[Session] Failed to save user configuration: {}", err);
}
