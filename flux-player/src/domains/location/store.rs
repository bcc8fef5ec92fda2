//! Routing state kept in step with session history
//!
//! Unlike the generic [`ObservableStore`](crate::common::store::ObservableStore)
//! this store has exactly two notification channels, `pathname` and `search`,
//! and every write also pushes or replaces a history entry.

use std::sync::{Arc, Weak};

use log::debug;
use parking_lot::Mutex;

use super::history::BrowserHistory;
use super::search_params::SearchParams;
use crate::common::store::{Callback, SubscriberSet, Subscription};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationState {
    pub pathname: String,
    pub search: SearchParams,
}

impl LocationState {
    /// Split a history URL into path and query; any fragment is dropped
    pub fn from_url(url: &str) -> Self {
        let url = url.split('#').next().unwrap_or_default();
        let (pathname, query) = url.split_once('?').unwrap_or((url, ""));
        Self {
            pathname: if pathname.is_empty() {
                "/".to_string()
            } else {
                pathname.to_string()
            },
            search: SearchParams::parse(query),
        }
    }

    /// `pathname`, plus `?query` when the query is non-empty
    pub fn to_url(&self) -> String {
        let query = self.search.to_query_string();
        if query.is_empty() {
            self.pathname.clone()
        } else {
            format!("{}?{}", self.pathname, query)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationChannel {
    Pathname,
    Search,
}

struct Inner {
    state: LocationState,
    history: Box<dyn BrowserHistory>,
    pathname_subscribers: SubscriberSet,
    search_subscribers: SubscriberSet,
}

impl Inner {
    fn subscribers(&mut self, channel: LocationChannel) -> &mut SubscriberSet {
        match channel {
            LocationChannel::Pathname => &mut self.pathname_subscribers,
            LocationChannel::Search => &mut self.search_subscribers,
        }
    }
}

/// Shared handle to the routing state
#[derive(Clone)]
pub struct LocationStore {
    inner: Arc<Mutex<Inner>>,
}

impl std::fmt::Debug for LocationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationStore")
            .field("state", &self.inner.lock().state)
            .finish()
    }
}

impl LocationStore {
    /// Start from whatever entry the history currently points at
    pub fn new(history: impl BrowserHistory + 'static) -> Self {
        let state = LocationState::from_url(&history.location());
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state,
                history: Box::new(history),
                pathname_subscribers: SubscriberSet::default(),
                search_subscribers: SubscriberSet::default(),
            })),
        }
    }

    pub fn get(&self) -> LocationState {
        self.inner.lock().state.clone()
    }

    pub fn pathname(&self) -> String {
        self.inner.lock().state.pathname.clone()
    }

    pub fn search(&self) -> SearchParams {
        self.inner.lock().state.search.clone()
    }

    /// Update pathname and/or search and record the result in history.
    ///
    /// `search` replaces the current parameters wholesale. With
    /// `use_history` a new entry is pushed, otherwise the current one is
    /// replaced. Only the channels that were given are notified.
    pub fn navigate(
        &self,
        pathname: Option<&str>,
        search: Option<SearchParams>,
        use_history: bool,
    ) {
        let callbacks = {
            let mut inner = self.inner.lock();
            let mut callbacks = Vec::new();
            if let Some(pathname) = pathname {
                inner.state.pathname = pathname.to_string();
                callbacks.extend(inner.pathname_subscribers.snapshot());
            }
            if let Some(search) = search {
                inner.state.search = search;
                callbacks.extend(inner.search_subscribers.snapshot());
            }

            let url = inner.state.to_url();
            debug!(
                "[Location] {} {}",
                if use_history { "push" } else { "replace" },
                url
            );
            if use_history {
                inner.history.push_state(&url);
            } else {
                inner.history.replace_state(&url);
            }
            callbacks
        };
        run(callbacks);
    }

    pub fn navigate_to(&self, pathname: &str) {
        self.navigate(Some(pathname), None, true);
    }

    /// Go to `pathname` with exactly `search`
    pub fn open(&self, pathname: &str, search: SearchParams) {
        self.navigate(Some(pathname), Some(search), true);
    }

    pub fn set_search(&self, search: SearchParams) {
        self.navigate(None, Some(search), true);
    }

    /// Re-read the location after the host moved through history
    /// (back/forward) and notify both channels.
    pub fn handle_popstate(&self) {
        let callbacks = {
            let mut inner = self.inner.lock();
            inner.state = LocationState::from_url(&inner.history.location());
            debug!("[Location] popstate to {}", inner.state.to_url());
            let mut callbacks = inner.pathname_subscribers.snapshot();
            callbacks.extend(inner.search_subscribers.snapshot());
            callbacks
        };
        run(callbacks);
    }

    pub fn subscribe(
        &self,
        channel: LocationChannel,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> Subscription {
        let id = self
            .inner
            .lock()
            .subscribers(channel)
            .add(Arc::new(callback));
        let weak: Weak<Mutex<Inner>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.lock().subscribers(channel).remove(id);
            }
        })
    }

    pub fn subscriber_count(&self, channel: LocationChannel) -> usize {
        self.inner.lock().subscribers(channel).len()
    }

    /// Live view of pathname and search, refreshed independently
    pub fn watch(&self) -> LocationWatcher {
        LocationWatcher::new(self)
    }
}

fn run(callbacks: Vec<Callback>) {
    for callback in callbacks {
        callback();
    }
}

/// Pathname and search as last notified.
///
/// Unsubscribes from the store when dropped.
#[derive(Debug)]
pub struct LocationWatcher {
    current: Arc<Mutex<LocationState>>,
    subscriptions: Vec<Subscription>,
}

impl LocationWatcher {
    fn new(store: &LocationStore) -> Self {
        let current = Arc::new(Mutex::new(store.get()));

        let pathname = {
            let cell = Arc::downgrade(&current);
            let source = Arc::downgrade(&store.inner);
            store.subscribe(LocationChannel::Pathname, move || {
                if let (Some(cell), Some(source)) =
                    (cell.upgrade(), source.upgrade())
                {
                    let pathname = source.lock().state.pathname.clone();
                    cell.lock().pathname = pathname;
                }
            })
        };
        let search = {
            let cell = Arc::downgrade(&current);
            let source = Arc::downgrade(&store.inner);
            store.subscribe(LocationChannel::Search, move || {
                if let (Some(cell), Some(source)) =
                    (cell.upgrade(), source.upgrade())
                {
                    let search = source.lock().state.search.clone();
                    cell.lock().search = search;
                }
            })
        };

        Self {
            current,
            subscriptions: vec![pathname, search],
        }
    }

    pub fn pathname(&self) -> String {
        self.current.lock().pathname.clone()
    }

    pub fn search(&self) -> SearchParams {
        self.current.lock().search.clone()
    }
}

impl Drop for LocationWatcher {
    fn drop(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::location::history::MemoryHistory;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(
        store: &LocationStore,
        channel: LocationChannel,
    ) -> (Arc<AtomicUsize>, Subscription) {
        let hits = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&hits);
        let sub = store.subscribe(channel, move || {
            inner.fetch_add(1, Ordering::SeqCst);
        });
        (hits, sub)
    }

    #[test]
    fn url_round_trip() {
        let state = LocationState::from_url("/watch?id=v1&t=30#frag");
        assert_eq!(state.pathname, "/watch");
        assert_eq!(state.search.get("id"), Some("v1"));
        assert_eq!(state.to_url(), "/watch?id=v1&t=30");
        assert_eq!(LocationState::from_url("/browse").to_url(), "/browse");
    }

    #[test]
    fn navigate_pushes_and_notifies_given_channels_only() {
        let history = MemoryHistory::new("/browse");
        let store = LocationStore::new(history.clone());
        let (paths, _p) = counting(&store, LocationChannel::Pathname);
        let (searches, _s) = counting(&store, LocationChannel::Search);

        store.navigate(
            Some("/watch"),
            Some(SearchParams::new().with("id", "v1")),
            true,
        );
        store.set_search(SearchParams::new().with("id", "v2"));

        assert_eq!(paths.load(Ordering::SeqCst), 1);
        assert_eq!(searches.load(Ordering::SeqCst), 2);
        assert_eq!(
            history.urls(),
            vec!["/browse", "/watch?id=v1", "/watch?id=v2"]
        );
    }

    #[test]
    fn navigate_without_history_replaces_entry() {
        let history = MemoryHistory::new("/watch?id=v1");
        let store = LocationStore::new(history.clone());

        store.navigate(None, Some(SearchParams::new().with("id", "v2")), false);

        assert_eq!(history.urls(), vec!["/watch?id=v2"]);
        assert_eq!(store.search().get("id"), Some("v2"));
    }

    #[test]
    fn empty_search_serializes_to_bare_path() {
        let history = MemoryHistory::new("/watch?id=v1");
        let store = LocationStore::new(history.clone());
        store.open("/browse", SearchParams::new());
        assert_eq!(history.location(), "/browse");
    }

    #[test]
    fn popstate_rereads_history_and_notifies_both() {
        let history = MemoryHistory::new("/browse");
        let store = LocationStore::new(history.clone());
        store.open("/watch", SearchParams::new().with("id", "v1"));
        let (paths, _p) = counting(&store, LocationChannel::Pathname);
        let (searches, _s) = counting(&store, LocationChannel::Search);

        assert!(history.back());
        store.handle_popstate();

        assert_eq!(store.pathname(), "/browse");
        assert!(store.search().is_empty());
        assert_eq!(paths.load(Ordering::SeqCst), 1);
        assert_eq!(searches.load(Ordering::SeqCst), 1);
        // popstate must not add entries
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn watcher_tracks_channels_and_detaches_on_drop() {
        let store = LocationStore::new(MemoryHistory::new("/browse"));
        let watcher = store.watch();
        assert_eq!(store.subscriber_count(LocationChannel::Search), 1);

        store.open("/watch", SearchParams::new().with("id", "v9"));
        assert_eq!(watcher.pathname(), "/watch");
        assert_eq!(watcher.search().get("id"), Some("v9"));

        drop(watcher);
        assert_eq!(store.subscriber_count(LocationChannel::Pathname), 0);
        assert_eq!(store.subscriber_count(LocationChannel::Search), 0);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let store = LocationStore::new(MemoryHistory::default());
        let (hits, sub) = counting(&store, LocationChannel::Pathname);
        sub.unsubscribe();
        store.navigate_to("/browse");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
