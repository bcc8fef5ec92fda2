//! Observable store with field-granular subscriptions
//!
//! A store owns one flat state struct. Writers submit patches (one `Option`
//! per field); after the shallow merge every subscriber of every field present
//! in the patch is called, whether or not the value actually changed.
//! Over-notification is accepted, missed notifications are not.
//!
//! State structs are declared with [`store_state!`](crate::store_state), which
//! generates the field enum and the patch type, so the full set of fields is
//! known statically.
//!
//! ```ignore
//! store_state! {
//!     pub struct CounterState {
//!         count: u32 => Count,
//!     }
//!     field CounterField;
//!     patch CounterPatch;
//! }
//!
//! let store = ObservableStore::new(CounterState { count: 0 });
//! let sub = store.subscribe(CounterField::Count, || println!("changed"));
//! store.set(CounterPatch::default().count(1));
//! sub.unsubscribe();
//! ```

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// Callback invoked on field notification
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// A flat state struct usable in an [`ObservableStore`]
pub trait StoreState: Clone + Send + 'static {
    /// One variant per field
    type Field: Copy + Eq + Hash + Debug + Send + Sync + 'static;
    /// Partial state, one optional value per field
    type Patch: Default + Send;

    /// Every field, in declaration order
    const FIELDS: &'static [Self::Field];

    /// Shallow-merge `patch` into `self`, returning the fields it carried in
    /// declaration order
    fn apply(&mut self, patch: Self::Patch) -> Vec<Self::Field>;
}

/// Declare a store state struct together with its field enum and patch type.
///
/// Every field must be listed here; there is no way to add one later.
#[macro_export]
macro_rules! store_state {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$fmeta:meta])* $field:ident : $ty:ty => $variant:ident ),+ $(,)?
        }
        field $field_enum:ident;
        patch $patch:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name {
            $( $(#[$fmeta])* pub $field: $ty ),+
        }

        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $field_enum {
            $( $variant ),+
        }

        #[derive(Debug, Default)]
        $vis struct $patch {
            $( pub $field: ::std::option::Option<$ty> ),+
        }

        impl $patch {
            $(
                pub fn $field(mut self, value: $ty) -> Self {
                    self.$field = ::std::option::Option::Some(value);
                    self
                }
            )+
        }

        impl $crate::common::store::StoreState for $name {
            type Field = $field_enum;
            type Patch = $patch;

            const FIELDS: &'static [$field_enum] = &[ $( $field_enum::$variant ),+ ];

            fn apply(&mut self, patch: $patch) -> ::std::vec::Vec<$field_enum> {
                let mut touched = ::std::vec::Vec::new();
                $(
                    if let ::std::option::Option::Some(value) = patch.$field {
                        self.$field = value;
                        touched.push($field_enum::$variant);
                    }
                )+
                touched
            }
        }
    };
}

/// Ordered set of callbacks; ids keep removals exact when the same closure
/// is registered twice.
#[derive(Default)]
pub(crate) struct SubscriberSet {
    next_id: u64,
    entries: Vec<(u64, Callback)>,
}

impl SubscriberSet {
    pub(crate) fn add(&mut self, callback: Callback) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, callback));
        id
    }

    pub(crate) fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub(crate) fn snapshot(&self) -> Vec<Callback> {
        self.entries.iter().map(|(_, cb)| Arc::clone(cb)).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Registration token returned by `subscribe`.
///
/// Dropping it keeps the callback registered; call
/// [`Subscription::unsubscribe`] to remove exactly this registration.
#[must_use = "keep the subscription to be able to unsubscribe later"]
pub struct Subscription {
    remove: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub(crate) fn new(remove: impl FnOnce() + Send + 'static) -> Self {
        Self {
            remove: Some(Box::new(remove)),
        }
    }

    pub fn unsubscribe(mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.remove.is_some())
            .finish()
    }
}

struct Inner<T: StoreState> {
    state: T,
    initial: T,
    subscribers: HashMap<T::Field, SubscriberSet>,
}

/// Shared handle to a store; clones refer to the same state
pub struct ObservableStore<T: StoreState> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T: StoreState> Clone for ObservableStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: StoreState + Debug> Debug for ObservableStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableStore")
            .field("state", &self.inner.lock().state)
            .finish()
    }
}

impl<T: StoreState> ObservableStore<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: initial.clone(),
                initial,
                subscribers: HashMap::new(),
            })),
        }
    }

    /// Build the store from a factory that receives the store itself.
    ///
    /// The factory runs exactly once. Actions created inside it may keep a
    /// clone of the handle; reading the store from within the factory
    /// observes `T::default()`.
    pub fn with_factory<F>(factory: F) -> Self
    where
        T: Default,
        F: FnOnce(&ObservableStore<T>) -> T,
    {
        let store = Self::new(T::default());
        let initial = factory(&store);
        {
            let mut inner = store.inner.lock();
            inner.initial = initial;
        }
        store.reset();
        store
    }

    /// Snapshot of the current state
    pub fn get(&self) -> T {
        self.inner.lock().state.clone()
    }

    /// Read one value without cloning the whole state
    pub fn with<R>(&self, read: impl FnOnce(&T) -> R) -> R {
        read(&self.inner.lock().state)
    }

    /// Merge `patch` and notify subscribers of each field it carries
    pub fn set(&self, patch: T::Patch) {
        let callbacks = {
            let mut inner = self.inner.lock();
            let touched = inner.state.apply(patch);
            collect(&inner.subscribers, &touched)
        };
        for callback in callbacks {
            callback();
        }
    }

    /// Like [`set`](Self::set), computing the patch from the current snapshot
    pub fn update(&self, patch: impl FnOnce(&T) -> T::Patch) {
        let snapshot = self.get();
        self.set(patch(&snapshot));
    }

    /// Restore the initial snapshot and notify every field
    pub fn reset(&self) {
        let callbacks = {
            let mut inner = self.inner.lock();
            inner.state = inner.initial.clone();
            collect(&inner.subscribers, T::FIELDS)
        };
        for callback in callbacks {
            callback();
        }
    }

    pub fn subscribe(
        &self,
        field: T::Field,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> Subscription {
        let id = self
            .inner
            .lock()
            .subscribers
            .entry(field)
            .or_default()
            .add(Arc::new(callback));

        let weak: Weak<Mutex<Inner<T>>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade()
                && let Some(set) = inner.lock().subscribers.get_mut(&field)
            {
                set.remove(id);
            }
        })
    }

    pub fn subscriber_count(&self, field: T::Field) -> usize {
        self.inner
            .lock()
            .subscribers
            .get(&field)
            .map(SubscriberSet::len)
            .unwrap_or(0)
    }
}

fn collect<F: Eq + Hash>(
    subscribers: &HashMap<F, SubscriberSet>,
    fields: &[F],
) -> Vec<Callback> {
    fields
        .iter()
        .filter_map(|field| subscribers.get(field))
        .flat_map(SubscriberSet::snapshot)
        .collect()
}
