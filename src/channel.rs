//! Channel - synchronous one-to-many event delivery.
//!
//! Listeners are invoked directly on the publishing thread, in the order they
//! subscribed. A listener reports failure by returning [`ListenerError`]; the
//! first failure stops delivery and is handed back to the publisher.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use tracing::trace;

use crate::error::StoreError;

type Listener<E> = Arc<dyn Fn(&E) -> Result<(), ListenerError> + Send + Sync>;

struct Entry<E> {
    id: u64,
    listener: Listener<E>,
}

type Entries<E> = RwLock<Vec<Entry<E>>>;

/// Error returned by a listener to abort delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerError {
    reason: String,
}

impl ListenerError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub(crate) fn into_reason(self) -> String {
        self.reason
    }
}

impl fmt::Display for ListenerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for ListenerError {}

impl From<String> for ListenerError {
    fn from(reason: String) -> Self {
        Self::new(reason)
    }
}

impl From<&str> for ListenerError {
    fn from(reason: &str) -> Self {
        Self::new(reason)
    }
}

// Lets a listener use `?` on store calls it makes while handling an event.
impl From<StoreError> for ListenerError {
    fn from(err: StoreError) -> Self {
        Self::new(err.to_string())
    }
}

/// Typed publish/subscribe primitive.
pub struct Channel<E> {
    listeners: Arc<Entries<E>>,
    next_id: AtomicU64,
}

impl<E: 'static> Default for Channel<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> Channel<E> {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(RwLock::new(Vec::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a listener. It stays registered until the returned
    /// [`Subscription`] is cancelled; dropping the handle does not cancel.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&E) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        write(&self.listeners).push(Entry {
            id,
            listener: Arc::new(listener),
        });
        trace!(listener_id = id, "listener subscribed");

        let entries: Weak<Entries<E>> = Arc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(entries) = entries.upgrade() {
                write(&entries).retain(|entry| entry.id != id);
                trace!(listener_id = id, "listener cancelled");
            }
        })
    }

    /// Deliver `event` to every listener registered when the call starts.
    ///
    /// The listener list is copied before delivery, so listeners may
    /// subscribe or cancel from inside a callback; such changes apply from
    /// the next publish.
    pub fn publish(&self, event: &E) -> Result<(), ListenerError> {
        let snapshot: Vec<Listener<E>> = read(&self.listeners)
            .iter()
            .map(|entry| Arc::clone(&entry.listener))
            .collect();

        trace!(listeners = snapshot.len(), "publishing event");
        for listener in snapshot {
            listener(event)?;
        }
        Ok(())
    }

    /// Number of currently registered listeners.
    pub fn len(&self) -> usize {
        read(&self.listeners).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Listeners never run under this lock.
fn read<E>(entries: &Entries<E>) -> RwLockReadGuard<'_, Vec<Entry<E>>> {
    entries.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<E>(entries: &Entries<E>) -> RwLockWriteGuard<'_, Vec<Entry<E>>> {
    entries.write().unwrap_or_else(PoisonError::into_inner)
}

/// Cancellation handle for a registered listener.
#[must_use = "dropping a Subscription leaves the listener registered; call `cancel` to remove it"]
pub struct Subscription {
    cancelled: AtomicBool,
    cancel: Box<dyn Fn() + Send + Sync>,
}

impl Subscription {
    fn new(cancel: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            cancel: Box::new(cancel),
        }
    }

    /// Remove the listener from its channel. Calling this more than once is a no-op.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            (self.cancel)();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
