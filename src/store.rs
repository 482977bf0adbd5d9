//! KeyedStore - identifier-keyed record table with before/after write hooks.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use tracing::{debug, warn};

use crate::channel::{Channel, ListenerError, Subscription};
use crate::error::StoreError;
use crate::record::Record;

/// Published before a write is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct BeforeSet<T> {
    /// The record currently stored under the same id, if any.
    pub current: Option<T>,
    /// The record about to be written.
    pub new_value: T,
}

/// Published after a write has been applied.
#[derive(Debug, Clone, PartialEq)]
pub struct AfterSet<T> {
    pub value: T,
}

/// Result of [`KeyedStore::select_best`].
#[derive(Debug, Clone, PartialEq)]
pub struct Best<T, S = f64> {
    /// The first record with the highest score, or `None` if no score beat the baseline.
    pub item: Option<T>,
    pub max: S,
}

/// Records in first-insertion order plus an id index into them.
struct Slots<T> {
    index: HashMap<String, usize>,
    records: Vec<T>,
}

impl<T: Record> Slots<T> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            records: Vec::new(),
        }
    }

    fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).and_then(|&slot| self.records.get(slot))
    }

    /// Returns true when the id was not present before.
    fn put(&mut self, record: T) -> bool {
        match self.index.get(record.id()) {
            Some(&slot) => {
                self.records[slot] = record;
                false
            }
            None => {
                self.index.insert(record.id().to_string(), self.records.len());
                self.records.push(record);
                true
            }
        }
    }
}

/// In-memory store holding one record per identifier.
///
/// Every write goes through [`set`](Self::set), which publishes a
/// [`BeforeSet`] event, applies the write, then publishes an [`AfterSet`]
/// event. Listeners run synchronously on the writing thread and the map lock
/// is never held while they run, so a listener may read from (or write to)
/// the store it is observing.
///
/// Enumeration order is the order in which each id was first written.
pub struct KeyedStore<T: Record> {
    name: String,
    slots: RwLock<Slots<T>>,
    before_add: Channel<BeforeSet<T>>,
    after_add: Channel<AfterSet<T>>,
}

impl<T: Record> Default for KeyedStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> KeyedStore<T> {
    /// Create an empty store labelled with the record type name.
    pub fn new() -> Self {
        Self {
            name: std::any::type_name::<T>().to_string(),
            slots: RwLock::new(Slots::new()),
            before_add: Channel::new(),
            after_add: Channel::new(),
        }
    }

    /// Set the label used in log output.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Pre-allocate room for `capacity` records.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        if let Ok(slots) = self.slots.get_mut() {
            slots.index.reserve(capacity);
            slots.records.reserve(capacity);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Write `record`, replacing any record with the same id.
    ///
    /// If a before-add listener fails the store is left untouched and
    /// [`StoreError::Rejected`] is returned. If an after-add listener fails
    /// the write has already happened and [`StoreError::Listener`] is returned.
    pub fn set(&self, record: T) -> Result<(), StoreError> {
        if record.id().is_empty() {
            warn!(store = %self.name, "rejected record with empty id");
            return Err(StoreError::InvalidRecord);
        }

        let before = BeforeSet {
            current: self.get(record.id())?,
            new_value: record,
        };
        if let Err(err) = self.before_add.publish(&before) {
            warn!(store = %self.name, id = before.new_value.id(), reason = err.reason(), "write rejected");
            return Err(StoreError::rejected(before.new_value.id(), err));
        }

        let record = before.new_value;
        let inserted = self
            .slots
            .write()
            .map_err(|_| StoreError::LockPoisoned("write"))?
            .put(record.clone());
        debug!(store = %self.name, id = record.id(), inserted, "record written");

        let after = AfterSet { value: record };
        self.after_add.publish(&after).map_err(|err: ListenerError| {
            warn!(store = %self.name, id = after.value.id(), reason = err.reason(), "after-add listener failed");
            StoreError::listener(after.value.id(), err)
        })
    }

    /// Get the record stored under `id`. Returns `None` if nothing was written there.
    pub fn get(&self, id: &str) -> Result<Option<T>, StoreError> {
        let slots = self
            .slots
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        Ok(slots.get(id).cloned())
    }

    pub fn contains(&self, id: &str) -> Result<bool, StoreError> {
        let slots = self
            .slots
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        Ok(slots.index.contains_key(id))
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let slots = self
            .slots
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        Ok(slots.records.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// All ids, in enumeration order.
    pub fn ids(&self) -> Result<Vec<String>, StoreError> {
        let slots = self
            .slots
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        Ok(slots.records.iter().map(|r| r.id().to_string()).collect())
    }

    /// A point-in-time copy of all records, in enumeration order.
    pub fn values(&self) -> Result<Vec<T>, StoreError> {
        let slots = self
            .slots
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        Ok(slots.records.clone())
    }

    /// Register a listener that runs before each write.
    ///
    /// Returning an error vetoes the write.
    pub fn on_before_add<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&BeforeSet<T>) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.before_add.subscribe(listener)
    }

    /// Register a listener that runs after each write.
    pub fn on_after_add<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&AfterSet<T>) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.after_add.subscribe(listener)
    }

    /// Call `visitor` once per record.
    ///
    /// Runs over a copy taken at the start of the call; writes made by the
    /// visitor are not seen by this visit.
    pub fn visit<F>(&self, mut visitor: F) -> Result<(), StoreError>
    where
        F: FnMut(&T),
    {
        for record in self.values()? {
            visitor(&record);
        }
        Ok(())
    }

    /// Find the record with the highest score.
    ///
    /// The running maximum starts at `S::default()` (zero for numbers) and
    /// only a strictly greater score replaces it, so the first record to reach
    /// the top score wins and nothing is selected if no score is positive.
    /// Scores that compare as unordered (NaN) never qualify.
    pub fn select_best<S, F>(&self, score: F) -> Result<Best<T, S>, StoreError>
    where
        S: PartialOrd + Default,
        F: Fn(&T) -> S,
    {
        let mut best = Best {
            item: None,
            max: S::default(),
        };

        for record in self.values()? {
            let value = score(&record);
            if value > best.max {
                best.max = value;
                best.item = Some(record);
            }
        }

        Ok(best)
    }
}

impl<T: Record> fmt::Debug for KeyedStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedStore")
            .field("name", &self.name)
            .field("len", &self.len().ok())
            .field("before_add_listeners", &self.before_add.len())
            .field("after_add_listeners", &self.after_add.len())
            .finish()
    }
}
