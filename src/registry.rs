//! StoreRegistry - one shared store per record type.
//!
//! ```ignore
//! use keyed_store::{store, Record};
//!
//! let pokedex = store::<Pokemon>()?;
//! pokedex.set(pikachu)?;
//!
//! // Any later call for the same type returns the same instance.
//! assert!(Arc::ptr_eq(&pokedex, &store::<Pokemon>()?));
//! ```

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use tracing::debug;

use crate::error::StoreError;
use crate::record::Record;
use crate::store::KeyedStore;

type AnyStore = Arc<dyn Any + Send + Sync>;

/// Registry mapping each record type to its single [`KeyedStore`].
///
/// The process-wide instance is [`StoreRegistry::global`]. Tests that need
/// isolation can create their own registry or call [`clear`](Self::clear).
pub struct StoreRegistry {
    stores: RwLock<HashMap<TypeId, AnyStore>>,
}

impl Default for StoreRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self {
            stores: RwLock::new(HashMap::new()),
        }
    }

    /// The process-wide registry.
    pub fn global() -> &'static StoreRegistry {
        static GLOBAL: OnceLock<StoreRegistry> = OnceLock::new();
        GLOBAL.get_or_init(StoreRegistry::new)
    }

    /// Get the store for `T`, creating an empty one on first use.
    pub fn store<T: Record>(&self) -> Result<Arc<KeyedStore<T>>, StoreError> {
        self.store_with(KeyedStore::new)
    }

    /// Get the store for `T`, creating it with `init` on first use.
    ///
    /// `init` is ignored when the store already exists. Under a race it may
    /// run and have its result discarded in favour of the store another
    /// thread registered first.
    pub fn store_with<T, F>(&self, init: F) -> Result<Arc<KeyedStore<T>>, StoreError>
    where
        T: Record,
        F: FnOnce() -> KeyedStore<T>,
    {
        if let Some(existing) = self.lookup::<T>()? {
            return Ok(existing);
        }

        // Built outside the lock so `init` may itself use the registry.
        let created: AnyStore = Arc::new(init());

        let entry = {
            let mut stores = self
                .stores
                .write()
                .map_err(|_| StoreError::LockPoisoned("registry write"))?;
            Arc::clone(stores.entry(TypeId::of::<T>()).or_insert_with(|| {
                debug!(record_type = type_name::<T>(), "store created");
                created
            }))
        };

        downcast::<T>(entry)
    }

    /// Whether a store for `T` has been created.
    pub fn contains<T: Record>(&self) -> Result<bool, StoreError> {
        let stores = self
            .stores
            .read()
            .map_err(|_| StoreError::LockPoisoned("registry read"))?;
        Ok(stores.contains_key(&TypeId::of::<T>()))
    }

    /// Number of stores created so far.
    pub fn len(&self) -> Result<usize, StoreError> {
        let stores = self
            .stores
            .read()
            .map_err(|_| StoreError::LockPoisoned("registry read"))?;
        Ok(stores.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Forget every store. Handles already given out keep working but are
    /// no longer returned by this registry.
    pub fn clear(&self) -> Result<(), StoreError> {
        let mut stores = self
            .stores
            .write()
            .map_err(|_| StoreError::LockPoisoned("registry write"))?;
        debug!(stores = stores.len(), "registry cleared");
        stores.clear();
        Ok(())
    }

    fn lookup<T: Record>(&self) -> Result<Option<Arc<KeyedStore<T>>>, StoreError> {
        let stores = self
            .stores
            .read()
            .map_err(|_| StoreError::LockPoisoned("registry read"))?;
        stores
            .get(&TypeId::of::<T>())
            .map(|entry| downcast::<T>(Arc::clone(entry)))
            .transpose()
    }
}

fn downcast<T: Record>(entry: AnyStore) -> Result<Arc<KeyedStore<T>>, StoreError> {
    entry
        .downcast::<KeyedStore<T>>()
        .map_err(|_| StoreError::TypeMismatch(type_name::<T>()))
}

/// Get the process-wide store for `T`, creating it on first use.
pub fn store<T: Record>() -> Result<Arc<KeyedStore<T>>, StoreError> {
    StoreRegistry::global().store::<T>()
}
