//! Feeding records into a store from an external source.
//!
//! A source decodes records and hands them, one per call, to a
//! [`RecordHandler`]. [`KeyedStore`] is itself a handler, so the usual wiring
//! is simply:
//!
//! ```ignore
//! let pokedex = keyed_store::store::<Pokemon>()?;
//! keyed_store::load_json_file("data.json", &pokedex)?;
//! ```

use std::sync::Arc;

use crate::error::StoreError;
use crate::record::Record;
use crate::store::KeyedStore;

/// Receives decoded records from a loader.
pub trait RecordHandler<T> {
    fn add_record(&self, record: T) -> Result<(), StoreError>;
}

impl<T: Record> RecordHandler<T> for KeyedStore<T> {
    fn add_record(&self, record: T) -> Result<(), StoreError> {
        self.set(record)
    }
}

impl<T, H: RecordHandler<T> + ?Sized> RecordHandler<T> for Arc<H> {
    fn add_record(&self, record: T) -> Result<(), StoreError> {
        (**self).add_record(record)
    }
}

#[cfg(feature = "loader")]
mod json {
    use std::fs::File;
    use std::io::{BufReader, Read};
    use std::path::Path;

    use serde::de::DeserializeOwned;
    use tracing::debug;

    use super::RecordHandler;
    use crate::error::StoreError;

    /// Decode a JSON array of records from `reader` and pass each to `handler`
    /// in array order.
    ///
    /// Stops at the first record the handler refuses; records before it stay
    /// written. Returns the number of records handed over.
    pub fn load_json<T, R, H>(reader: R, handler: &H) -> Result<usize, StoreError>
    where
        T: DeserializeOwned,
        R: Read,
        H: RecordHandler<T> + ?Sized,
    {
        let records: Vec<T> =
            serde_json::from_reader(reader).map_err(|e| StoreError::Decode(e.to_string()))?;

        let count = records.len();
        for record in records {
            handler.add_record(record)?;
        }

        debug!(records = count, "records loaded");
        Ok(count)
    }

    /// [`load_json`] over the contents of the file at `path`.
    pub fn load_json_file<T, P, H>(path: P, handler: &H) -> Result<usize, StoreError>
    where
        T: DeserializeOwned,
        P: AsRef<Path>,
        H: RecordHandler<T> + ?Sized,
    {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| StoreError::Io(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "loading records");
        load_json(BufReader::new(file), handler)
    }
}

#[cfg(feature = "loader")]
pub use json::{load_json, load_json_file};
