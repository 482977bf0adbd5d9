//! Process-local keyed record store.
//!
//! One [`KeyedStore`] per record type holds records by their [`Record::id`],
//! announces every write through before/after listeners, and answers
//! best-match queries for any caller-supplied scoring function.
//!
//! ```ignore
//! use keyed_store::{store, Record};
//!
//! #[derive(Clone, Record)]
//! struct Pokemon {
//!     id: String,
//!     attack: u32,
//! }
//!
//! let pokedex = store::<Pokemon>()?;
//! let _logger = pokedex.on_after_add(|event| {
//!     println!("new record >> {}", event.value.id);
//!     Ok(())
//! });
//!
//! pokedex.set(Pokemon { id: "pikachu".into(), attack: 55 })?;
//! let strongest = pokedex.select_best(|p| p.attack)?;
//! ```

// Lets `#[derive(Record)]` expand to `keyed_store::Record` inside this crate too.
extern crate self as keyed_store;

mod channel;
mod error;
mod loader;
mod record;
mod registry;
mod store;

pub use channel::{Channel, ListenerError, Subscription};
pub use error::StoreError;
pub use loader::RecordHandler;
#[cfg(feature = "loader")]
pub use loader::{load_json, load_json_file};
pub use record::Record;
pub use registry::{store, StoreRegistry};
pub use store::{AfterSet, BeforeSet, Best, KeyedStore};

#[cfg(feature = "derive")]
pub use keyed_store_macros::Record;
