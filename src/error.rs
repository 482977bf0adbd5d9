use std::fmt;

use crate::channel::ListenerError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The record's identifier was empty.
    InvalidRecord,
    LockPoisoned(&'static str),
    /// A before-add listener refused the write. The store was left unchanged.
    Rejected { id: String, reason: String },
    /// An after-add listener failed. The write had already been applied.
    Listener { id: String, reason: String },
    /// The registry held a store of another type under this record type's key.
    TypeMismatch(&'static str),
    Decode(String),
    Io(String),
}

impl StoreError {
    pub(crate) fn rejected(id: &str, err: ListenerError) -> Self {
        StoreError::Rejected {
            id: id.to_string(),
            reason: err.into_reason(),
        }
    }

    pub(crate) fn listener(id: &str, err: ListenerError) -> Self {
        StoreError::Listener {
            id: id.to_string(),
            reason: err.into_reason(),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::InvalidRecord => write!(f, "record has an empty identifier"),
            StoreError::LockPoisoned(operation) => {
                write!(f, "store lock poisoned during {}", operation)
            }
            StoreError::Rejected { id, reason } => {
                write!(f, "write of record {} rejected: {}", id, reason)
            }
            StoreError::Listener { id, reason } => write!(
                f,
                "after-add listener failed for record {}: {}",
                id, reason
            ),
            StoreError::TypeMismatch(record_type) => {
                write!(f, "registry entry is not a store of {}", record_type)
            }
            StoreError::Decode(message) => write!(f, "record decode error: {}", message),
            StoreError::Io(message) => write!(f, "record source error: {}", message),
        }
    }
}

impl std::error::Error for StoreError {}
