//! Error types for the ledger core.
//!
//! Gateway failures (not found, conflict, storage) and the single arithmetic
//! failure of the grading procedure share one enum. The core never recovers
//! from any of them; they abort the enclosing transaction.

use crate::Collection;
use thiserror::Error;

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Every fallible core operation returns this.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The referenced entity is absent from its collection.
    #[error("{collection} '{id}' not found")]
    NotFound { collection: Collection, id: String },

    /// An entity with this id already exists in its collection.
    #[error("{collection} '{id}' already exists")]
    Conflict { collection: Collection, id: String },

    /// Grading needs at least one acidity reading.
    #[error("production '{production}' has no acidity readings to grade")]
    EmptyAcidity { production: String },

    /// A bulk create was given an entity from another collection.
    #[error("expected {expected} entity, found {found}")]
    CollectionMismatch {
        expected: Collection,
        found: Collection,
    },

    /// The redb backend failed.
    #[error("storage error: {0}")]
    Storage(#[from] redb::Error),

    /// An entity or snapshot could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] postcard::Error),

    /// A snapshot had a bad header or unsupported version.
    #[error("format error: {0}")]
    Format(String),
}

impl LedgerError {
    pub(crate) fn not_found(collection: Collection, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection,
            id: id.into(),
        }
    }

    pub(crate) fn conflict(collection: Collection, id: impl Into<String>) -> Self {
        Self::Conflict {
            collection,
            id: id.into(),
        }
    }
}

// redb splits its failures across several types; all of them fold into
// redb::Error so `?` works on any redb call.
macro_rules! from_redb {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for LedgerError {
                fn from(err: $ty) -> Self {
                    Self::Storage(redb::Error::from(err))
                }
            }
        )*
    };
}

from_redb!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);
