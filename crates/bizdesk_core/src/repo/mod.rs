//! Repository layer over the key-value store.
//!
//! # Responsibility
//! - Provide per-entity CRUD and search over whole-collection values.
//! - Seed collections lazily and allocate monotonic ids.
//!
//! # Invariants
//! - Write paths call `validate()` before anything is persisted.
//! - Not-found is a normal outcome (`None`/`false`), never an error.
//! - Every mutation commits behind the collection's version guard.
//!
//! # See also
//! - `crate::store` for the version-guarded batch contract

use crate::model::validation::ValidationError;
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod collection_repo;
pub mod entity_ops;
pub mod id_alloc;
pub mod seed;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for persistence and mutation operations.
#[derive(Debug)]
pub enum RepoError {
    Store(StoreError),
    Validation(ValidationError),
    Encode(serde_json::Error),
    /// Another writer committed since this operation read the collection.
    /// Re-running the operation is safe.
    Conflict {
        collection: &'static str,
        expected: u64,
        found: u64,
    },
    /// Stored collection text cannot be decoded; mutations refuse to
    /// overwrite it.
    CorruptCollection {
        collection: &'static str,
        message: String,
    },
}

impl RepoError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode collection: {err}"),
            Self::Conflict {
                collection,
                expected,
                found,
            } => write!(
                f,
                "concurrent write to `{collection}`: expected version {expected}, found {found}"
            ),
            Self::CorruptCollection {
                collection,
                message,
            } => write!(f, "stored `{collection}` collection is unreadable: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Conflict { .. } | Self::CorruptCollection { .. } => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Store(StoreError::Sqlite(value))
    }
}
