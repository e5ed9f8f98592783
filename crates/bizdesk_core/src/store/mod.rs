//! String-keyed persistent storage boundary.
//!
//! # Responsibility
//! - Define the key-value contract every repository persists through.
//! - Provide an atomic, version-guarded batch write used by mutations.
//!
//! # Invariants
//! - Values are opaque UTF-8 text; the store never interprets them.
//! - A guarded batch is applied entirely or not at all.
//! - A successful guarded commit bumps its version key by exactly one.
//! - Bumped keys are read and incremented inside the commit itself.
//!
//! # See also
//! - `crate::repo::collection_repo` for the keys each collection owns

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod migrations;
pub mod sqlite;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    Io(String),
    UnsupportedSchemaVersion {
        store_version: u32,
        latest_supported: u32,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Io(message) => write!(f, "store i/o failure: {message}"),
            Self::UnsupportedSchemaVersion {
                store_version,
                latest_supported,
            } => write!(
                f,
                "store schema version {store_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Io(_) | Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Compare-before-write token attached to a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionGuard {
    pub key: String,
    pub expected: u64,
}

/// A group of writes applied together by [`KeyValueStore::commit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    guard: Option<VersionGuard>,
    sets: Vec<(String, String)>,
    removes: Vec<String>,
    bumps: Vec<String>,
}

impl WriteBatch {
    /// Creates an unguarded batch. It always applies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a batch that only applies while `version_key` still holds
    /// `expected` (absent counts as `0`).
    pub fn guarded(version_key: impl Into<String>, expected: u64) -> Self {
        Self {
            guard: Some(VersionGuard {
                key: version_key.into(),
                expected,
            }),
            ..Self::default()
        }
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.sets.push((key.into(), value.into()));
        self
    }

    pub fn remove(mut self, key: impl Into<String>) -> Self {
        self.removes.push(key.into());
        self
    }

    /// Increments a version key by one (absent counts as `0`), evaluated
    /// against the value the store holds at commit time.
    pub fn bump(mut self, version_key: impl Into<String>) -> Self {
        self.bumps.push(version_key.into());
        self
    }

    pub fn guard(&self) -> Option<&VersionGuard> {
        self.guard.as_ref()
    }

    pub fn sets(&self) -> &[(String, String)] {
        &self.sets
    }

    pub fn removes(&self) -> &[String] {
        &self.removes
    }

    pub fn bumps(&self) -> &[String] {
        &self.bumps
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty() && self.removes.is_empty() && self.bumps.is_empty()
    }
}

/// Result of a batch commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Batch was written. `version` is the new guard value, if guarded.
    Applied { version: Option<u64> },
    /// Guard did not match; nothing was written.
    Conflict { expected: u64, found: u64 },
}

/// Persistent string-keyed store consumed by repositories.
///
/// Implementations must make `commit` all-or-nothing.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
    fn commit(&self, batch: &WriteBatch) -> StoreResult<CommitOutcome>;
}

/// Parses a stored version value. Absent or unreadable values count as `0`.
pub fn parse_version(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(0)
}

/// Reads the current version stored under `version_key`.
pub fn read_version<S: KeyValueStore + ?Sized>(store: &S, version_key: &str) -> StoreResult<u64> {
    Ok(parse_version(store.get(version_key)?.as_deref()))
}
