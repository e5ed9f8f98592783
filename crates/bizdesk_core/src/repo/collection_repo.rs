//! Generic whole-collection repository.
//!
//! # Responsibility
//! - Provide initialize/list/get/add/update/delete/search over one entity
//!   collection stored as a single JSON array value.
//! - Own exactly three keys per entity: collection, id counter and version.
//!
//! # Invariants
//! - Seeding runs only when the collection key is entirely absent.
//! - Collection, counter and version are committed in one guarded batch;
//!   an interleaved writer surfaces as `RepoError::Conflict`, never as a
//!   silently lost update.
//! - Reads degrade to an empty collection when stored JSON is unreadable;
//!   writes refuse to overwrite it.

use crate::clock::Clock;
use crate::model::validation::ValidationError;
use crate::model::{Entity, Timestamp};
use crate::repo::id_alloc::{highest_numeric_id, next_id, parse_counter};
use crate::repo::seed::SeedSnapshot;
use crate::repo::{RepoError, RepoResult};
use crate::store::{read_version, CommitOutcome, KeyValueStore, WriteBatch};
use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::marker::PhantomData;

/// Status filter applied before free-text matching in `search`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter<S> {
    /// Bypasses status filtering.
    All,
    Only(S),
}

impl<S> Default for StatusFilter<S> {
    fn default() -> Self {
        Self::All
    }
}

impl<S: Copy + Eq + DeserializeOwned> StatusFilter<S> {
    pub fn matches(&self, status: S) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => *expected == status,
        }
    }

    /// Parses the wire form: `"all"` (or empty) bypasses, otherwise the
    /// snake_case status name.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        serde_json::from_value(serde_json::Value::String(trimmed.to_ascii_lowercase()))
            .map(Self::Only)
            .map_err(|_| {
                ValidationError::new("status", format!("unknown status filter `{trimmed}`"))
            })
    }
}

struct WriteSnapshot<E> {
    version: u64,
    counter: u64,
    records: Vec<E>,
}

/// Repository over one entity collection in a shared key-value store.
pub struct CollectionRepository<'s, E, S: ?Sized> {
    store: &'s S,
    clock: &'s dyn Clock,
    version_key: String,
    _entity: PhantomData<fn() -> E>,
}

impl<'s, E: Entity, S: KeyValueStore + ?Sized> CollectionRepository<'s, E, S> {
    pub fn new(store: &'s S, clock: &'s dyn Clock) -> Self {
        Self {
            store,
            clock,
            version_key: version_key::<E>(),
            _entity: PhantomData,
        }
    }

    /// Seeds the collection when its key is absent. No-op otherwise.
    pub fn initialize(&self) -> RepoResult<()> {
        let version = read_version(self.store, &self.version_key)?;
        if self.store.get(E::COLLECTION_KEY)?.is_some() {
            return Ok(());
        }

        // A counter that survived an external wipe must not be rewound.
        let stored_counter = parse_counter(self.store.get(E::COUNTER_KEY)?.as_deref());
        let seed = SeedSnapshot::<E>::build(self.clock.now());
        let counter = seed.counter.max(stored_counter);
        let batch = WriteBatch::guarded(self.version_key.as_str(), version)
            .set(E::COLLECTION_KEY, encode(&seed.records)?)
            .set(E::COUNTER_KEY, counter.to_string());

        match self.store.commit(&batch)? {
            CommitOutcome::Applied { .. } => {
                info!(
                    "event=collection_seed module=repo collection={} status=ok records={} counter={}",
                    E::COLLECTION_KEY,
                    seed.records.len(),
                    counter
                );
                Ok(())
            }
            CommitOutcome::Conflict { expected, found } => {
                if self.store.get(E::COLLECTION_KEY)?.is_some() {
                    debug!(
                        "event=collection_seed module=repo collection={} status=skipped reason=seeded_concurrently",
                        E::COLLECTION_KEY
                    );
                    return Ok(());
                }
                Err(RepoError::Conflict {
                    collection: E::COLLECTION_KEY,
                    expected,
                    found,
                })
            }
        }
    }

    /// Returns a fresh snapshot of every record in insertion order.
    ///
    /// Unreadable stored JSON yields an empty list instead of an error.
    pub fn list(&self) -> RepoResult<Vec<E>> {
        self.initialize()?;
        let Some(raw) = self.store.get(E::COLLECTION_KEY)? else {
            warn!(
                "event=collection_read module=repo collection={} status=degraded reason=missing_after_seed",
                E::COLLECTION_KEY
            );
            return Ok(Vec::new());
        };

        match decode::<E>(&raw) {
            Ok(records) => Ok(records),
            Err(err) => {
                warn!(
                    "event=collection_read module=repo collection={} status=degraded reason=decode_failed error={}",
                    E::COLLECTION_KEY,
                    err
                );
                Ok(Vec::new())
            }
        }
    }

    pub fn count(&self) -> RepoResult<usize> {
        Ok(self.list()?.len())
    }

    pub fn get_by_id(&self, id: &str) -> RepoResult<Option<E>> {
        Ok(self.list()?.into_iter().find(|record| record.id() == id))
    }

    /// Inserts a new record with the next id and `created_at = updated_at = now`.
    pub fn add(&self, draft: E::Draft) -> RepoResult<E> {
        let mut snapshot = self.load_for_write()?;
        let id = next_id(snapshot.counter, &snapshot.records);
        let record = E::from_draft(id.to_string(), draft, self.clock.now());
        record.validate()?;

        snapshot.records.push(record.clone());
        self.commit_snapshot(snapshot.version, &snapshot.records, Some(id))?;

        info!(
            "event=entity_add module=repo collection={} status=ok id={}",
            E::COLLECTION_KEY,
            id
        );
        Ok(record)
    }

    /// Shallow-merges `patch` into the record and refreshes `updated_at`.
    ///
    /// Returns `Ok(None)` without writing when `id` is absent.
    pub fn update(&self, id: &str, patch: E::Patch) -> RepoResult<Option<E>> {
        self.modify(id, "entity_update", |record| {
            record.apply_patch(patch);
            Ok(())
        })
    }

    /// Removes the record. Returns `false` (and writes nothing) when absent.
    pub fn delete(&self, id: &str) -> RepoResult<bool> {
        let removed = self.modify_all("entity_delete", |records, _| {
            let before = records.len();
            records.retain(|record| record.id() != id);
            Ok((records.len() < before).then_some(()))
        })?;

        if removed.is_some() {
            info!(
                "event=entity_delete module=repo collection={} status=ok id={}",
                E::COLLECTION_KEY,
                id
            );
        }
        Ok(removed.is_some())
    }

    /// Filters by status, then by case-insensitive substring over the
    /// entity's search fields. Blank queries match every record.
    pub fn search(&self, query: &str, filter: StatusFilter<E::Status>) -> RepoResult<Vec<E>> {
        let needle = query.trim().to_lowercase();
        let records = self
            .list()?
            .into_iter()
            .filter(|record| filter.matches(record.status()))
            .filter(|record| {
                needle.is_empty()
                    || record
                        .search_fields()
                        .iter()
                        .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect::<Vec<_>>();

        debug!(
            "event=entity_search module=repo collection={} status=ok hits={} query_len={}",
            E::COLLECTION_KEY,
            records.len(),
            needle.chars().count()
        );
        Ok(records)
    }

    /// Replaces the whole collection, e.g. when restoring a backup.
    ///
    /// The counter never moves backwards, so ids issued before the restore
    /// are not handed out again.
    pub fn replace_all(&self, records: Vec<E>) -> RepoResult<()> {
        let mut seen = HashSet::new();
        for record in &records {
            record.validate()?;
            if record.updated_at() < record.created_at() {
                return Err(ValidationError::new(
                    "updatedAt",
                    format!("record `{}` was updated before it was created", record.id()),
                )
                .into());
            }
            if !seen.insert(record.id()) {
                return Err(ValidationError::new(
                    "id",
                    format!("duplicate id `{}`", record.id()),
                )
                .into());
            }
        }

        let version = read_version(self.store, &self.version_key)?;
        let stored_counter = parse_counter(self.store.get(E::COUNTER_KEY)?.as_deref());
        let counter = stored_counter.max(highest_numeric_id(&records));
        self.commit_snapshot(version, &records, Some(counter))?;

        info!(
            "event=collection_replace module=repo collection={} status=ok records={}",
            E::COLLECTION_KEY,
            records.len()
        );
        Ok(())
    }

    /// Applies `change` to one record, stamps and validates it, then commits.
    pub(crate) fn modify(
        &self,
        id: &str,
        operation: &'static str,
        change: impl FnOnce(&mut E) -> RepoResult<()>,
    ) -> RepoResult<Option<E>> {
        let updated = self.modify_all(operation, |records, now| {
            let Some(record) = records.iter_mut().find(|record| record.id() == id) else {
                return Ok(None);
            };
            change(record)?;
            stamp(record, now);
            record.validate()?;
            Ok(Some(record.clone()))
        })?;

        match &updated {
            Some(_) => info!(
                "event={} module=repo collection={} status=ok id={}",
                operation,
                E::COLLECTION_KEY,
                id
            ),
            None => debug!(
                "event={} module=repo collection={} status=not_found id={}",
                operation,
                E::COLLECTION_KEY,
                id
            ),
        }
        Ok(updated)
    }

    /// Read-modify-write over the whole collection.
    ///
    /// `change` returns `None` to abort without writing.
    pub(crate) fn modify_all<T>(
        &self,
        operation: &'static str,
        change: impl FnOnce(&mut Vec<E>, Timestamp) -> RepoResult<Option<T>>,
    ) -> RepoResult<Option<T>> {
        let mut snapshot = self.load_for_write()?;
        let Some(result) = change(&mut snapshot.records, self.clock.now())? else {
            return Ok(None);
        };

        if let Err(err) = self.commit_snapshot(snapshot.version, &snapshot.records, None) {
            error!(
                "event={} module=repo collection={} status=error error={}",
                operation,
                E::COLLECTION_KEY,
                err
            );
            return Err(err);
        }
        Ok(Some(result))
    }

    fn load_for_write(&self) -> RepoResult<WriteSnapshot<E>> {
        self.initialize()?;
        let version = read_version(self.store, &self.version_key)?;
        let records = match self.store.get(E::COLLECTION_KEY)? {
            Some(raw) => decode::<E>(&raw).map_err(|err| {
                error!(
                    "event=collection_read module=repo collection={} status=error reason=decode_failed error={}",
                    E::COLLECTION_KEY,
                    err
                );
                RepoError::CorruptCollection {
                    collection: E::COLLECTION_KEY,
                    message: err.to_string(),
                }
            })?,
            None => Vec::new(),
        };
        let counter = parse_counter(self.store.get(E::COUNTER_KEY)?.as_deref());

        Ok(WriteSnapshot {
            version,
            counter,
            records,
        })
    }

    fn commit_snapshot(&self, version: u64, records: &[E], counter: Option<u64>) -> RepoResult<()> {
        let mut batch = WriteBatch::guarded(self.version_key.as_str(), version)
            .set(E::COLLECTION_KEY, encode(records)?);
        if let Some(counter) = counter {
            batch = batch.set(E::COUNTER_KEY, counter.to_string());
        }

        match self.store.commit(&batch)? {
            CommitOutcome::Applied { .. } => Ok(()),
            CommitOutcome::Conflict { expected, found } => {
                warn!(
                    "event=collection_write module=repo collection={} status=conflict expected={} found={}",
                    E::COLLECTION_KEY,
                    expected,
                    found
                );
                Err(RepoError::Conflict {
                    collection: E::COLLECTION_KEY,
                    expected,
                    found,
                })
            }
        }
    }
}

/// Version key guarding writes to `E`'s collection.
pub fn version_key<E: Entity>() -> String {
    format!("{}:version", E::COLLECTION_KEY)
}

/// Data keys owned by the repository for `E`. Excludes the version key,
/// which keeps counting across resets.
pub fn data_keys<E: Entity>() -> [&'static str; 2] {
    [E::COLLECTION_KEY, E::COUNTER_KEY]
}

/// Sets `updated_at` to `now`, never earlier than `created_at`.
pub(crate) fn stamp<E: Entity>(record: &mut E, now: Timestamp) {
    let at = now.max(record.created_at());
    record.set_updated_at(at);
}

fn encode<E: Entity>(records: &[E]) -> RepoResult<String> {
    serde_json::to_string(records).map_err(RepoError::Encode)
}

fn decode<E: Entity>(raw: &str) -> Result<Vec<E>, serde_json::Error> {
    serde_json::from_str(raw)
}
