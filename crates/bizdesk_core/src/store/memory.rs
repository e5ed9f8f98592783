//! In-process key-value store.
//!
//! Used as the default test double and as a scratch store. Supports fault
//! injection so callers can exercise storage failure paths.

use super::{parse_version, CommitOutcome, KeyValueStore, StoreError, StoreResult, WriteBatch};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// `BTreeMap`-backed store guarded by a mutex.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: Mutex<BTreeMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    write_count: AtomicUsize,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `get` fail with an I/O error while `enabled`.
    pub fn fail_reads(&self, enabled: bool) {
        self.fail_reads.store(enabled, Ordering::SeqCst);
    }

    /// Makes every subsequent write (`set`, `remove`, `commit`) fail while `enabled`.
    pub fn fail_writes(&self, enabled: bool) {
        self.fail_writes.store(enabled, Ordering::SeqCst);
    }

    /// Number of successful write calls so far.
    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }

    /// Writes a value bypassing fault injection and write accounting.
    pub fn raw_set(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
    }

    /// Snapshot of all keys currently stored.
    pub fn keys(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Io("memory store lock poisoned".to_string()))
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Io("injected write failure".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Io("injected read failure".to_string()));
        }
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.check_writable()?;
        self.lock()?.insert(key.to_string(), value.to_string());
        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.check_writable()?;
        self.lock()?.remove(key);
        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn commit(&self, batch: &WriteBatch) -> StoreResult<CommitOutcome> {
        self.check_writable()?;
        let mut entries = self.lock()?;

        let mut next_version = None;
        if let Some(guard) = batch.guard() {
            let found = parse_version(entries.get(&guard.key).map(String::as_str));
            if found != guard.expected {
                return Ok(CommitOutcome::Conflict {
                    expected: guard.expected,
                    found,
                });
            }
            next_version = Some(found + 1);
        }

        for (key, value) in batch.sets() {
            entries.insert(key.clone(), value.clone());
        }
        for key in batch.removes() {
            entries.remove(key);
        }
        if let (Some(guard), Some(version)) = (batch.guard(), next_version) {
            entries.insert(guard.key.clone(), version.to_string());
        }
        for key in batch.bumps() {
            let bumped = parse_version(entries.get(key).map(String::as_str)) + 1;
            entries.insert(key.clone(), bumped.to_string());
        }

        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(CommitOutcome::Applied {
            version: next_version,
        })
    }
}
