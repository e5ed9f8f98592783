//! SQLite-backed key-value store.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections holding `kv_entries`.
//! - Configure connection pragmas and run migrations before first use.
//! - Apply guarded batches inside one immediate transaction.
//!
//! # Invariants
//! - Returned stores have migrations fully applied.
//! - A conflicting guard rolls back without touching any key.

use super::migrations::apply_migrations;
use super::{parse_version, CommitOutcome, KeyValueStore, StoreResult, WriteBatch};
use log::{debug, error, info, warn};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const UPSERT_SQL: &str = "INSERT INTO kv_entries (key, value, updated_at)
     VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
     ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at;";

/// Key-value store persisted in a single SQLite table.
pub struct SqliteKvStore {
    conn: Connection,
}

impl SqliteKvStore {
    /// Opens (or creates) a store file and applies pending migrations.
    ///
    /// # Side effects
    /// - Emits `store_open` logging events with duration and status.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        open_with("file", || Connection::open(path))
    }

    /// Opens a private in-memory store. Data is dropped with the handle.
    pub fn open_in_memory() -> StoreResult<Self> {
        open_with("memory", Connection::open_in_memory)
    }

    /// Lists every stored key in ascending order.
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM kv_entries ORDER BY key ASC;")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(UPSERT_SQL, params![key, value])?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }

    fn commit(&self, batch: &WriteBatch) -> StoreResult<CommitOutcome> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;

        let mut next_version = None;
        if let Some(guard) = batch.guard() {
            let stored = tx
                .query_row(
                    "SELECT value FROM kv_entries WHERE key = ?1;",
                    [guard.key.as_str()],
                    |row| row.get::<_, String>(0),
                )
                .optional()?;
            let found = parse_version(stored.as_deref());
            if found != guard.expected {
                tx.rollback()?;
                warn!(
                    "event=store_commit module=store status=conflict guard={} expected={} found={}",
                    guard.key, guard.expected, found
                );
                return Ok(CommitOutcome::Conflict {
                    expected: guard.expected,
                    found,
                });
            }
            next_version = Some(found + 1);
        }

        for (key, value) in batch.sets() {
            tx.execute(UPSERT_SQL, params![key, value])?;
        }
        for key in batch.removes() {
            tx.execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        }
        if let (Some(guard), Some(version)) = (batch.guard(), next_version) {
            tx.execute(UPSERT_SQL, params![guard.key, version.to_string()])?;
        }
        for key in batch.bumps() {
            let stored = tx
                .query_row(
                    "SELECT value FROM kv_entries WHERE key = ?1;",
                    [key.as_str()],
                    |row| row.get::<_, String>(0),
                )
                .optional()?;
            let bumped = parse_version(stored.as_deref()) + 1;
            tx.execute(UPSERT_SQL, params![key, bumped.to_string()])?;
        }
        tx.commit()?;

        debug!(
            "event=store_commit module=store status=ok sets={} removes={} bumps={}",
            batch.sets().len(),
            batch.removes().len(),
            batch.bumps().len()
        );
        Ok(CommitOutcome::Applied {
            version: next_version,
        })
    }
}

fn open_with(
    mode: &'static str,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> StoreResult<SqliteKvStore> {
    let started_at = Instant::now();
    info!("event=store_open module=store status=start mode={mode}");

    let mut conn = match connect() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=store_open module=store status=error mode={} duration_ms={} error_code=store_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=store_open module=store status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(SqliteKvStore { conn })
        }
        Err(err) => {
            error!(
                "event=store_open module=store status=error mode={} duration_ms={} error_code=store_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> StoreResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)?;
    Ok(())
}
