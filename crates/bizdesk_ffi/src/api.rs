//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose entity CRUD, search and profile calls to Dart via FRB.
//! - Exchange records as camelCase JSON text so Dart owns its own models.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every data call returns an [`EntityResponse`] envelope; failures set
//!   `ok = false` and carry a message instead of a payload.
//!
//! # See also
//! - `bizdesk_core::logging` for log levels and the panic hook

use bizdesk_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    BusinessDataService, CollectionRepository, CoreConfig, Entity, SqliteKvStore, StatusFilter,
    SystemClock, UserPatch,
};
use log::warn;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::OnceLock;

const ENTRY_DB_FILE_NAME: &str = "bizdesk_entry.sqlite3";
static ENTRY_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Response envelope shared by every data call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// JSON payload: a record, an array of records, a boolean or a summary.
    /// `None` on failure or when a lookup found nothing.
    pub payload_json: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl EntityResponse {
    fn success(message: impl Into<String>, payload_json: Option<String>) -> Self {
        Self {
            ok: true,
            payload_json,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            payload_json: None,
            message: message.into(),
        }
    }
}

/// Lists every record of `kind` (`customers|vendors|products|currencies|
/// categories|account_groups`).
///
/// # FFI contract
/// - Sync call, DB-backed execution. Seeds the collection on first use.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn entity_list(kind: String) -> EntityResponse {
    run_collection_op("entity_list", &kind, ListOp)
}

/// Fetches one record by id. A missing id is a successful empty response.
#[flutter_rust_bridge::frb(sync)]
pub fn entity_get(kind: String, id: String) -> EntityResponse {
    run_collection_op("entity_get", &kind, GetOp { id: id.trim() })
}

/// Inserts a record from a camelCase JSON insert payload.
///
/// # FFI contract
/// - Never panics.
/// - Returns the stored record, including assigned id and timestamps.
#[flutter_rust_bridge::frb(sync)]
pub fn entity_add(kind: String, draft_json: String) -> EntityResponse {
    run_collection_op("entity_add", &kind, AddOp { draft_json: &draft_json })
}

/// Applies a partial JSON update. Absent fields stay untouched; explicit
/// `null` clears nullable fields.
#[flutter_rust_bridge::frb(sync)]
pub fn entity_update(kind: String, id: String, patch_json: String) -> EntityResponse {
    run_collection_op(
        "entity_update",
        &kind,
        UpdateOp {
            id: id.trim(),
            patch_json: &patch_json,
        },
    )
}

/// Deletes a record. Payload is `true` when a record was removed.
#[flutter_rust_bridge::frb(sync)]
pub fn entity_delete(kind: String, id: String) -> EntityResponse {
    run_collection_op("entity_delete", &kind, DeleteOp { id: id.trim() })
}

/// Filters by `status` (`all` or a status name), then by case-insensitive
/// text over the record's search fields.
#[flutter_rust_bridge::frb(sync)]
pub fn entity_search(kind: String, query: String, status: String) -> EntityResponse {
    run_collection_op(
        "entity_search",
        &kind,
        SearchOp {
            query: &query,
            status: &status,
        },
    )
}

/// Returns the business-owner profile, seeding it on first use.
#[flutter_rust_bridge::frb(sync)]
pub fn user_get() -> EntityResponse {
    respond("user_get", || {
        with_service(|service| {
            let user = service.users().get().map_err(|err| err.to_string())?;
            user.as_ref().map(to_json).transpose()
        })
    })
}

/// Merges a partial JSON update into the profile.
#[flutter_rust_bridge::frb(sync)]
pub fn user_update(patch_json: String) -> EntityResponse {
    respond("user_update", || {
        let patch = serde_json::from_str::<UserPatch>(&patch_json)
            .map_err(|err| format!("invalid patch JSON: {err}"))?;
        with_service(|service| {
            let user = service.users().update(patch).map_err(|err| err.to_string())?;
            user.as_ref().map(to_json).transpose()
        })
    })
}

/// Per-collection record counts as JSON.
#[flutter_rust_bridge::frb(sync)]
pub fn data_summary() -> EntityResponse {
    respond("data_summary", || {
        with_service(|service| {
            let summary = service.summary().map_err(|err| err.to_string())?;
            Ok(Some(
                serde_json::json!({
                    "customers": summary.customers,
                    "vendors": summary.vendors,
                    "products": summary.products,
                    "currencies": summary.currencies,
                    "categories": summary.categories,
                    "accountGroups": summary.account_groups,
                })
                .to_string(),
            ))
        })
    })
}

/// Removes every collection and the profile. The next read re-seeds.
#[flutter_rust_bridge::frb(sync)]
pub fn data_reset() -> EntityResponse {
    respond("data_reset", || {
        with_service(|service| {
            service.reset_all().map_err(|err| err.to_string())?;
            Ok(None)
        })
    })
}

/// Entity collections addressable through `kind` strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntityKind {
    Customers,
    Vendors,
    Products,
    Currencies,
    Categories,
    AccountGroups,
}

impl EntityKind {
    fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "customer" | "customers" => Ok(Self::Customers),
            "vendor" | "vendors" => Ok(Self::Vendors),
            "product" | "products" => Ok(Self::Products),
            "currency" | "currencies" => Ok(Self::Currencies),
            "category" | "categories" => Ok(Self::Categories),
            "account_group" | "account_groups" | "accountgroups" => Ok(Self::AccountGroups),
            other => Err(format!("unknown entity kind `{other}`")),
        }
    }

    fn dispatch<O: CollectionOp>(
        self,
        service: &BusinessDataService<'_, SqliteKvStore>,
        op: O,
    ) -> OpResult {
        match self {
            Self::Customers => op.run(&service.customers()),
            Self::Vendors => op.run(&service.vendors()),
            Self::Products => op.run(&service.products()),
            Self::Currencies => op.run(&service.currencies()),
            Self::Categories => op.run(&service.categories()),
            Self::AccountGroups => op.run(&service.account_groups()),
        }
    }
}

/// `Ok(payload)` or a display-ready error message.
type OpResult = Result<Option<String>, String>;

/// One repository call, generic over the entity type it runs against.
trait CollectionOp {
    fn run<E: Entity>(self, repo: &CollectionRepository<'_, E, SqliteKvStore>) -> OpResult;
}

struct ListOp;

impl CollectionOp for ListOp {
    fn run<E: Entity>(self, repo: &CollectionRepository<'_, E, SqliteKvStore>) -> OpResult {
        let records = repo.list().map_err(|err| err.to_string())?;
        to_json(&records).map(Some)
    }
}

struct GetOp<'a> {
    id: &'a str,
}

impl CollectionOp for GetOp<'_> {
    fn run<E: Entity>(self, repo: &CollectionRepository<'_, E, SqliteKvStore>) -> OpResult {
        let record = repo.get_by_id(self.id).map_err(|err| err.to_string())?;
        record.as_ref().map(to_json).transpose()
    }
}

struct AddOp<'a> {
    draft_json: &'a str,
}

impl CollectionOp for AddOp<'_> {
    fn run<E: Entity>(self, repo: &CollectionRepository<'_, E, SqliteKvStore>) -> OpResult {
        let draft = serde_json::from_str::<E::Draft>(self.draft_json)
            .map_err(|err| format!("invalid record JSON: {err}"))?;
        let record = repo.add(draft).map_err(|err| err.to_string())?;
        to_json(&record).map(Some)
    }
}

struct UpdateOp<'a> {
    id: &'a str,
    patch_json: &'a str,
}

impl CollectionOp for UpdateOp<'_> {
    fn run<E: Entity>(self, repo: &CollectionRepository<'_, E, SqliteKvStore>) -> OpResult {
        let patch = serde_json::from_str::<E::Patch>(self.patch_json)
            .map_err(|err| format!("invalid patch JSON: {err}"))?;
        let record = repo
            .update(self.id, patch)
            .map_err(|err| err.to_string())?;
        record.as_ref().map(to_json).transpose()
    }
}

struct DeleteOp<'a> {
    id: &'a str,
}

impl CollectionOp for DeleteOp<'_> {
    fn run<E: Entity>(self, repo: &CollectionRepository<'_, E, SqliteKvStore>) -> OpResult {
        let removed = repo.delete(self.id).map_err(|err| err.to_string())?;
        Ok(Some(removed.to_string()))
    }
}

struct SearchOp<'a> {
    query: &'a str,
    status: &'a str,
}

impl CollectionOp for SearchOp<'_> {
    fn run<E: Entity>(self, repo: &CollectionRepository<'_, E, SqliteKvStore>) -> OpResult {
        let filter = StatusFilter::<E::Status>::parse(self.status).map_err(|err| err.to_string())?;
        let records = repo
            .search(self.query, filter)
            .map_err(|err| err.to_string())?;
        to_json(&records).map(Some)
    }
}

fn run_collection_op<O: CollectionOp>(operation: &str, kind: &str, op: O) -> EntityResponse {
    respond(operation, || {
        let kind = EntityKind::parse(kind)?;
        with_service(|service| kind.dispatch(service, op))
    })
}

fn respond(operation: &str, call: impl FnOnce() -> OpResult) -> EntityResponse {
    match call() {
        Ok(Some(payload)) => EntityResponse::success("OK.", Some(payload)),
        Ok(None) => EntityResponse::success("No record.", None),
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error operation={operation}");
            EntityResponse::failure(format!("{operation} failed: {err}"))
        }
    }
}

fn with_service(f: impl FnOnce(&BusinessDataService<'_, SqliteKvStore>) -> OpResult) -> OpResult {
    let db_path = resolve_entry_db_path();
    let store =
        SqliteKvStore::open(&db_path).map_err(|err| format!("entry DB open failed: {err}"))?;
    let clock = SystemClock;
    let service = BusinessDataService::new(&store, &clock);
    f(&service)
}

fn resolve_entry_db_path() -> PathBuf {
    ENTRY_DB_PATH
        .get_or_init(|| {
            CoreConfig::from_env()
                .store_path
                .unwrap_or_else(|| std::env::temp_dir().join(ENTRY_DB_FILE_NAME))
        })
        .clone()
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|err| format!("failed to encode payload: {err}"))
}
