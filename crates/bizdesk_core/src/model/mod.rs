//! Business record models persisted by the repository layer.
//!
//! # Responsibility
//! - Define the record shapes stored in each entity collection.
//! - Describe, per entity, its storage keys, insert/update payloads, search
//!   fields, validation and default seed.
//!
//! # Invariants
//! - `id` is assigned once by the id allocator and never changes.
//! - `created_at` is set once; `updated_at >= created_at` after every write.
//! - Deletion removes the record; there are no tombstones.
//!
//! # See also
//! - `crate::repo::collection_repo` for how records are persisted

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Debug;

pub mod account_group;
pub mod category;
pub mod currency;
pub mod customer;
pub mod product;
pub mod user;
pub mod validation;
pub mod vendor;

use validation::ValidationError;

/// Numeric-string record id, unique within one collection.
pub type EntityId = String;

/// Record timestamps. Persisted as RFC 3339 text.
pub type Timestamp = DateTime<Utc>;

/// Contract implemented by every record type stored as a collection.
pub trait Entity: Clone + Debug + Serialize + DeserializeOwned {
    /// Insert payload: every field except `id` and timestamps.
    type Draft: Debug + DeserializeOwned;
    /// Per-field update payload; absent fields are left untouched.
    type Patch: Debug + Default + DeserializeOwned;
    /// Enumerated field used by status filters in search.
    type Status: Copy + Eq + Debug + Serialize + DeserializeOwned;

    /// Storage key holding the serialized collection.
    const COLLECTION_KEY: &'static str;
    /// Storage key holding the last issued id.
    const COUNTER_KEY: &'static str;

    fn from_draft(id: EntityId, draft: Self::Draft, now: Timestamp) -> Self;
    fn apply_patch(&mut self, patch: Self::Patch);

    fn id(&self) -> &str;
    fn created_at(&self) -> Timestamp;
    fn updated_at(&self) -> Timestamp;
    fn set_updated_at(&mut self, at: Timestamp);

    fn status(&self) -> Self::Status;
    /// Text fields matched by free-text search, in a fixed order.
    fn search_fields(&self) -> Vec<&str>;
    fn validate(&self) -> Result<(), ValidationError>;

    /// Hand-authored records written when the collection key is absent.
    fn seed(now: Timestamp) -> Vec<Self>;
}

/// Overwrites `slot` when the patch carries a value.
pub(crate) fn merge<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// Distinguishes an absent patch field (`None`) from an explicit `null`
/// (`Some(None)`), so nullable fields can be cleared.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Collects the present values of optional search fields.
pub(crate) fn present<'a>(fields: impl IntoIterator<Item = Option<&'a str>>) -> Vec<&'a str> {
    fields.into_iter().flatten().collect()
}
