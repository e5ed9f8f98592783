//! Monotonic id allocation per collection.
//!
//! # Invariants
//! - Issued ids strictly increase and are never reused, even after deletes.
//! - A new id never collides with a live record, even if the counter key was
//!   lost or rewritten by hand.

use crate::model::Entity;

/// Parses a stored counter as base-10. Absent or unreadable values count as `0`.
pub fn parse_counter(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(0)
}

/// Highest numeric id among `records`, or `0`.
pub fn highest_numeric_id<E: Entity>(records: &[E]) -> u64 {
    records
        .iter()
        .filter_map(|record| record.id().parse::<u64>().ok())
        .max()
        .unwrap_or(0)
}

/// Returns the next id to issue given the stored counter and live records.
pub fn next_id<E: Entity>(counter: u64, records: &[E]) -> u64 {
    counter.max(highest_numeric_id(records)) + 1
}
