//! Default seed snapshots written on first access to a collection.

use crate::model::{Entity, Timestamp};
use crate::repo::id_alloc::highest_numeric_id;

/// Seed records plus the counter value persisted alongside them.
#[derive(Debug, Clone)]
pub struct SeedSnapshot<E> {
    pub records: Vec<E>,
    pub counter: u64,
}

impl<E: Entity> SeedSnapshot<E> {
    /// Builds the seed for `E`. The counter is the highest numeric seed id,
    /// or the seed length when ids are not numeric.
    pub fn build(now: Timestamp) -> Self {
        let records = E::seed(now);
        let counter = match highest_numeric_id(&records) {
            0 => records.len() as u64,
            highest => highest,
        };
        Self { records, counter }
    }
}
