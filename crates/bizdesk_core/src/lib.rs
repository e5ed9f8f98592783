//! Core data-access logic for BizDesk.
//! This crate is the single source of truth for record invariants.

pub mod clock;
pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::account_group::{AccountGroup, AccountGroupDraft, AccountGroupPatch, AccountNature};
pub use model::category::{Category, CategoryDraft, CategoryKind, CategoryPatch};
pub use model::currency::{Currency, CurrencyDraft, CurrencyPatch, CurrencyStatus};
pub use model::customer::{Customer, CustomerDraft, CustomerPatch, CustomerStatus};
pub use model::product::{Product, ProductDraft, ProductPatch, ProductStatus};
pub use model::user::{User, UserPatch, UserRole};
pub use model::validation::ValidationError;
pub use model::vendor::{Vendor, VendorDraft, VendorPatch, VendorStatus};
pub use model::{Entity, EntityId, Timestamp};
pub use repo::collection_repo::{CollectionRepository, StatusFilter};
pub use repo::user_repo::UserRepository;
pub use repo::{RepoError, RepoResult};
pub use service::data_service::{BusinessDataService, DataSummary};
pub use store::memory::MemoryKvStore;
pub use store::sqlite::SqliteKvStore;
pub use store::{CommitOutcome, KeyValueStore, StoreError, StoreResult, WriteBatch};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
