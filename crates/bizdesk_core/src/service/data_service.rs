//! Business data service.
//!
//! # Responsibility
//! - Hand out repositories that share one store handle and one clock.
//! - Provide whole-dataset helpers (seed everything, reset, counts).
//!
//! # Invariants
//! - The service never touches keys it does not own.
//! - There are no cross-entity transactions; each repository commits alone.

use crate::clock::Clock;
use crate::model::account_group::AccountGroup;
use crate::model::category::Category;
use crate::model::currency::Currency;
use crate::model::customer::Customer;
use crate::model::product::Product;
use crate::model::vendor::Vendor;
use crate::model::Entity;
use crate::repo::collection_repo::{data_keys, version_key, CollectionRepository};
use crate::repo::user_repo::{UserRepository, USER_KEY, USER_VERSION_KEY};
use crate::repo::RepoResult;
use crate::store::{KeyValueStore, WriteBatch};
use log::info;

/// Record counts per collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataSummary {
    pub customers: usize,
    pub vendors: usize,
    pub products: usize,
    pub currencies: usize,
    pub categories: usize,
    pub account_groups: usize,
}

pub struct BusinessDataService<'s, S: ?Sized> {
    store: &'s S,
    clock: &'s dyn Clock,
}

impl<'s, S: KeyValueStore + ?Sized> BusinessDataService<'s, S> {
    pub fn new(store: &'s S, clock: &'s dyn Clock) -> Self {
        Self { store, clock }
    }

    pub fn customers(&self) -> CollectionRepository<'s, Customer, S> {
        self.collection()
    }

    pub fn vendors(&self) -> CollectionRepository<'s, Vendor, S> {
        self.collection()
    }

    pub fn products(&self) -> CollectionRepository<'s, Product, S> {
        self.collection()
    }

    pub fn currencies(&self) -> CollectionRepository<'s, Currency, S> {
        self.collection()
    }

    pub fn categories(&self) -> CollectionRepository<'s, Category, S> {
        self.collection()
    }

    pub fn account_groups(&self) -> CollectionRepository<'s, AccountGroup, S> {
        self.collection()
    }

    pub fn users(&self) -> UserRepository<'s, S> {
        UserRepository::new(self.store, self.clock)
    }

    /// Repository for any entity type, for generic callers.
    pub fn collection<E: Entity>(&self) -> CollectionRepository<'s, E, S> {
        CollectionRepository::new(self.store, self.clock)
    }

    /// Seeds every absent collection and the user profile.
    pub fn initialize_all(&self) -> RepoResult<()> {
        self.customers().initialize()?;
        self.vendors().initialize()?;
        self.products().initialize()?;
        self.currencies().initialize()?;
        self.categories().initialize()?;
        self.account_groups().initialize()?;
        self.users().initialize()?;
        Ok(())
    }

    /// Removes every collection, id counter and the user profile in one batch.
    ///
    /// Ids restart after the next seed. The same batch bumps every version
    /// key at commit time, so writers holding pre-reset snapshots get a
    /// conflict.
    pub fn reset_all(&self) -> RepoResult<()> {
        let owned = [
            (data_keys::<Customer>(), version_key::<Customer>()),
            (data_keys::<Vendor>(), version_key::<Vendor>()),
            (data_keys::<Product>(), version_key::<Product>()),
            (data_keys::<Currency>(), version_key::<Currency>()),
            (data_keys::<Category>(), version_key::<Category>()),
            (data_keys::<AccountGroup>(), version_key::<AccountGroup>()),
        ];

        let mut batch = WriteBatch::new().remove(USER_KEY).bump(USER_VERSION_KEY);
        for (keys, version_key) in owned {
            for key in keys {
                batch = batch.remove(key);
            }
            batch = batch.bump(version_key);
        }
        self.store.commit(&batch)?;

        info!(
            "event=data_reset module=service status=ok keys={}",
            batch.removes().len()
        );
        Ok(())
    }

    pub fn summary(&self) -> RepoResult<DataSummary> {
        Ok(DataSummary {
            customers: self.customers().count()?,
            vendors: self.vendors().count()?,
            products: self.products().count()?,
            currencies: self.currencies().count()?,
            categories: self.categories().count()?,
            account_groups: self.account_groups().count()?,
        })
    }
}
