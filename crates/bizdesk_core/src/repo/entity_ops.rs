//! Entity-specific repository operations.
//!
//! These run through the same guarded read-modify-write path as the generic
//! operations. Cross-entity consistency (e.g. stock vs. invoices) remains the
//! caller's responsibility.

use crate::model::account_group::AccountGroup;
use crate::model::currency::{Currency, CurrencyStatus};
use crate::model::customer::Customer;
use crate::model::product::Product;
use crate::model::validation::ValidationError;
use crate::model::vendor::Vendor;
use crate::repo::collection_repo::{stamp, CollectionRepository};
use crate::repo::RepoResult;
use crate::store::KeyValueStore;
use log::info;

impl<S: KeyValueStore + ?Sized> CollectionRepository<'_, Product, S> {
    /// Adds `delta` (may be negative) to the stock level.
    ///
    /// Fails with a validation error when stock would drop below zero.
    pub fn adjust_stock(&self, id: &str, delta: i64) -> RepoResult<Option<Product>> {
        self.modify(id, "product_adjust_stock", |product| {
            product.stock_quantity = product
                .stock_quantity
                .checked_add(delta)
                .ok_or_else(|| ValidationError::new("stockQuantity", "stock level overflow"))?;
            Ok(())
        })
    }

    /// Products at or below their reorder level.
    pub fn low_stock(&self) -> RepoResult<Vec<Product>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(Product::is_low_stock)
            .collect())
    }
}

impl<S: KeyValueStore + ?Sized> CollectionRepository<'_, Currency, S> {
    pub fn default_currency(&self) -> RepoResult<Option<Currency>> {
        Ok(self.list()?.into_iter().find(|currency| currency.is_default))
    }

    /// Makes `id` the only default currency.
    ///
    /// Returns `false` without writing when `id` is absent. Inactive
    /// currencies cannot become the default.
    pub fn set_default(&self, id: &str) -> RepoResult<bool> {
        let changed = self.modify_all("currency_set_default", |currencies, now| {
            let Some(target) = currencies.iter().find(|currency| currency.id == id) else {
                return Ok(None);
            };
            if target.status == CurrencyStatus::Inactive {
                return Err(ValidationError::new(
                    "isDefault",
                    format!("inactive currency `{}` cannot be the default", target.code),
                )
                .into());
            }

            for currency in currencies.iter_mut() {
                let should_be_default = currency.id == id;
                if currency.is_default != should_be_default {
                    currency.is_default = should_be_default;
                    stamp(currency, now);
                }
            }
            Ok(Some(()))
        })?;

        if changed.is_some() {
            info!("event=currency_set_default module=repo collection=currencies status=ok id={id}");
        }
        Ok(changed.is_some())
    }
}

impl<S: KeyValueStore + ?Sized> CollectionRepository<'_, Customer, S> {
    /// Adds `delta` to the amount the customer owes.
    pub fn adjust_balance(&self, id: &str, delta: f64) -> RepoResult<Option<Customer>> {
        self.modify(id, "customer_adjust_balance", |customer| {
            customer.outstanding_balance += delta;
            Ok(())
        })
    }
}

impl<S: KeyValueStore + ?Sized> CollectionRepository<'_, Vendor, S> {
    /// Adds `delta` to the amount owed to the vendor.
    pub fn adjust_balance(&self, id: &str, delta: f64) -> RepoResult<Option<Vendor>> {
        self.modify(id, "vendor_adjust_balance", |vendor| {
            vendor.outstanding_balance += delta;
            Ok(())
        })
    }
}

impl<S: KeyValueStore + ?Sized> CollectionRepository<'_, AccountGroup, S> {
    /// Direct children of `parent_id`, in collection order.
    pub fn children(&self, parent_id: &str) -> RepoResult<Vec<AccountGroup>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|group| group.parent_id.as_deref() == Some(parent_id))
            .collect())
    }
}
