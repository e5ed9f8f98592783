//! Product (inventory item) record model.
//!
//! # Invariants
//! - `stock_quantity` never drops below zero.
//! - `unit_price` and `cost_price` are finite and `>= 0`.

use super::validation::{
    non_negative_amount, optional_non_negative_amount, require_non_blank, ValidationError,
};
use super::{double_option, merge, present, Entity, EntityId, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
    Discontinued,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Sales unit label, e.g. "pcs" or "kg".
    #[serde(default)]
    pub unit: Option<String>,
    pub unit_price: f64,
    #[serde(default)]
    pub cost_price: Option<f64>,
    pub stock_quantity: i64,
    /// Stock level at or below which the product is reported as low.
    #[serde(default)]
    pub reorder_level: Option<i64>,
    #[serde(default)]
    pub vendor_id: Option<EntityId>,
    pub status: ProductStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.reorder_level
            .is_some_and(|level| self.stock_quantity <= level)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    pub unit_price: f64,
    #[serde(default)]
    pub cost_price: Option<f64>,
    pub stock_quantity: i64,
    #[serde(default)]
    pub reorder_level: Option<i64>,
    #[serde(default)]
    pub vendor_id: Option<EntityId>,
    pub status: ProductStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub sku: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub unit: Option<Option<String>>,
    pub unit_price: Option<f64>,
    #[serde(deserialize_with = "double_option")]
    pub cost_price: Option<Option<f64>>,
    pub stock_quantity: Option<i64>,
    #[serde(deserialize_with = "double_option")]
    pub reorder_level: Option<Option<i64>>,
    #[serde(deserialize_with = "double_option")]
    pub vendor_id: Option<Option<EntityId>>,
    pub status: Option<ProductStatus>,
}

impl Entity for Product {
    type Draft = ProductDraft;
    type Patch = ProductPatch;
    type Status = ProductStatus;

    const COLLECTION_KEY: &'static str = "products";
    const COUNTER_KEY: &'static str = "products:last_id";

    fn from_draft(id: EntityId, draft: ProductDraft, now: Timestamp) -> Self {
        Self {
            id,
            name: draft.name,
            sku: draft.sku,
            description: draft.description,
            category: draft.category,
            unit: draft.unit,
            unit_price: draft.unit_price,
            cost_price: draft.cost_price,
            stock_quantity: draft.stock_quantity,
            reorder_level: draft.reorder_level,
            vendor_id: draft.vendor_id,
            status: draft.status,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: ProductPatch) {
        merge(&mut self.name, patch.name);
        merge(&mut self.sku, patch.sku);
        merge(&mut self.description, patch.description);
        merge(&mut self.category, patch.category);
        merge(&mut self.unit, patch.unit);
        merge(&mut self.unit_price, patch.unit_price);
        merge(&mut self.cost_price, patch.cost_price);
        merge(&mut self.stock_quantity, patch.stock_quantity);
        merge(&mut self.reorder_level, patch.reorder_level);
        merge(&mut self.vendor_id, patch.vendor_id);
        merge(&mut self.status, patch.status);
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }

    fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    fn set_updated_at(&mut self, at: Timestamp) {
        self.updated_at = at;
    }

    fn status(&self) -> ProductStatus {
        self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        present([
            Some(self.name.as_str()),
            self.sku.as_deref(),
            self.category.as_deref(),
            self.description.as_deref(),
        ])
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("name", &self.name)?;
        non_negative_amount("unitPrice", self.unit_price)?;
        optional_non_negative_amount("costPrice", self.cost_price)?;
        if self.stock_quantity < 0 {
            return Err(ValidationError::new(
                "stockQuantity",
                format!("must be >= 0, got {}", self.stock_quantity),
            ));
        }
        if let Some(level) = self.reorder_level.filter(|level| *level < 0) {
            return Err(ValidationError::new(
                "reorderLevel",
                format!("must be >= 0, got {level}"),
            ));
        }
        Ok(())
    }

    fn seed(now: Timestamp) -> Vec<Self> {
        vec![
            Product {
                id: "1".to_string(),
                name: "Wireless Mouse".to_string(),
                sku: Some("ACC-MOUSE-01".to_string()),
                description: Some("2.4 GHz ergonomic mouse".to_string()),
                category: Some("Accessories".to_string()),
                unit: Some("pcs".to_string()),
                unit_price: 24.99,
                cost_price: Some(12.5),
                stock_quantity: 120,
                reorder_level: Some(20),
                vendor_id: Some("1".to_string()),
                status: ProductStatus::Active,
                created_at: now,
                updated_at: now,
            },
            Product {
                id: "2".to_string(),
                name: "Shipping Box (Medium)".to_string(),
                sku: Some("PKG-BOX-M".to_string()),
                description: None,
                category: Some("Packaging".to_string()),
                unit: Some("pcs".to_string()),
                unit_price: 1.2,
                cost_price: Some(0.45),
                stock_quantity: 15,
                reorder_level: Some(50),
                vendor_id: Some("2".to_string()),
                status: ProductStatus::Active,
                created_at: now,
                updated_at: now,
            },
            Product {
                id: "3".to_string(),
                name: "Consulting Hour".to_string(),
                sku: None,
                description: Some("Billable advisory time".to_string()),
                category: Some("Services".to_string()),
                unit: Some("hour".to_string()),
                unit_price: 85.0,
                cost_price: None,
                stock_quantity: 0,
                reorder_level: None,
                vendor_id: None,
                status: ProductStatus::Active,
                created_at: now,
                updated_at: now,
            },
        ]
    }
}
