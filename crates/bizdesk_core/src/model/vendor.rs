//! Vendor (supplier) record model.

use super::validation::{non_negative_amount, optional_email, require_non_blank, ValidationError};
use super::{double_option, merge, present, Entity, EntityId, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorStatus {
    #[default]
    Active,
    Inactive,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Free-form supply category, e.g. "Packaging".
    #[serde(default)]
    pub category: Option<String>,
    pub status: VendorStatus,
    /// Amount this business still owes the vendor.
    pub outstanding_balance: f64,
    pub total_purchases: f64,
    #[serde(default)]
    pub payment_terms: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorDraft {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub status: VendorStatus,
    pub outstanding_balance: f64,
    pub total_purchases: f64,
    #[serde(default)]
    pub payment_terms: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VendorPatch {
    pub name: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub company: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
    pub status: Option<VendorStatus>,
    pub outstanding_balance: Option<f64>,
    pub total_purchases: Option<f64>,
    #[serde(deserialize_with = "double_option")]
    pub payment_terms: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

impl Entity for Vendor {
    type Draft = VendorDraft;
    type Patch = VendorPatch;
    type Status = VendorStatus;

    const COLLECTION_KEY: &'static str = "vendors";
    const COUNTER_KEY: &'static str = "vendors:last_id";

    fn from_draft(id: EntityId, draft: VendorDraft, now: Timestamp) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            company: draft.company,
            address: draft.address,
            category: draft.category,
            status: draft.status,
            outstanding_balance: draft.outstanding_balance,
            total_purchases: draft.total_purchases,
            payment_terms: draft.payment_terms,
            notes: draft.notes,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: VendorPatch) {
        merge(&mut self.name, patch.name);
        merge(&mut self.email, patch.email);
        merge(&mut self.phone, patch.phone);
        merge(&mut self.company, patch.company);
        merge(&mut self.address, patch.address);
        merge(&mut self.category, patch.category);
        merge(&mut self.status, patch.status);
        merge(&mut self.outstanding_balance, patch.outstanding_balance);
        merge(&mut self.total_purchases, patch.total_purchases);
        merge(&mut self.payment_terms, patch.payment_terms);
        merge(&mut self.notes, patch.notes);
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

    fn status(&self) -> VendorStatus {
        self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        present([
            Some(self.name.as_str()),
            self.email.as_deref(),
            self.phone.as_deref(),
            self.company.as_deref(),
            self.category.as_deref(),
        ])
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("name", &self.name)?;
        optional_email("email", self.email.as_deref())?;
        non_negative_amount("outstandingBalance", self.outstanding_balance)?;
        non_negative_amount("totalPurchases", self.total_purchases)?;
        Ok(())
    }

    fn seed(now: Timestamp) -> Vec<Self> {
        vec![
            Vendor {
                id: "1".to_string(),
                name: "Northwind Supplies".to_string(),
                email: Some("orders@northwind.example".to_string()),
                phone: Some("+1 555 0201".to_string()),
                company: Some("Northwind Supplies Inc".to_string()),
                address: Some("400 Industrial Park, Riverton".to_string()),
                category: Some("Office Supplies".to_string()),
                status: VendorStatus::Active,
                outstanding_balance: 860.0,
                total_purchases: 15400.0,
                payment_terms: Some("Net 30".to_string()),
                notes: None,
                created_at: now,
                updated_at: now,
            },
            Vendor {
                id: "2".to_string(),
                name: "Pacific Packaging".to_string(),
                email: Some("sales@pacificpack.example".to_string()),
                phone: Some("+1 555 0202".to_string()),
                company: None,
                address: None,
                category: Some("Packaging".to_string()),
                status: VendorStatus::Active,
                outstanding_balance: 0.0,
                total_purchases: 4200.0,
                payment_terms: Some("Net 15".to_string()),
                notes: None,
                created_at: now,
                updated_at: now,
            },
            Vendor {
                id: "3".to_string(),
                name: "Metro Logistics".to_string(),
                email: None,
                phone: Some("+1 555 0203".to_string()),
                company: Some("Metro Logistics LLC".to_string()),
                address: Some("77 Depot Lane, Eastfield".to_string()),
                category: Some("Shipping".to_string()),
                status: VendorStatus::Inactive,
                outstanding_balance: 120.0,
                total_purchases: 2300.0,
                payment_terms: None,
                notes: Some("Contract paused".to_string()),
                created_at: now,
                updated_at: now,
            },
        ]
    }
}
