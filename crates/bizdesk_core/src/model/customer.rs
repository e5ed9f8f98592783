//! Customer record model.
//!
//! # Invariants
//! - `name` is never blank.
//! - `outstanding_balance` and `total_purchases` are finite and `>= 0`.
//! - `email`, when set, has a `name@domain.tld` shape.

use super::validation::{
    non_negative_amount, optional_email, optional_non_negative_amount, require_non_blank,
    ValidationError,
};
use super::{double_option, merge, present, Entity, EntityId, Timestamp};
use serde::{Deserialize, Serialize};

/// Customer account state, also the search status filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    #[default]
    Active,
    Inactive,
    /// No new invoices may be raised.
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
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
    #[serde(default)]
    pub tax_id: Option<String>,
    pub status: CustomerStatus,
    /// Amount still owed by the customer.
    pub outstanding_balance: f64,
    /// Lifetime invoiced amount.
    pub total_purchases: f64,
    #[serde(default)]
    pub credit_limit: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDraft {
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
    pub tax_id: Option<String>,
    pub status: CustomerStatus,
    pub outstanding_balance: f64,
    pub total_purchases: f64,
    #[serde(default)]
    pub credit_limit: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Shallow per-field update. `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomerPatch {
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
    pub tax_id: Option<Option<String>>,
    pub status: Option<CustomerStatus>,
    pub outstanding_balance: Option<f64>,
    pub total_purchases: Option<f64>,
    #[serde(deserialize_with = "double_option")]
    pub credit_limit: Option<Option<f64>>,
    #[serde(deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

impl Entity for Customer {
    type Draft = CustomerDraft;
    type Patch = CustomerPatch;
    type Status = CustomerStatus;

    const COLLECTION_KEY: &'static str = "customers";
    const COUNTER_KEY: &'static str = "customers:last_id";

    fn from_draft(id: EntityId, draft: CustomerDraft, now: Timestamp) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            company: draft.company,
            address: draft.address,
            tax_id: draft.tax_id,
            status: draft.status,
            outstanding_balance: draft.outstanding_balance,
            total_purchases: draft.total_purchases,
            credit_limit: draft.credit_limit,
            notes: draft.notes,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: CustomerPatch) {
        merge(&mut self.name, patch.name);
        merge(&mut self.email, patch.email);
        merge(&mut self.phone, patch.phone);
        merge(&mut self.company, patch.company);
        merge(&mut self.address, patch.address);
        merge(&mut self.tax_id, patch.tax_id);
        merge(&mut self.status, patch.status);
        merge(&mut self.outstanding_balance, patch.outstanding_balance);
        merge(&mut self.total_purchases, patch.total_purchases);
        merge(&mut self.credit_limit, patch.credit_limit);
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

    fn status(&self) -> CustomerStatus {
        self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        present([
            Some(self.name.as_str()),
            self.email.as_deref(),
            self.phone.as_deref(),
            self.company.as_deref(),
        ])
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("name", &self.name)?;
        optional_email("email", self.email.as_deref())?;
        non_negative_amount("outstandingBalance", self.outstanding_balance)?;
        non_negative_amount("totalPurchases", self.total_purchases)?;
        optional_non_negative_amount("creditLimit", self.credit_limit)?;
        Ok(())
    }

    fn seed(now: Timestamp) -> Vec<Self> {
        vec![
            Customer {
                id: "1".to_string(),
                name: "John Smith".to_string(),
                email: Some("john.smith@example.com".to_string()),
                phone: Some("+1 555 0101".to_string()),
                company: Some("Smith Retail".to_string()),
                address: Some("12 Market Street, Springfield".to_string()),
                tax_id: None,
                status: CustomerStatus::Active,
                outstanding_balance: 1250.0,
                total_purchases: 8400.0,
                credit_limit: Some(5000.0),
                notes: None,
                created_at: now,
                updated_at: now,
            },
            Customer {
                id: "2".to_string(),
                name: "Maria Garcia".to_string(),
                email: Some("maria@garciadesign.example".to_string()),
                phone: Some("+1 555 0102".to_string()),
                company: Some("Garcia Design Studio".to_string()),
                address: None,
                tax_id: Some("GD-44120".to_string()),
                status: CustomerStatus::Active,
                outstanding_balance: 0.0,
                total_purchases: 3150.5,
                credit_limit: None,
                notes: Some("Prefers email invoices".to_string()),
                created_at: now,
                updated_at: now,
            },
            Customer {
                id: "3".to_string(),
                name: "Lee Wholesale".to_string(),
                email: Some("accounts@leewholesale.example".to_string()),
                phone: Some("+1 555 0103".to_string()),
                company: Some("Lee Wholesale Ltd".to_string()),
                address: Some("8 Harbour Road, Bayview".to_string()),
                tax_id: None,
                status: CustomerStatus::Inactive,
                outstanding_balance: 430.0,
                total_purchases: 12900.0,
                credit_limit: Some(10000.0),
                notes: None,
                created_at: now,
                updated_at: now,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::{Customer, CustomerDraft, CustomerPatch, CustomerStatus};
    use crate::model::Entity;
    use chrono::Utc;

    #[test]
    fn patch_json_clears_nullable_fields_and_ignores_identity() {
        let mut customer = Customer::seed(Utc::now()).remove(0);
        let patch: CustomerPatch = serde_json::from_str(
            r#"{"id":"99","createdAt":"2001-01-01T00:00:00Z","status":"blocked","email":null}"#,
        )
        .unwrap();

        let created_at = customer.created_at;
        customer.apply_patch(patch);

        assert_eq!(customer.id, "1");
        assert_eq!(customer.created_at, created_at);
        assert_eq!(customer.status, CustomerStatus::Blocked);
        assert_eq!(customer.email, None);
        assert_eq!(customer.phone.as_deref(), Some("+1 555 0101"));
    }

    #[test]
    fn seeds_are_valid_and_serialize_camel_case() {
        let seeds = Customer::seed(Utc::now());
        assert_eq!(seeds.len(), 3);
        for seed in &seeds {
            seed.validate().unwrap();
        }

        let json = serde_json::to_value(&seeds[0]).unwrap();
        assert!(json.get("outstandingBalance").is_some());
        assert!(json.get("createdAt").unwrap().is_string());
        assert_eq!(json["status"], "active");
    }

    #[test]
    fn draft_json_requires_non_nullable_fields() {
        let missing = serde_json::from_str::<CustomerDraft>(r#"{"name":"X"}"#)
            .expect_err("status and amounts must be sent explicitly");
        assert!(missing.to_string().contains("missing field"));

        let draft: CustomerDraft = serde_json::from_str(
            r#"{"name":"X","status":"active","outstandingBalance":0,"totalPurchases":0}"#,
        )
        .unwrap();
        assert_eq!(draft.email, None);
        assert_eq!(draft.credit_limit, None);
    }
}
